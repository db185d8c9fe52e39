#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Image location with the scale/orientation metadata a detector attaches to it.
///
/// Field defaults follow the vision library's keypoint so values survive a
/// round trip through it unchanged: `angle = -1` (not computed),
/// `response = 0`, `octave = 0`, `class_id = -1`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    /// Diameter of the meaningful neighbourhood
    pub size: f32,
    /// Orientation in degrees, -1 if not applicable
    pub angle: f32,
    pub response: f32,
    pub octave: i32,
    pub class_id: i32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32, size: f32) -> Self {
        Self {
            x,
            y,
            size,
            angle: -1.0,
            response: 0.0,
            octave: 0,
            class_id: -1,
        }
    }

    pub fn with_response(mut self, response: f32) -> Self {
        self.response = response;
        self
    }

    /// Euclidean distance between the two keypoint centres
    pub fn distance(&self, other: &Keypoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Overlap of the two keypoint circles as intersection area over union area.
    ///
    /// Returns a value in `[0, 1]`: `0` for disjoint circles, `1` for identical
    /// ones. When one circle lies entirely inside the other the ratio of their
    /// areas is returned.
    pub fn overlap(&self, other: &Keypoint) -> f32 {
        let a = self.size * 0.5;
        let b = other.size * 0.5;
        let a_2 = a * a;
        let b_2 = b * b;
        let c = self.distance(other);

        // one circle completely covers the other, no intersection points
        if a.min(b) + c <= a.max(b) {
            let larger = a_2.max(b_2);
            if larger == 0.0 {
                return 0.0;
            }
            return a_2.min(b_2) / larger;
        }

        if c < a + b {
            let c_2 = c * c;
            let cos_alpha = ((b_2 + c_2 - a_2) / (other.size * c)).clamp(-1.0, 1.0);
            let cos_beta = ((a_2 + c_2 - b_2) / (self.size * c)).clamp(-1.0, 1.0);
            let alpha = cos_alpha.acos();
            let beta = cos_beta.acos();

            let segment_a = a_2 * beta;
            let segment_b = b_2 * alpha;
            let triangle_a = a_2 * beta.sin() * cos_beta;
            let triangle_b = b_2 * alpha.sin() * cos_alpha;

            let intersection = segment_a + segment_b - triangle_a - triangle_b;
            let union = (a_2 + b_2) * std::f32::consts::PI - intersection;
            return intersection / union;
        }

        0.0
    }
}

/// Correspondence between a query (source) descriptor and a train (reference) descriptor
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Match {
    pub query_idx: usize,
    pub train_idx: usize,
    pub distance: f32,
}

impl Match {
    pub fn new(query_idx: usize, train_idx: usize, distance: f32) -> Self {
        Self {
            query_idx,
            train_idx,
            distance,
        }
    }
}

/// Candidate matches of one query descriptor, nearest first
pub type KnnMatches = Vec<Match>;

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn test_defaults_follow_library_keypoint() {
        let kp = Keypoint::new(3.0, 4.0, 7.0);
        assert_eq!(kp.angle, -1.0);
        assert_eq!(kp.response, 0.0);
        assert_eq!(kp.octave, 0);
        assert_eq!(kp.class_id, -1);
    }

    #[test]
    fn test_overlap_disjoint() {
        let a = Keypoint::new(0.0, 0.0, 6.0);
        let b = Keypoint::new(10.0, 0.0, 6.0);
        assert_eq!(a.overlap(&b), 0.0);
    }

    #[test]
    fn test_overlap_touching_is_zero() {
        let a = Keypoint::new(0.0, 0.0, 6.0);
        let b = Keypoint::new(6.0, 0.0, 6.0);
        assert_eq!(a.overlap(&b), 0.0);
    }

    #[test]
    fn test_overlap_identical() {
        let a = Keypoint::new(5.0, 5.0, 6.0);
        assert!((a.overlap(&a) - 1.0).abs() < EPS);
    }

    #[test]
    fn test_overlap_contained() {
        let big = Keypoint::new(0.0, 0.0, 10.0);
        let small = Keypoint::new(1.0, 0.0, 4.0);
        // (2^2) / (5^2)
        assert!((big.overlap(&small) - 0.16).abs() < EPS);
        assert!((small.overlap(&big) - 0.16).abs() < EPS);
    }

    #[test]
    fn test_overlap_partial_is_symmetric() {
        let a = Keypoint::new(0.0, 0.0, 6.0);
        let b = Keypoint::new(3.0, 0.0, 6.0);
        let ab = a.overlap(&b);
        let ba = b.overlap(&a);
        assert!(ab > 0.0 && ab < 1.0);
        assert!((ab - ba).abs() < EPS);
    }

    #[test]
    fn test_overlap_equal_circles_half_radius_apart() {
        // two unit circles with centres one radius apart:
        // intersection = 2π/3 - √3/2, union = 2π - intersection
        let a = Keypoint::new(0.0, 0.0, 2.0);
        let b = Keypoint::new(1.0, 0.0, 2.0);
        let inter = 2.0 * std::f32::consts::PI / 3.0 - 3f32.sqrt() / 2.0;
        let expected = inter / (2.0 * std::f32::consts::PI - inter);
        assert!((a.overlap(&b) - expected).abs() < 1e-4);
    }

    #[test]
    fn test_overlap_zero_size_points() {
        let a = Keypoint::new(2.0, 2.0, 0.0);
        assert_eq!(a.overlap(&a), 0.0);
    }
}
