use feat2d_core::Keypoint;
use imageproc::rect::Rect;

use crate::error::{FilterError, FilterResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Keep the `n` strongest keypoints by response.
///
/// The sort is stable, so detectors that leave every response equal
/// (Shi-Tomasi) keep their first `n` keypoints.
pub fn retain_best(keypoints: &mut Vec<Keypoint>, n: usize) {
    if keypoints.len() <= n {
        return;
    }
    keypoints.sort_by(|a, b| b.response.total_cmp(&a.response));
    keypoints.truncate(n);
}

/// Axis-aligned region of interest in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> FilterResult<Self> {
        let region = Self {
            x,
            y,
            width,
            height,
        };
        region.validate()?;
        Ok(region)
    }

    /// Box around the preceding vehicle in the KITTI driving sequence
    pub fn preceding_vehicle() -> Self {
        Self {
            x: 535,
            y: 180,
            width: 180,
            height: 150,
        }
    }

    pub fn validate(&self) -> FilterResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(FilterError::InvalidRegion {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// `None` for a zero-sized region
    pub fn rect(&self) -> Option<Rect> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        Some(Rect::at(self.x, self.y).of_size(self.width, self.height))
    }

    /// Half-open containment: left/top edges inside, right/bottom edges outside.
    /// A zero-sized region contains nothing.
    pub fn contains(&self, kp: &Keypoint) -> bool {
        self.rect().is_some_and(|rect| rect_contains(&rect, kp))
    }
}

fn rect_contains(rect: &Rect, kp: &Keypoint) -> bool {
    let left = rect.left() as f32;
    let top = rect.top() as f32;
    kp.x >= left
        && kp.x < left + rect.width() as f32
        && kp.y >= top
        && kp.y < top + rect.height() as f32
}

pub fn retain_in_region(keypoints: &mut Vec<Keypoint>, region: &Region) {
    match region.rect() {
        Some(rect) => keypoints.retain(|kp| rect_contains(&rect, kp)),
        None => keypoints.clear(),
    }
}

/// Distribution of keypoint neighbourhood sizes
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SizeStats {
    pub count: usize,
    pub mean: f32,
    pub std_dev: f32,
    pub min: f32,
    pub max: f32,
}

pub fn neighbourhood_stats(keypoints: &[Keypoint]) -> Option<SizeStats> {
    if keypoints.is_empty() {
        return None;
    }
    let n = keypoints.len() as f64;
    let mut sum = 0.0f64;
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for kp in keypoints {
        sum += kp.size as f64;
        min = min.min(kp.size);
        max = max.max(kp.size);
    }
    let mean = sum / n;
    let var = keypoints
        .iter()
        .map(|kp| {
            let d = kp.size as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;

    Some(SizeStats {
        count: keypoints.len(),
        mean: mean as f32,
        std_dev: var.sqrt() as f32,
        min,
        max,
    })
}
