//! Conversions between the vision library's containers and the core types.

use feat2d_core::{Keypoint, KnnMatches, Match};
use image::GrayImage;
use opencv::core::{DMatch, KeyPoint, Mat, Scalar, Vector, CV_8UC1};
use opencv::prelude::*;

use crate::error::{CvError, CvResult};

/// Copy an 8-bit grayscale image into a continuous single-channel matrix
pub fn gray_to_mat(img: &GrayImage) -> CvResult<Mat> {
    let (width, height) = img.dimensions();
    let (cols, rows) = match (i32::try_from(width), i32::try_from(height)) {
        (Ok(c), Ok(r)) => (c, r),
        _ => return Err(CvError::ImageTooLarge { width, height }),
    };
    let mut mat = Mat::new_rows_cols_with_default(rows, cols, CV_8UC1, Scalar::all(0.0))?;
    if !img.as_raw().is_empty() {
        mat.data_bytes_mut()?.copy_from_slice(img.as_raw());
    }
    Ok(mat)
}

/// Fail unless `image` is a non-empty 8-bit single-channel matrix
pub fn ensure_gray(image: &Mat) -> CvResult<()> {
    if image.empty() || image.typ() != CV_8UC1 {
        return Err(CvError::UnsupportedImage {
            rows: image.rows(),
            cols: image.cols(),
            typ: image.typ(),
        });
    }
    Ok(())
}

pub fn to_cv_keypoint(kp: &Keypoint) -> CvResult<KeyPoint> {
    Ok(KeyPoint::new_coords(
        kp.x,
        kp.y,
        kp.size,
        kp.angle,
        kp.response,
        kp.octave,
        kp.class_id,
    )?)
}

pub fn from_cv_keypoint(kp: &KeyPoint) -> Keypoint {
    let pt = kp.pt();
    Keypoint {
        x: pt.x,
        y: pt.y,
        size: kp.size(),
        angle: kp.angle(),
        response: kp.response(),
        octave: kp.octave(),
        class_id: kp.class_id(),
    }
}

pub fn to_cv_keypoints(keypoints: &[Keypoint]) -> CvResult<Vector<KeyPoint>> {
    let mut out = Vector::<KeyPoint>::with_capacity(keypoints.len());
    for kp in keypoints {
        out.push(to_cv_keypoint(kp)?);
    }
    Ok(out)
}

pub fn from_cv_keypoints(keypoints: &Vector<KeyPoint>) -> Vec<Keypoint> {
    keypoints.iter().map(|kp| from_cv_keypoint(&kp)).collect()
}

/// `None` for an entry without a neighbour (negative index)
pub fn from_dmatch(m: &DMatch) -> Option<Match> {
    let query_idx = usize::try_from(m.query_idx).ok()?;
    let train_idx = usize::try_from(m.train_idx).ok()?;
    Some(Match::new(query_idx, train_idx, m.distance))
}

/// Entries with a negative index are dropped.
pub fn from_dmatches(matches: &Vector<DMatch>) -> Vec<Match> {
    matches.iter().filter_map(|m| from_dmatch(&m)).collect()
}

pub fn from_knn_dmatches(matches: &Vector<Vector<DMatch>>) -> Vec<KnnMatches> {
    matches.iter().map(|list| from_dmatches(&list)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dmatch(query_idx: i32, train_idx: i32, distance: f32) -> DMatch {
        DMatch {
            query_idx,
            train_idx,
            img_idx: -1,
            distance,
        }
    }

    #[test]
    fn test_missing_neighbour_dropped() {
        assert_eq!(from_dmatch(&dmatch(2, -1, 0.0)), None);
        assert_eq!(from_dmatch(&dmatch(-1, 4, 0.0)), None);
        assert_eq!(from_dmatch(&dmatch(2, 4, 9.5)), Some(Match::new(2, 4, 9.5)));
    }

    #[test]
    fn test_lone_missing_neighbour_yields_empty_list() {
        let mut knn = Vector::<Vector<DMatch>>::new();
        knn.push(Vector::from_iter([dmatch(0, -1, 0.0)]));
        knn.push(Vector::from_iter([dmatch(1, 3, 12.0), dmatch(1, 5, 40.0)]));

        let lists = from_knn_dmatches(&knn);
        assert!(lists[0].is_empty());
        assert_eq!(lists[1].len(), 2);

        let kept = feat2d_filter::filter_by_distance_ratio(&lists, 0.8);
        assert_eq!(kept, vec![Match::new(1, 3, 12.0)]);
    }
}
