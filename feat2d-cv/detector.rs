use feat2d_core::{DetectorKind, FastParams, FeatureConfig, HarrisParams, Keypoint, ShiTomasiParams};
use feat2d_filter::{harris_keypoints, ResponseMap};
use log::debug;
use opencv::core::{self, KeyPoint, Mat, Point2f, Vector};
use opencv::features2d::{FastFeatureDetector, FastFeatureDetector_DetectorType, AKAZE, BRISK, ORB, SIFT};
use opencv::imgproc;
use opencv::prelude::*;

use crate::convert::{ensure_gray, from_cv_keypoints};
use crate::error::CvResult;

/// Detect keypoints with the detector selected in `cfg`.
pub fn detect_keypoints(image: &Mat, cfg: &FeatureConfig) -> CvResult<Vec<Keypoint>> {
    ensure_gray(image)?;
    let keypoints = match cfg.detector {
        DetectorKind::ShiTomasi => detect_shi_tomasi(image, &cfg.shi_tomasi)?,
        DetectorKind::Harris => detect_harris(image, &cfg.harris)?,
        DetectorKind::Fast => detect_fast(image, &cfg.fast)?,
        DetectorKind::Brisk => detect_with(&mut BRISK::create_def()?, image)?,
        DetectorKind::Orb => detect_with(&mut ORB::create_def()?, image)?,
        DetectorKind::Akaze => detect_with(&mut AKAZE::create_def()?, image)?,
        DetectorKind::Sift => detect_with(&mut SIFT::create_def()?, image)?,
    };
    debug!("{} detected {} keypoints", cfg.detector, keypoints.len());
    Ok(keypoints)
}

/// Minimum-eigenvalue corners; every keypoint gets `block_size` as its size.
pub fn detect_shi_tomasi(image: &Mat, params: &ShiTomasiParams) -> CvResult<Vec<Keypoint>> {
    let max_corners = params.max_corners(image.rows() as usize, image.cols() as usize);
    let mut corners = Vector::<Point2f>::new();
    imgproc::good_features_to_track(
        image,
        &mut corners,
        i32::try_from(max_corners).unwrap_or(i32::MAX),
        params.quality_level,
        params.min_distance(),
        &Mat::default(),
        params.block_size as i32,
        false,
        params.k,
    )?;

    let size = params.block_size as f32;
    Ok(corners
        .iter()
        .map(|pt| Keypoint::new(pt.x, pt.y, size))
        .collect())
}

/// Raw Harris response of the library, one `f32` per pixel
pub fn harris_response(image: &Mat, params: &HarrisParams) -> CvResult<ResponseMap> {
    let mut dst = Mat::default();
    imgproc::corner_harris(
        image,
        &mut dst,
        params.block_size as i32,
        params.aperture_size as i32,
        params.k,
        core::BORDER_DEFAULT,
    )?;
    let data = dst.data_typed::<f32>()?.to_vec();
    Ok(ResponseMap::new(dst.cols() as usize, dst.rows() as usize, data)?)
}

/// Harris corners above the normalized threshold, overlap-suppressed if enabled
pub fn detect_harris(image: &Mat, params: &HarrisParams) -> CvResult<Vec<Keypoint>> {
    let response = harris_response(image, params)?;
    Ok(harris_keypoints(
        response,
        params.min_response,
        params.keypoint_size(),
        params.run_nms,
    ))
}

/// FAST 9/16 segment test
pub fn detect_fast(image: &Mat, params: &FastParams) -> CvResult<Vec<Keypoint>> {
    let mut detector = FastFeatureDetector::create(
        params.threshold,
        params.nonmax_suppression,
        FastFeatureDetector_DetectorType::TYPE_9_16,
    )?;
    detect_with(&mut detector, image)
}

fn detect_with<D: Feature2DTrait>(detector: &mut D, image: &Mat) -> CvResult<Vec<Keypoint>> {
    let mut keypoints = Vector::<KeyPoint>::new();
    detector.detect(image, &mut keypoints, &Mat::default())?;
    Ok(from_cv_keypoints(&keypoints))
}
