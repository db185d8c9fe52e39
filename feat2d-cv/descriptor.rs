use feat2d_core::{BriskParams, DescriptorKind, FeatureConfig, Keypoint};
use log::{debug, warn};
use opencv::core::{Mat, CV_32F};
use opencv::features2d::{AKAZE, BRISK, ORB, SIFT};
use opencv::prelude::*;
use opencv::xfeatures2d::{BriefDescriptorExtractor, FREAK};

use crate::convert::{ensure_gray, from_cv_keypoints, to_cv_keypoints};
use crate::error::CvResult;

/// Descriptor matrix, one row per keypoint
#[derive(Debug)]
pub struct Descriptors {
    mat: Mat,
}

impl Descriptors {
    pub fn new(mat: Mat) -> Self {
        Self { mat }
    }

    pub fn empty() -> Self {
        Self { mat: Mat::default() }
    }

    /// Number of descriptors
    pub fn len(&self) -> usize {
        self.mat.rows().max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.mat.empty()
    }

    /// Row width in matrix elements (bytes for binary descriptors)
    pub fn width(&self) -> usize {
        self.mat.cols().max(0) as usize
    }

    pub fn is_float(&self) -> bool {
        self.mat.depth() == CV_32F
    }

    pub fn as_mat(&self) -> &Mat {
        &self.mat
    }

    /// 32-bit float copy, the only element type the FLANN index accepts
    pub fn to_f32(&self) -> CvResult<Mat> {
        if self.is_float() {
            return Ok(self.mat.try_clone()?);
        }
        let mut converted = Mat::default();
        self.mat.convert_to(&mut converted, CV_32F, 1.0, 0.0)?;
        Ok(converted)
    }

    pub fn try_clone(&self) -> CvResult<Self> {
        Ok(Self {
            mat: self.mat.try_clone()?,
        })
    }
}

/// Keypoints that survived extraction with their descriptors, row `i` belongs to keypoint `i`
#[derive(Debug)]
pub struct Described {
    pub keypoints: Vec<Keypoint>,
    pub descriptors: Descriptors,
}

/// Compute descriptors with the extractor selected in `cfg`.
///
/// Extractors drop keypoints too close to the border and may rewrite the
/// rest (orientation, octave), so the returned keypoints replace the input.
pub fn describe_keypoints(
    image: &Mat,
    keypoints: &[Keypoint],
    cfg: &FeatureConfig,
) -> CvResult<Described> {
    ensure_gray(image)?;
    if keypoints.is_empty() {
        warn!("no keypoints to describe with {}", cfg.descriptor);
        return Ok(Described {
            keypoints: Vec::new(),
            descriptors: Descriptors::empty(),
        });
    }

    let described = match cfg.descriptor {
        DescriptorKind::Brisk => compute_with(&mut brisk_extractor(&cfg.brisk)?, image, keypoints)?,
        DescriptorKind::Brief => {
            compute_with(&mut BriefDescriptorExtractor::create_def()?, image, keypoints)?
        }
        DescriptorKind::Orb => compute_with(&mut ORB::create_def()?, image, keypoints)?,
        DescriptorKind::Freak => compute_with(&mut FREAK::create_def()?, image, keypoints)?,
        DescriptorKind::Akaze => compute_with(&mut AKAZE::create_def()?, image, keypoints)?,
        DescriptorKind::Sift => compute_with(&mut SIFT::create_def()?, image, keypoints)?,
    };

    debug!(
        "{} described {} of {} keypoints ({} wide)",
        cfg.descriptor,
        described.descriptors.len(),
        keypoints.len(),
        described.descriptors.width()
    );
    Ok(described)
}

fn brisk_extractor(params: &BriskParams) -> CvResult<opencv::core::Ptr<BRISK>> {
    Ok(BRISK::create(
        params.threshold,
        params.octaves,
        params.pattern_scale,
    )?)
}

fn compute_with<D: Feature2DTrait>(
    extractor: &mut D,
    image: &Mat,
    keypoints: &[Keypoint],
) -> CvResult<Described> {
    let mut cv_keypoints = to_cv_keypoints(keypoints)?;
    let mut descriptors = Mat::default();
    extractor.compute(image, &mut cv_keypoints, &mut descriptors)?;
    Ok(Described {
        keypoints: from_cv_keypoints(&cv_keypoints),
        descriptors: Descriptors::new(descriptors),
    })
}
