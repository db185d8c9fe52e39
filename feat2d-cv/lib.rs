//! Keypoint detection, description and matching on top of OpenCV.
//!
//! Algorithm selection comes from a [`FeatureConfig`]; each entry point
//! dispatches on the configured kind and converts library containers
//! into the core [`Keypoint`] and [`Match`] types.

pub mod convert;
pub mod descriptor;
pub mod detector;
pub mod error;
pub mod matcher;

pub use convert::{ensure_gray, gray_to_mat};
pub use descriptor::{describe_keypoints, Described, Descriptors};
pub use detector::{detect_fast, detect_harris, detect_keypoints, detect_shi_tomasi, harris_response};
pub use error::{CvError, CvResult};
pub use matcher::match_descriptors;

pub use feat2d_core::{FeatureConfig, Keypoint, Match};

/// Size both the Rayon pool and OpenCV's internal pool to `n_threads`.
///
/// The Rayon global pool can only be built once per process; a second call
/// keeps the existing pool and only updates OpenCV.
pub fn init_threads(n_threads: usize) -> CvResult<()> {
    if let Err(e) = feat2d_core::init_thread_pool(n_threads) {
        log::warn!("keeping existing thread pool: {}", e);
    }
    opencv::core::set_num_threads(i32::try_from(n_threads).unwrap_or(i32::MAX))?;
    Ok(())
}
