//! Pure-Rust post-processing around the vision library: Harris response
//! thresholding, overlap-based non-maximum suppression, keypoint selection
//! and the distance-ratio match filter.

pub mod error;
pub mod nms;
pub mod ratio;
pub mod response;
pub mod select;

pub use error::{FilterError, FilterResult};
pub use nms::{apply_nms, suppress_overlapping};
pub use ratio::{filter_by_distance_ratio, select_by_ratio, RatioFilter};
pub use response::ResponseMap;
pub use select::{neighbourhood_stats, retain_best, retain_in_region, Region, SizeStats};

/// Harris post-processing: normalize the raw response to 0..255, keep pixels
/// above `min_response` and suppress overlapping corners when `run_nms` is set.
pub fn harris_keypoints(
    response: ResponseMap,
    min_response: f32,
    keypoint_size: f32,
    run_nms: bool,
) -> Vec<feat2d_core::Keypoint> {
    let candidates = response
        .normalized(0.0, 255.0)
        .threshold(min_response, keypoint_size);
    apply_nms(candidates, run_nms)
}
