//! Shared types for the feat2d workspace: keypoints, matches, the
//! string-keyed algorithm kinds and the feature configuration.

pub mod builder;
pub mod config;
pub mod error;
pub mod keypoint;
pub mod kinds;

pub use builder::FeatureConfigBuilder;
pub use config::{BriskParams, FastParams, FeatureConfig, HarrisParams, MatchParams, ShiTomasiParams};
pub use error::{CoreError, CoreResult};
pub use keypoint::{Keypoint, KnnMatches, Match};
pub use kinds::{
    validate_combination, DescriptorFamily, DescriptorKind, DetectorKind, MatcherKind, SelectorKind,
};

/// Initialize Rayon thread pool with the specified number of threads
pub fn init_thread_pool(n_threads: usize) -> Result<(), rayon::ThreadPoolBuildError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .build_global()
}

/// Default worker count, never zero.
pub fn default_threads() -> usize {
    num_cpus::get().max(1)
}
