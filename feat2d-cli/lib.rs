//! Frame-by-frame keypoint tracking over an image sequence: a two-frame
//! ring buffer, detection and description of each image, and matching of
//! every frame against its predecessor.

pub mod buffer;
pub mod error;
pub mod pipeline;
pub mod sequence;

pub use buffer::FrameBuffer;
pub use error::{PipelineError, PipelineResult};
pub use pipeline::{Frame, FrameReport, Pipeline, PipelineConfig, RunSummary};
pub use sequence::{load_gray, SequenceConfig};

pub use feat2d_core::{self, FeatureConfig, FeatureConfigBuilder};
pub use feat2d_cv;
pub use feat2d_filter;
