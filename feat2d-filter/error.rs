use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("response data length mismatch: {width}x{height} needs {expected}, got {actual}")]
    ResponseSizeMismatch {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    #[error("invalid region {width}x{height} (must be > 0)")]
    InvalidRegion { width: u32, height: u32 },

    #[error("invalid distance ratio: {0} (must be in (0, 1])")]
    InvalidRatio(f32),
}

pub type FilterResult<T> = Result<T, FilterError>;
