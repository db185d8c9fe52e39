use feat2d_core::CoreError;
use feat2d_filter::FilterError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CvError {
    #[error("OpenCV error: {0}")]
    OpenCv(#[from] opencv::Error),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("expected a non-empty 8-bit single-channel image, got {rows}x{cols} of type {typ}")]
    UnsupportedImage { rows: i32, cols: i32, typ: i32 },

    #[error("image {width}x{height} exceeds the matrix size limit")]
    ImageTooLarge { width: u32, height: u32 },
}

pub type CvResult<T> = Result<T, CvError>;
