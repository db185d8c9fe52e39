use std::path::PathBuf;

use feat2d_core::CoreError;
use feat2d_cv::CvError;
use feat2d_filter::FilterError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Cv(#[from] CvError),

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("JSON config error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML write error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("unsupported config format {0:?}, expected .toml or .json")]
    ConfigFormat(PathBuf),

    #[error("invalid pipeline setting `{name}`: {reason}")]
    InvalidSetting { name: &'static str, reason: String },

    #[error("image sequence is empty: start {start} is after end {end}")]
    EmptySequence { start: usize, end: usize },
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
