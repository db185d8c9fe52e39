use thiserror::Error;

use crate::kinds::{DescriptorKind, DetectorKind};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown {category} type: {key:?}")]
    UnknownKind { category: &'static str, key: String },

    #[error("{descriptor} descriptors cannot be computed on {detector} keypoints")]
    IncompatibleCombination {
        detector: DetectorKind,
        descriptor: DescriptorKind,
    },

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("config file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "serde")]
    #[error("JSON config error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "serde")]
    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[cfg(feature = "serde")]
    #[error("TOML write error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl CoreError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        CoreError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
