//! Error types for tez-compress

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CompressError>;

#[derive(Error, Debug)]
pub enum CompressError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid format: {0}")]
    InvalidFormat(String),

    #[error("unexpected end of stream while reading {0}")]
    UnexpectedEof(&'static str),

    #[error("stream of {length} bytes exceeds the supported maximum of {max}")]
    StreamTooLong { length: u64, max: u64 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    ConfigError(#[from] serde_json::Error),
}

impl CompressError {
    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        CompressError::InvalidArgument(msg.into())
    }

    pub(crate) fn invalid_format(msg: impl Into<String>) -> Self {
        CompressError::InvalidFormat(msg.into())
    }
}
