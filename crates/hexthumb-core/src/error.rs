//! Error taxonomy shared by every hexthumb crate.
use std::path::PathBuf;

pub type ThumbResult<T> = Result<T, ThumbError>;

/// Everything that can go wrong between a catalog record and PNG bytes.
///
/// Only [`ThumbError::Allocation`] and [`ThumbError::Encode`] ever escape a
/// full render; everything else is produced by leaf operations and turned
/// into a fallback by the caller.
#[derive(Debug, thiserror::Error)]
pub enum ThumbError {
    #[error("render error: {0}")]
    Render(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("allocation failed: {0}")]
    Allocation(String),

    #[error("asset error: {message} ({path:?})")]
    Asset { message: String, path: PathBuf },

    #[error("font error: {0}")]
    Font(String),

    #[error("fetch error: {message} ({url})")]
    Fetch { message: String, url: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ThumbError {
    /// Create an asset error.
    pub fn asset(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        ThumbError::Asset {
            message: message.into(),
            path: path.into(),
        }
    }

    /// Create a fetch error for a remote resource.
    pub fn fetch(message: impl Into<String>, url: impl Into<String>) -> Self {
        ThumbError::Fetch {
            message: message.into(),
            url: url.into(),
        }
    }

    /// Whether the error is one of the resource/environment failures that a
    /// render is allowed to propagate.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ThumbError::Allocation(_) | ThumbError::Encode(_))
    }
}
