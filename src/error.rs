use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompressionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot decode or encode {path:?}: {source}")]
    Codec {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("PNG optimization error for {path:?}: {message}")]
    PngOptimization { path: PathBuf, message: String },

    #[error("Invalid quality value: {0}. Must be between 1 and 100")]
    InvalidQuality(u8),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid path {0:?}")]
    FileNotFound(PathBuf),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

impl CompressionError {
    /// Errors that only concern one file and must not stop a batch.
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            CompressionError::Io(_)
                | CompressionError::Codec { .. }
                | CompressionError::PngOptimization { .. }
                | CompressionError::Walk(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CompressionError>;
