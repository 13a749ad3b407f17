//! Error types for cover post-processing.

use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while finalizing a cover.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Failed to fetch remote artifact: {0}")]
    FetchFailed(String),

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("Watermarking failed: {0}")]
    WatermarkFailed(String),

    #[error("Storage error: {0}")]
    Storage(#[from] coverai_storage::StorageError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    pub fn fetch_failed(msg: impl Into<String>) -> Self {
        Self::FetchFailed(msg.into())
    }

    pub fn decode_failed(msg: impl Into<String>) -> Self {
        Self::DecodeFailed(msg.into())
    }

    pub fn watermark_failed(msg: impl Into<String>) -> Self {
        Self::WatermarkFailed(msg.into())
    }
}
