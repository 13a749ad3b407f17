//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Provider error: {0}")]
    Provider(#[from] coverai_providers::ProviderError),

    #[error("Media error: {0}")]
    Media(#[from] coverai_media::MediaError),

    #[error("Storage error: {0}")]
    Storage(#[from] coverai_storage::StorageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
