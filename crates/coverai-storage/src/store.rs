//! Local cover store.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};

/// A persisted cover with its stable public locator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCover {
    /// Storage key relative to the root
    pub key: String,
    /// Absolute path on disk
    pub path: PathBuf,
    /// Public URL the frontend serves the cover from
    pub url: String,
}

/// Configuration for the local store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory final covers are written under
    pub root: PathBuf,
    /// Public base path prefixed to stored keys
    pub public_base: String,
}

impl StoreConfig {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        let root = std::env::var("COVERAI_STORAGE_ROOT")
            .map_err(|_| StorageError::config_error("COVERAI_STORAGE_ROOT not set"))?;
        let public_base =
            std::env::var("COVERAI_PUBLIC_BASE").unwrap_or_else(|_| "/media".to_string());
        Ok(Self {
            root: PathBuf::from(root),
            public_base,
        })
    }
}

/// Filesystem-backed store for finalized covers.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
    public_base: String,
}

impl LocalStore {
    /// Open a store rooted at `config.root`, creating the covers directory
    /// if it does not exist.
    pub async fn open(config: StoreConfig) -> StorageResult<Self> {
        let covers_dir = config.root.join("covers");
        tokio::fs::create_dir_all(&covers_dir).await?;
        debug!("Cover store rooted at {}", config.root.display());
        Ok(Self {
            root: config.root,
            public_base: config.public_base.trim_end_matches('/').to_string(),
        })
    }

    /// Open from environment variables.
    pub async fn from_env() -> StorageResult<Self> {
        Self::open(StoreConfig::from_env()?).await
    }

    /// Storage root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist final cover bytes under `covers/{id}.png`.
    pub async fn save_cover(&self, id: &str, bytes: &[u8]) -> StorageResult<StoredCover> {
        if id.is_empty() || id.contains(['/', '\\', '.']) {
            return Err(StorageError::invalid_key(format!(
                "cover id must be a bare identifier: {id:?}"
            )));
        }

        let key = format!("covers/{id}.png");
        let path = self.root.join(&key);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| StorageError::write_failed(format!("{}: {e}", path.display())))?;

        info!("Stored cover {} ({} bytes)", key, bytes.len());
        Ok(StoredCover {
            url: format!("{}/{key}", self.public_base),
            key,
            path,
        })
    }

    /// Check whether a stored cover still exists.
    pub async fn exists(&self, key: &str) -> bool {
        tokio::fs::try_exists(self.root.join(key)).await.unwrap_or(false)
    }

    /// Delete a stored cover.
    pub async fn delete(&self, key: &str) -> StorageResult<()> {
        tokio::fs::remove_file(self.root.join(key)).await?;
        Ok(())
    }
}
