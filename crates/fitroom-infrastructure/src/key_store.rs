//! File-backed API key store.
//!
//! The key is cached in memory and persisted to `secret.json` in the data
//! directory. A failed write is logged and tolerated: the in-memory key
//! stays usable for the rest of the run, so storage problems never block
//! the user.

use crate::paths::FitroomPaths;
use fitroom_core::error::{FitroomError, Result};
use fitroom_core::keystore::KeyStore;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SecretFile {
    api_key: Option<String>,
}

/// `KeyStore` implementation over a JSON file with an in-memory cache.
#[derive(Clone)]
pub struct FileKeyStore {
    path: PathBuf,
    /// Cached key. Written before any disk I/O so a persist failure never
    /// loses the value.
    cache: Arc<RwLock<Option<String>>>,
}

impl FileKeyStore {
    /// Creates a key store backed by `secret.json` under the given paths.
    pub fn new(paths: &FitroomPaths) -> Result<Self> {
        let path = paths
            .secret_file()
            .map_err(|e| FitroomError::config(e.to_string()))?;
        Ok(Self {
            path,
            cache: Arc::new(RwLock::new(None)),
        })
    }

    /// Creates a key store over an explicit file path.
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            cache: Arc::new(RwLock::new(None)),
        }
    }

    async fn read_file(&self) -> Result<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => {
                let file: SecretFile = serde_json::from_str(&text)?;
                Ok(file.api_key)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn write_file(&self, key: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let text = serde_json::to_string_pretty(&SecretFile {
            api_key: Some(key.to_string()),
        })?;
        tokio::fs::write(&self.path, text).await?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            tokio::fs::set_permissions(&self.path, perms).await?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl KeyStore for FileKeyStore {
    async fn load(&self) -> Result<Option<String>> {
        {
            let cache = self.cache.read().await;
            if cache.is_some() {
                return Ok(cache.clone());
            }
        }
        let loaded = self.read_file().await?;
        if loaded.is_some() {
            *self.cache.write().await = loaded.clone();
        }
        Ok(loaded)
    }

    async fn store(&self, key: &str) -> Result<()> {
        *self.cache.write().await = Some(key.to_string());
        if let Err(err) = self.write_file(key).await {
            // The key must not be logged; the failure reason is enough.
            log::warn!("could not persist API key, keeping it in memory only: {err}");
        }
        Ok(())
    }
}
