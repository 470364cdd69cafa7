//! Secret service implementation.
//!
//! This module provides a service for loading API keys stored in secret.json.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use anyhow::Result;
use lens_core::config::SecretConfig;
use lens_core::secret::SecretService;

use crate::paths::LensPaths;

/// Service for loading secret configuration.
///
/// Reads `secret.json` on first use and caches the result. A missing file
/// yields an empty configuration rather than an error.
///
/// # Example
///
/// ```ignore
/// use lens_infrastructure::SecretServiceImpl;
/// use lens_core::secret::SecretService;
///
/// let service = SecretServiceImpl::new(&LensPaths::default())?;
/// let secrets = service.load_secrets().await?;
/// ```
#[derive(Clone)]
pub struct SecretServiceImpl {
    /// Cached secret config loaded from storage.
    /// Uses RwLock for thread-safe lazy loading.
    secrets: Arc<RwLock<Option<SecretConfig>>>,
    file_path: PathBuf,
}

impl SecretServiceImpl {
    /// Creates a new SecretServiceImpl reading from `paths.secret_file()`.
    pub fn new(paths: &LensPaths) -> Result<Self> {
        let file_path = paths
            .secret_file()
            .map_err(|e| anyhow::anyhow!("Failed to get secret path: {}", e))?;
        Ok(Self::with_path(file_path))
    }

    pub fn with_path(file_path: PathBuf) -> Self {
        Self {
            secrets: Arc::new(RwLock::new(None)),
            file_path,
        }
    }

    /// Loads the secrets from disk if not already cached.
    fn load_secrets_internal(&self) -> std::result::Result<SecretConfig, String> {
        {
            let read_lock = self
                .secrets
                .read()
                .map_err(|_| "Secret cache lock poisoned".to_string())?;
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let loaded = match std::fs::read_to_string(&self.file_path) {
            Ok(content) if content.trim().is_empty() => SecretConfig::default(),
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| format!("Failed to parse secret.json: {}", e))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("[Secrets] No secret file at {:?}", self.file_path);
                SecretConfig::default()
            }
            Err(e) => return Err(format!("Failed to read secret.json: {}", e)),
        };

        {
            let mut write_lock = self
                .secrets
                .write()
                .map_err(|_| "Secret cache lock poisoned".to_string())?;
            *write_lock = Some(loaded.clone());
        }

        Ok(loaded)
    }
}

#[async_trait::async_trait]
impl SecretService for SecretServiceImpl {
    async fn load_secrets(&self) -> std::result::Result<SecretConfig, String> {
        self.load_secrets_internal()
    }

    async fn secret_file_exists(&self) -> bool {
        self.file_path.exists()
    }
}
