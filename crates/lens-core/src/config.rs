//! Configuration models.
//!
//! `AppConfig` mirrors `config.toml`; `SecretConfig` mirrors `secret.json`.
//! Loading lives in `lens-infrastructure`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::product::DEFAULT_MAX_IMAGE_BYTES;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
/// Same order of magnitude as a browser origin's local storage quota.
pub const DEFAULT_STORAGE_CAPACITY_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub generator: GeneratorConfig,
    pub storage: StorageConfig,
    pub image: ImageConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct GeneratorConfig {
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_GEMINI_MODEL.to_string(),
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    /// Total bytes the history medium may hold across all keys.
    pub capacity_bytes: u64,
    /// Overrides the default storage directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            capacity_bytes: DEFAULT_STORAGE_CAPACITY_BYTES,
            dir: None,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ImageConfig {
    pub max_bytes: u64,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<GeminiConfig>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str("[image]\nmax_bytes = 1024\n").unwrap();
        assert_eq!(config.image.max_bytes, 1024);
        assert_eq!(config.generator.model, DEFAULT_GEMINI_MODEL);
        assert_eq!(config.storage.capacity_bytes, DEFAULT_STORAGE_CAPACITY_BYTES);
    }

    #[test]
    fn test_secret_without_gemini_section() {
        let secrets: SecretConfig = serde_json::from_str("{}").unwrap();
        assert!(secrets.gemini.is_none());
    }
}
