//! Unified path management for Lens configuration and storage.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/lifestyle-lens/          # Config directory
//! ├── config.toml                    # Application configuration
//! └── secret.json                    # API keys
//!
//! ~/.local/share/lifestyle-lens/     # Data directory
//! └── storage/                       # Key-value medium (history ledger)
//!     └── lifestyle_lens_history.json
//! ```
//!
//! When a base directory is given, both trees live under it instead
//! (`<base>/config.toml`, `<base>/storage/...`).

use std::path::{Path, PathBuf};

use lens_core::config::{GeminiConfig, SecretConfig};

const APP_DIR_NAME: &str = "lifestyle-lens";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Resolves every path Lens reads or writes.
#[derive(Debug, Clone, Default)]
pub struct LensPaths {
    base: Option<PathBuf>,
}

impl LensPaths {
    /// Creates a resolver. `None` uses the platform directories.
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    /// Returns the configuration directory (e.g., `~/.config/lifestyle-lens/`).
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        if let Some(base) = &self.base {
            return Ok(base.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the data directory (e.g., `~/.local/share/lifestyle-lens/`).
    pub fn data_dir(&self) -> Result<PathBuf, PathError> {
        if let Some(base) = &self.base {
            return Ok(base.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or(PathError::HomeDirNotFound)
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Returns the path to the secrets file.
    ///
    /// # Security Note
    ///
    /// Ensure this file has appropriate permissions (e.g., 600) to prevent
    /// unauthorized access.
    pub fn secret_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("secret.json"))
    }

    /// Directory holding the key-value medium.
    pub fn storage_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.data_dir()?.join("storage"))
    }

    /// Ensures the secret file exists, creating it with a template if it doesn't.
    ///
    /// The file is created with permissions 600 on Unix systems.
    pub fn ensure_secret_file(&self) -> Result<PathBuf, std::io::Error> {
        let secret_path = self
            .secret_file()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e.to_string()))?;

        if secret_path.exists() {
            return Ok(secret_path);
        }

        if let Some(parent) = secret_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let template_config = SecretConfig {
            gemini: Some(GeminiConfig {
                api_key: String::new(),
                model_name: None,
            }),
        };
        let template_json =
            serde_json::to_string_pretty(&template_config).map_err(std::io::Error::other)?;
        std::fs::write(&secret_path, template_json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&secret_path, permissions)?;
        }

        Ok(secret_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_base_dir_overrides_platform_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LensPaths::new(Some(temp_dir.path()));

        assert_eq!(
            paths.config_file().unwrap(),
            temp_dir.path().join("config.toml")
        );
        assert_eq!(
            paths.secret_file().unwrap(),
            temp_dir.path().join("secret.json")
        );
        assert_eq!(
            paths.storage_dir().unwrap(),
            temp_dir.path().join("storage")
        );
    }

    #[test]
    fn test_platform_config_dir_is_namespaced() {
        if let Ok(config_dir) = LensPaths::new(None).config_dir() {
            assert!(config_dir.ends_with(APP_DIR_NAME));
        }
    }

    #[test]
    fn test_ensure_secret_file_writes_template_once() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LensPaths::new(Some(temp_dir.path()));

        let path = paths.ensure_secret_file().unwrap();
        let template: SecretConfig =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(template.gemini.unwrap().api_key, "");

        std::fs::write(&path, r#"{"gemini":{"api_key":"kept"}}"#).unwrap();
        paths.ensure_secret_file().unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("kept"));
    }
}
