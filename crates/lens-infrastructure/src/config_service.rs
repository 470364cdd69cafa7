//! Loads and writes `config.toml`.

use std::path::PathBuf;

use lens_core::config::AppConfig;
use lens_core::error::{LensError, Result};

use crate::paths::LensPaths;
use crate::storage::AtomicFile;

/// Service for the application configuration file.
///
/// A missing file means "all defaults"; a file that fails to parse is a
/// configuration error rather than something to silently ignore.
pub struct ConfigService {
    file: AtomicFile,
}

impl ConfigService {
    pub fn new(paths: &LensPaths) -> Result<Self> {
        let path = paths
            .config_file()
            .map_err(|e| LensError::config(e.to_string()))?;
        Ok(Self::with_path(path))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: AtomicFile::new(path),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        self.file.path()
    }

    /// Loads the configuration, falling back to defaults when absent.
    pub fn load(&self) -> Result<AppConfig> {
        match self.file.read()? {
            None => Ok(AppConfig::default()),
            Some(content) if content.trim().is_empty() => Ok(AppConfig::default()),
            Some(content) => toml::from_str(&content).map_err(|e| {
                LensError::config(format!("{}: {}", self.file.path().display(), e))
            }),
        }
    }

    pub fn save(&self, config: &AppConfig) -> Result<()> {
        let content = toml::to_string_pretty(config)?;
        self.file.write(&content)
    }

    /// Writes the default configuration unless a file already exists.
    ///
    /// Returns `true` when a file was created.
    pub fn init(&self) -> Result<bool> {
        if self.file.path().exists() {
            return Ok(false);
        }
        self.save(&AppConfig::default())?;
        tracing::info!("[Config] Wrote default config to {:?}", self.file.path());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::new(&LensPaths::new(Some(temp_dir.path()))).unwrap();
        assert_eq!(service.load().unwrap(), AppConfig::default());
    }

    #[test]
    fn test_init_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(temp_dir.path().join("config.toml"));

        assert!(service.init().unwrap());
        assert!(!service.init().unwrap());
        assert_eq!(service.load().unwrap(), AppConfig::default());
    }

    #[test]
    fn test_custom_values_survive_save() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(temp_dir.path().join("config.toml"));

        let mut config = AppConfig::default();
        config.generator.model = "gemini-2.5-flash".to_string();
        config.storage.capacity_bytes = 1024;
        service.save(&config).unwrap();

        assert_eq!(service.load().unwrap(), config);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[generator\nmodel = ").unwrap();

        let err = ConfigService::with_path(path).load().unwrap_err();
        assert!(matches!(err, LensError::Config(_)));
    }
}
