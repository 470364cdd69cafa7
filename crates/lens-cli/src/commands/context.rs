//! Composition root: resolves paths, config and secrets, and wires services.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use lens_application::{ControllerSettings, SessionController};
use lens_core::clock::{Clock, SystemClock};
use lens_core::concept::ConceptGenerator;
use lens_core::config::AppConfig;
use lens_core::history::{HistoryStore, KeyValueStore};
use lens_core::secret::{GeminiCredentials, SecretService};
use lens_infrastructure::{
    ConfigService, FileKeyValueStore, InMemoryKeyValueStore, LensPaths, SecretServiceImpl,
};
use lens_interaction::GeminiConceptGenerator;

/// Environment variable consulted when secret.json has no key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Flags shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub home: Option<PathBuf>,
    pub ephemeral: bool,
}

/// Resolved configuration for one CLI invocation.
pub struct AppContext {
    pub paths: LensPaths,
    pub config: AppConfig,
    ephemeral: bool,
}

impl AppContext {
    pub fn open(globals: &GlobalOptions) -> Result<Self> {
        let paths = LensPaths::new(globals.home.as_deref());
        let config = ConfigService::new(&paths)?.load()?;
        tracing::debug!("[Bootstrap] Loaded config: {:?}", config);
        Ok(Self {
            paths,
            config,
            ephemeral: globals.ephemeral,
        })
    }

    /// Directory holding the history medium.
    pub fn storage_dir(&self) -> Result<PathBuf> {
        match &self.config.storage.dir {
            Some(dir) => Ok(dir.clone()),
            None => self
                .paths
                .storage_dir()
                .context("Failed to resolve storage directory"),
        }
    }

    fn storage(&self) -> Result<Arc<dyn KeyValueStore>> {
        if self.ephemeral {
            tracing::info!("[Bootstrap] Using in-memory history");
            return Ok(Arc::new(InMemoryKeyValueStore::with_capacity(
                self.config.storage.capacity_bytes,
            )));
        }
        let dir = self.storage_dir()?;
        tracing::info!("[Bootstrap] Using history at {:?}", dir);
        Ok(Arc::new(FileKeyValueStore::new(
            dir,
            self.config.storage.capacity_bytes,
        )))
    }

    /// Opens the history store over the configured medium.
    pub fn history_store(&self) -> Result<HistoryStore> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Ok(HistoryStore::initialize(self.storage()?, clock))
    }

    pub fn secret_service(&self) -> Result<SecretServiceImpl> {
        SecretServiceImpl::new(&self.paths)
    }

    /// Builds the Gemini generator from secret.json or the environment.
    ///
    /// A key in secret.json wins over the environment variable.
    pub async fn generator(&self) -> Result<Arc<dyn ConceptGenerator>> {
        let stored = self
            .secret_service()?
            .gemini_credentials()
            .await
            .map_err(|e| anyhow::anyhow!(e))?;

        let Some(credentials) =
            stored.or_else(|| GeminiCredentials::from_api_key(std::env::var(API_KEY_ENV).ok()))
        else {
            let secret_file = self.paths.secret_file()?;
            bail!(
                "No Gemini API key found. Add one to {} or set {}.",
                secret_file.display(),
                API_KEY_ENV
            );
        };

        let mut generator =
            GeminiConceptGenerator::from_config(credentials.api_key, &self.config.generator);
        if let Some(model) = credentials.model {
            generator = generator.with_model(model);
        }
        tracing::info!("[Bootstrap] Gemini model: {}", generator.model());
        Ok(Arc::new(generator))
    }

    /// Builds a controller around a fresh session.
    pub async fn controller(&self) -> Result<SessionController> {
        let generator = self.generator().await?;
        Ok(SessionController::new(
            self.history_store()?,
            generator,
            Arc::new(SystemClock),
            ControllerSettings::from_config(&self.config),
        ))
    }
}
