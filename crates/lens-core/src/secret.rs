//! Access to the Gemini API key stored in `secret.json`.

use async_trait::async_trait;

use crate::config::{GeminiConfig, SecretConfig};

/// Key and optional model override used to build the concept generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiCredentials {
    pub api_key: String,
    pub model: Option<String>,
}

impl GeminiCredentials {
    /// Credentials from the stored section, or `None` when its key is blank.
    pub fn from_config(config: &GeminiConfig) -> Option<Self> {
        let api_key = config.api_key.trim();
        if api_key.is_empty() {
            return None;
        }
        Some(Self {
            api_key: api_key.to_string(),
            model: config
                .model_name
                .as_deref()
                .map(str::trim)
                .filter(|model| !model.is_empty())
                .map(str::to_string),
        })
    }

    /// Credentials from a bare key, e.g. an environment variable.
    pub fn from_api_key(api_key: Option<String>) -> Option<Self> {
        let api_key = api_key?.trim().to_string();
        (!api_key.is_empty()).then_some(Self {
            api_key,
            model: None,
        })
    }
}

/// Source of secret configuration.
///
/// Error strings must never carry file content: the file holds API keys.
#[async_trait]
pub trait SecretService: Send + Sync {
    async fn load_secrets(&self) -> Result<SecretConfig, String>;

    async fn secret_file_exists(&self) -> bool;

    /// Gemini credentials, if a non-blank key is stored.
    async fn gemini_credentials(&self) -> Result<Option<GeminiCredentials>, String> {
        let secrets = self.load_secrets().await?;
        Ok(secrets.gemini.as_ref().and_then(GeminiCredentials::from_config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticSecrets(SecretConfig);

    #[async_trait]
    impl SecretService for StaticSecrets {
        async fn load_secrets(&self) -> Result<SecretConfig, String> {
            Ok(self.0.clone())
        }

        async fn secret_file_exists(&self) -> bool {
            true
        }
    }

    fn gemini(key: &str, model: Option<&str>) -> SecretConfig {
        SecretConfig {
            gemini: Some(GeminiConfig {
                api_key: key.to_string(),
                model_name: model.map(str::to_string),
            }),
        }
    }

    #[tokio::test]
    async fn test_stored_key_with_model_override() {
        let credentials = StaticSecrets(gemini(" file-key ", Some("gemini-2.5-pro")))
            .gemini_credentials()
            .await
            .unwrap()
            .unwrap();
        assert_eq!(credentials.api_key, "file-key");
        assert_eq!(credentials.model.as_deref(), Some("gemini-2.5-pro"));
    }

    #[tokio::test]
    async fn test_blank_key_is_absent() {
        let service = StaticSecrets(gemini("  ", Some("gemini-2.5-pro")));
        assert!(service.gemini_credentials().await.unwrap().is_none());
        assert!(
            StaticSecrets(SecretConfig::default())
                .gemini_credentials()
                .await
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_bare_key() {
        assert_eq!(
            GeminiCredentials::from_api_key(Some("env-key".into())),
            Some(GeminiCredentials {
                api_key: "env-key".into(),
                model: None
            })
        );
        assert!(GeminiCredentials::from_api_key(Some(" ".into())).is_none());
        assert!(GeminiCredentials::from_api_key(None).is_none());
    }
}
