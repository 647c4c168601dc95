//! Module configuration.
//!
//! Deserialized from the `museum` section of the server config. Secrets stay
//! wrapped in [`SecretString`] and serialize as `"***"` so the effective config
//! can be printed safely.

use std::collections::BTreeMap;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

use museum_auth::jwt::MIN_SECRET_LEN;

const REDACTED: &str = "***";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MuseumConfig {
    pub auth: AuthConfig,
    pub ai: AiConfig,
    pub storage: StorageConfig,
    pub themes: ThemesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    #[serde(serialize_with = "redact")]
    pub jwt_secret: SecretString,
    #[serde(with = "humantime_duration")]
    pub token_ttl: Duration,
    #[serde(serialize_with = "redact_opt")]
    pub admin_api_key: Option<SecretString>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: SecretString::from(String::new()),
            token_ttl: Duration::from_secs(24 * 60 * 60),
            admin_api_key: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    #[default]
    Mock,
    OpenAi,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AiConfig {
    pub provider: AiProvider,
    #[serde(serialize_with = "redact_opt")]
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub text_model: String,
    pub image_model: String,
    pub max_tokens: u32,
    #[serde(with = "humantime_duration")]
    pub timeout: Duration,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: AiProvider::Mock,
            api_key: None,
            base_url: "https://api.openai.com/v1".to_owned(),
            text_model: "gpt-4o-mini".to_owned(),
            image_model: "gpt-image-1".to_owned(),
            max_tokens: 2000,
            timeout: Duration::from_secs(120),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    #[default]
    Mock,
    S3,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    pub provider: StorageProvider,
    pub bucket: Option<String>,
    pub region: Option<String>,
    /// Public prefix for the mock provider's URLs.
    pub base_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: StorageProvider::Mock,
            bucket: None,
            region: None,
            base_url: "http://localhost:8080/uploads".to_owned(),
        }
    }
}

/// Real catalog ids for theme template slots, keyed by theme id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemesConfig {
    pub templates: BTreeMap<String, Vec<Uuid>>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("museum.auth.jwt_secret must be at least {} bytes", MIN_SECRET_LEN)]
    WeakJwtSecret,
    #[error("museum.ai.api_key is required for the openai provider")]
    MissingAiKey,
    #[error("museum.storage.{0} is required for the s3 provider")]
    MissingStorageField(&'static str),
    #[error("museum.ai.timeout must be greater than zero")]
    ZeroTimeout,
}

impl MuseumConfig {
    /// Checks cross-field requirements. `mock` relaxes the secret length so
    /// local runs work without setup.
    ///
    /// # Errors
    /// The first [`ConfigError`] found.
    pub fn validate(&self, mock: bool) -> Result<(), ConfigError> {
        if !mock && self.auth.jwt_secret.expose_secret().len() < MIN_SECRET_LEN {
            return Err(ConfigError::WeakJwtSecret);
        }
        if self.ai.provider == AiProvider::OpenAi
            && self
                .ai
                .api_key
                .as_ref()
                .is_none_or(|k| k.expose_secret().trim().is_empty())
        {
            return Err(ConfigError::MissingAiKey);
        }
        if self.ai.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.storage.provider == StorageProvider::S3 {
            if self.storage.bucket.as_deref().is_none_or(str::is_empty) {
                return Err(ConfigError::MissingStorageField("bucket"));
            }
            if self.storage.region.as_deref().is_none_or(str::is_empty) {
                return Err(ConfigError::MissingStorageField("region"));
            }
        }
        Ok(())
    }
}

fn redact<S: Serializer>(secret: &SecretString, s: S) -> Result<S::Ok, S::Error> {
    if secret.expose_secret().is_empty() {
        s.serialize_str("")
    } else {
        s.serialize_str(REDACTED)
    }
}

#[allow(clippy::ref_option)] // serde's serialize_with hands us &Option<T>
fn redact_opt<S: Serializer>(secret: &Option<SecretString>, s: S) -> Result<S::Ok, S::Error> {
    match secret {
        Some(secret) => redact(secret, s),
        None => s.serialize_none(),
    }
}

/// `Duration` as a humantime string, e.g. `"24h"` or `"2m 30s"`.
///
/// Use with `#[serde(with = "museum::config::humantime_duration")]`.
pub mod humantime_duration {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de};

    /// # Errors
    /// Propagates serializer failures.
    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&humantime::format_duration(*d).to_string())
    }

    /// # Errors
    /// Fails on anything humantime cannot parse.
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(d)?;
        humantime::parse_duration(&raw).map_err(de::Error::custom)
    }
}
