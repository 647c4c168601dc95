//! Layered server configuration.
//!
//! Order: built-in defaults, then the YAML file, then `MUSEUM__*` environment
//! variables, then CLI overrides applied by `main`.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context as _, bail};
use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use figment::value::{Uncased, UncasedStr};
use museum::MuseumConfig;
use museum::config::{AiProvider, StorageProvider};
use serde::{Deserialize, Serialize};

pub const ENV_PREFIX: &str = "MUSEUM__";

/// Sections of [`MuseumConfig`] that may be set from the environment without
/// the `museum` level, e.g. `MUSEUM__AUTH__JWT_SECRET`.
const MODULE_SECTIONS: [&str; 4] = ["auth", "ai", "storage", "themes"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub museum: MuseumConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind_addr: String,
    #[serde(with = "museum::config::humantime_duration")]
    pub request_timeout: Duration,
    pub body_limit_bytes: usize,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_owned(),
            request_timeout: Duration::from_secs(180),
            body_limit_bytes: 16 * 1024 * 1024,
            cors_allowed_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://museum.db?mode=rwc".to_owned(),
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Text,
        }
    }
}

fn env_key(key: &UncasedStr) -> Uncased<'_> {
    let dotted = key.as_str().to_ascii_lowercase().replace("__", ".");
    let section = dotted.split('.').next().unwrap_or_default();
    if MODULE_SECTIONS.contains(&section) {
        Uncased::from(format!("museum.{dotted}"))
    } else {
        Uncased::from(dotted)
    }
}

impl AppConfig {
    /// Loads the layered configuration.
    ///
    /// # Errors
    /// Fails when an explicit file does not exist or any layer does not match
    /// the schema.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        Self::figment(path)?
            .extract()
            .context("invalid configuration")
    }

    fn figment(path: Option<&Path>) -> anyhow::Result<Figment> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            if !path.is_file() {
                bail!("config file does not exist: {}", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).map(env_key)))
    }

    /// Replaces the port of `server.bind_addr`.
    pub fn override_port(&mut self, port: u16) {
        let host = self
            .server
            .bind_addr
            .rsplit_once(':')
            .map_or(self.server.bind_addr.as_str(), |(host, _)| host);
        self.server.bind_addr = format!("{host}:{port}");
    }

    /// In-memory database and mock collaborators.
    pub fn apply_mock_profile(&mut self) {
        "sqlite::memory:".clone_into(&mut self.database.url);
        self.museum.ai.provider = AiProvider::Mock;
        self.museum.storage.provider = StorageProvider::Mock;
    }

    /// # Errors
    /// The first invalid setting found.
    pub fn validate(&self, mock: bool) -> anyhow::Result<()> {
        if self.database.url.trim().is_empty() {
            bail!("database.url must not be empty");
        }
        if self.database.max_connections == 0 {
            bail!("database.max_connections must be greater than zero");
        }
        if self.server.request_timeout.is_zero() {
            bail!("server.request_timeout must be greater than zero");
        }
        self.museum.validate(mock)?;
        Ok(())
    }

    /// Effective configuration as pretty JSON; secrets are redacted by their
    /// serializers.
    ///
    /// # Errors
    /// Propagates serialization failures.
    pub fn to_pretty_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
