//! Module wiring: collaborators, services and routes built once from config.

use std::sync::Arc;

use anyhow::Context as _;
use axum::Router;
use museum_auth::TokenService;
use museum_auth::axum_ext::AdminKey;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::rest::routes::{self, ConcreteServices};
use crate::config::{AiProvider, MuseumConfig, StorageProvider};
use crate::domain::ports::{ImageGenerator, ObjectStorage, TextGenerator};
use crate::domain::service::{AppServices, Collaborators, ServiceConfig};
use crate::domain::themes::ThemeCatalog;
use crate::infra::ai::{
    MockImageGenerator, MockTextGenerator, OpenAiImageGenerator, OpenAiTextGenerator,
};
use crate::infra::fetcher::HttpImageFetcher;
use crate::infra::object_storage::{MockStorage, S3Storage};
use crate::infra::storage::{
    Migrator, SeaCatalogRepository, SeaModifiedRepository, SeaUsersRepository,
};

pub struct MuseumModule {
    db: DatabaseConnection,
    services: Arc<ConcreteServices>,
    tokens: Arc<TokenService>,
    admin_key: AdminKey,
}

impl MuseumModule {
    /// Builds collaborators and services. Does not touch the schema; call
    /// [`Self::migrate`] first on a fresh database.
    ///
    /// # Errors
    /// Fails when a collaborator cannot be constructed or the theme template
    /// overrides do not fit the catalog.
    pub async fn init(db: DatabaseConnection, config: &MuseumConfig) -> anyhow::Result<Self> {
        info!("Initializing museum module");

        let catalog = ThemeCatalog::builtin()
            .with_template_objects(&config.themes.templates)
            .context("invalid museum.themes.templates")?;
        for theme in catalog.iter().filter(|t| !t.is_ready()) {
            warn!(theme_id = theme.id, "theme templates still reference placeholders");
        }

        let collaborators = build_collaborators(config).await?;
        let tokens = Arc::new(TokenService::new(
            &signing_secret(&config.auth.jwt_secret),
            config.auth.token_ttl,
        ));
        let admin_key = AdminKey::new(config.auth.admin_api_key.clone());

        let services = Arc::new(AppServices::new(
            db.clone(),
            SeaCatalogRepository::new(),
            SeaModifiedRepository::new(),
            SeaUsersRepository::new(),
            collaborators,
            Arc::clone(&tokens),
            Arc::new(catalog),
            ServiceConfig::default(),
        ));

        info!("Museum module initialized");
        Ok(Self {
            db,
            services,
            tokens,
            admin_key,
        })
    }

    /// # Errors
    /// Propagates migration failures.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        migrate(&self.db).await
    }

    #[must_use]
    pub fn register_rest(&self) -> Router {
        info!("Registering museum REST routes");
        routes::register_routes(
            Arc::clone(&self.services),
            Arc::clone(&self.tokens),
            self.admin_key.clone(),
        )
    }

    #[must_use]
    pub fn services(&self) -> Arc<ConcreteServices> {
        Arc::clone(&self.services)
    }

    #[must_use]
    pub fn tokens(&self) -> Arc<TokenService> {
        Arc::clone(&self.tokens)
    }
}

/// Applies pending migrations.
///
/// # Errors
/// Propagates migration failures.
pub async fn migrate(db: &DatabaseConnection) -> anyhow::Result<()> {
    info!("Running museum database migrations");
    Migrator::up(db, None).await?;
    info!("Museum database migrations completed successfully");
    Ok(())
}

async fn build_collaborators(config: &MuseumConfig) -> anyhow::Result<Collaborators> {
    let (text, images): (Arc<dyn TextGenerator>, Arc<dyn ImageGenerator>) = match config.ai.provider
    {
        AiProvider::Mock => {
            info!("using mock text and image generators");
            (Arc::new(MockTextGenerator), Arc::new(MockImageGenerator))
        }
        AiProvider::OpenAi => (
            Arc::new(OpenAiTextGenerator::new(&config.ai)?),
            Arc::new(OpenAiImageGenerator::new(&config.ai)?),
        ),
    };

    let storage: Arc<dyn ObjectStorage> = match config.storage.provider {
        StorageProvider::Mock => {
            info!(base_url = %config.storage.base_url, "using mock object storage");
            Arc::new(MockStorage::new(&config.storage.base_url))
        }
        StorageProvider::S3 => {
            let bucket = config
                .storage
                .bucket
                .clone()
                .context("museum.storage.bucket is required for s3")?;
            let region = config
                .storage
                .region
                .clone()
                .context("museum.storage.region is required for s3")?;
            Arc::new(S3Storage::new(bucket, region).await)
        }
    };

    Ok(Collaborators {
        text,
        images,
        fetcher: Arc::new(HttpImageFetcher::new(config.ai.timeout)?),
        storage,
    })
}

/// An unset secret (mock runs) gets a per-process random one, so tokens do
/// not survive a restart.
fn signing_secret(configured: &SecretString) -> SecretString {
    if configured.expose_secret().is_empty() {
        warn!("museum.auth.jwt_secret is empty; using an ephemeral signing secret");
        SecretString::from(format!(
            "{}{}",
            Uuid::new_v4().simple(),
            Uuid::new_v4().simple()
        ))
    } else {
        configured.clone()
    }
}
