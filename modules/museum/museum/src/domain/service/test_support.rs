//! Shared fixtures for service tests: a migrated in-memory database, seeded
//! rows and deterministic collaborators.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use museum_auth::TokenService;
use museum_sdk::{CatalogObject, ImageVariant, PlacementSurface};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use secrecy::SecretString;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{AppServices, Collaborators, ServiceConfig};
use crate::domain::error::DomainError;
use crate::domain::ports::{ImageBytes, ImageFetcher, TextGenerator, TextOptions};
use crate::domain::repos::{CatalogRepository, NewUser, UsersRepository};
use crate::domain::themes::ThemeCatalog;
use crate::infra::ai::{MockImageGenerator, MockTextGenerator};
use crate::infra::object_storage::MockStorage;
use crate::infra::storage::{
    Migrator, SeaCatalogRepository, SeaModifiedRepository, SeaUsersRepository, connect,
};

pub(crate) type TestServices =
    AppServices<SeaCatalogRepository, SeaModifiedRepository, SeaUsersRepository>;

pub(crate) const TEST_SECRET: &str = "0123456789abcdef0123456789abcdef";

pub(crate) async fn db() -> DatabaseConnection {
    let db = connect("sqlite::memory:", 1).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

/// Text generator that always fails.
pub(crate) struct FailingText;

#[async_trait]
impl TextGenerator for FailingText {
    async fn generate_text(&self, _prompt: &str, _options: &TextOptions) -> Result<String, DomainError> {
        Err(DomainError::generation("provider unavailable"))
    }
}

/// Text generator with a canned reply.
pub(crate) struct CannedText(pub &'static str);

#[async_trait]
impl TextGenerator for CannedText {
    async fn generate_text(&self, _prompt: &str, _options: &TextOptions) -> Result<String, DomainError> {
        Ok(self.0.to_owned())
    }
}

/// Fetcher that never touches the network.
pub(crate) struct StaticFetcher;

#[async_trait]
impl ImageFetcher for StaticFetcher {
    async fn fetch(&self, _url: &str) -> Result<ImageBytes, DomainError> {
        Ok(ImageBytes {
            bytes: Bytes::from_static(b"\x89PNG"),
            mime_type: "image/png".to_owned(),
        })
    }
}

pub(crate) fn collaborators(text: Arc<dyn TextGenerator>) -> Collaborators {
    Collaborators {
        text,
        images: Arc::new(MockImageGenerator),
        fetcher: Arc::new(StaticFetcher),
        storage: Arc::new(MockStorage::new("http://cdn.test/uploads")),
    }
}

pub(crate) fn services_with(
    db: &DatabaseConnection,
    catalog: ThemeCatalog,
    text: Arc<dyn TextGenerator>,
) -> TestServices {
    let tokens = Arc::new(TokenService::new(
        &SecretString::from(TEST_SECRET.to_owned()),
        Duration::from_secs(3600),
    ));
    AppServices::new(
        db.clone(),
        SeaCatalogRepository::new(),
        SeaModifiedRepository::new(),
        SeaUsersRepository::new(),
        collaborators(text),
        tokens,
        Arc::new(catalog),
        ServiceConfig::default(),
    )
}

pub(crate) fn services(db: &DatabaseConnection, catalog: ThemeCatalog) -> TestServices {
    services_with(db, catalog, Arc::new(MockTextGenerator))
}

pub(crate) async fn seed_user(db: &DatabaseConnection) -> Uuid {
    let id = Uuid::new_v4();
    SeaUsersRepository::new()
        .create(
            db,
            NewUser {
                id,
                email: format!("{id}@museum.test"),
                name: None,
                password_hash: "not-a-real-hash".to_owned(),
                created_at: OffsetDateTime::now_utc(),
            },
        )
        .await
        .unwrap();
    id
}

pub(crate) fn variant(name: &str) -> ImageVariant {
    ImageVariant {
        variant_id: Some(Uuid::new_v4()),
        name: name.to_owned(),
        color: "#a0a0a0".to_owned(),
        image_url: format!("https://cdn.test/{name}.png"),
    }
}

/// Stores a catalog object with the given variant names.
pub(crate) async fn seed_object(
    db: &DatabaseConnection,
    name: &str,
    variant_names: &[&str],
    is_user_made: bool,
) -> CatalogObject {
    let variants: Vec<ImageVariant> = variant_names.iter().map(|n| variant(n)).collect();
    let now = OffsetDateTime::now_utc();
    let object = CatalogObject {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        description: Some(format!("{name} description")),
        current_image_variant: variants[0].clone(),
        image_variants: variants,
        is_user_made,
        placement_surface: PlacementSurface::Floor,
        created_at: now,
        updated_at: now,
    };
    SeaCatalogRepository::new().insert(db, &object).await.unwrap();
    object
}
