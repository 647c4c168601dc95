use async_trait::async_trait;
use museum_sdk::CatalogObject;
use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::domain::error::DomainError;

/// Persistence of catalog objects (presets and user-made).
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn find<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<Option<CatalogObject>, DomainError>;

    async fn insert<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        object: &CatalogObject,
    ) -> Result<(), DomainError>;

    /// Overwrites every mutable column of an existing object.
    async fn update<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        object: &CatalogObject,
    ) -> Result<(), DomainError>;

    /// Returns `false` when nothing was deleted.
    async fn delete<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<bool, DomainError>;

    /// All presets, newest first.
    async fn list_presets<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
    ) -> Result<Vec<CatalogObject>, DomainError>;

    /// User-made objects among `ids`, newest first.
    async fn list_user_made<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        ids: &[Uuid],
    ) -> Result<Vec<CatalogObject>, DomainError>;
}
