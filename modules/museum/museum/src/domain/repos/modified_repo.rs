use async_trait::async_trait;
use museum_sdk::ModifiedObject;
use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::domain::error::DomainError;

/// Persistence of placed objects. Ownership lives in the users repository.
#[async_trait]
pub trait ModifiedRepository: Send + Sync {
    async fn find<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<Option<ModifiedObject>, DomainError>;

    async fn insert<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        object: &ModifiedObject,
    ) -> Result<(), DomainError>;

    async fn update<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        object: &ModifiedObject,
    ) -> Result<(), DomainError>;

    /// Returns `false` when nothing was deleted.
    async fn delete<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<bool, DomainError>;

    async fn delete_many<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        ids: &[Uuid],
    ) -> Result<u64, DomainError>;

    /// Objects whose id is in `ids`, newest first.
    async fn list_by_ids<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        ids: &[Uuid],
    ) -> Result<Vec<ModifiedObject>, DomainError>;
}
