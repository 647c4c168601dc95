use async_trait::async_trait;
use museum_sdk::CatalogObject;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use super::entity::catalog_object::{Column, Entity as CatalogEntity};
use super::mapper::{catalog_from_model, catalog_to_active};
use crate::domain::error::DomainError;
use crate::domain::repos::CatalogRepository;

/// SeaORM-backed catalog repository; stateless, the connection is passed in.
#[derive(Clone, Default)]
pub struct SeaCatalogRepository;

impl SeaCatalogRepository {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CatalogRepository for SeaCatalogRepository {
    async fn find<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<Option<CatalogObject>, DomainError> {
        CatalogEntity::find_by_id(id)
            .one(conn)
            .await?
            .map(catalog_from_model)
            .transpose()
    }

    async fn insert<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        object: &CatalogObject,
    ) -> Result<(), DomainError> {
        catalog_to_active(object)?.insert(conn).await?;
        Ok(())
    }

    async fn update<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        object: &CatalogObject,
    ) -> Result<(), DomainError> {
        let mut active = catalog_to_active(object)?;
        active.created_at = sea_orm::ActiveValue::NotSet;
        active.update(conn).await.map_err(|e| match e {
            sea_orm::DbErr::RecordNotUpdated => DomainError::not_found("Object", object.id),
            other => other.into(),
        })?;
        Ok(())
    }

    async fn delete<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<bool, DomainError> {
        let res = CatalogEntity::delete_by_id(id).exec(conn).await?;
        Ok(res.rows_affected > 0)
    }

    async fn list_presets<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
    ) -> Result<Vec<CatalogObject>, DomainError> {
        CatalogEntity::find()
            .filter(Column::IsUserMade.eq(false))
            .order_by_desc(Column::CreatedAt)
            .all(conn)
            .await?
            .into_iter()
            .map(catalog_from_model)
            .collect()
    }

    async fn list_user_made<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        ids: &[Uuid],
    ) -> Result<Vec<CatalogObject>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        CatalogEntity::find()
            .filter(Column::IsUserMade.eq(true))
            .filter(Column::Id.is_in(ids.iter().copied()))
            .order_by_desc(Column::CreatedAt)
            .all(conn)
            .await?
            .into_iter()
            .map(catalog_from_model)
            .collect()
    }
}
