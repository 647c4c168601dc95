use async_trait::async_trait;
use museum_sdk::ModifiedObject;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use super::entity::modified_object::{Column, Entity as ModifiedEntity};
use super::mapper::{modified_from_model, modified_to_active};
use crate::domain::error::DomainError;
use crate::domain::repos::ModifiedRepository;

#[derive(Clone, Default)]
pub struct SeaModifiedRepository;

impl SeaModifiedRepository {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ModifiedRepository for SeaModifiedRepository {
    async fn find<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<Option<ModifiedObject>, DomainError> {
        ModifiedEntity::find_by_id(id)
            .one(conn)
            .await?
            .map(modified_from_model)
            .transpose()
    }

    async fn insert<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        object: &ModifiedObject,
    ) -> Result<(), DomainError> {
        modified_to_active(object)?.insert(conn).await?;
        Ok(())
    }

    async fn update<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        object: &ModifiedObject,
    ) -> Result<(), DomainError> {
        let mut active = modified_to_active(object)?;
        active.created_at = sea_orm::ActiveValue::NotSet;
        active.update(conn).await.map_err(|e| match e {
            sea_orm::DbErr::RecordNotUpdated => DomainError::not_found("Modified object", object.id),
            other => other.into(),
        })?;
        Ok(())
    }

    async fn delete<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<bool, DomainError> {
        let res = ModifiedEntity::delete_by_id(id).exec(conn).await?;
        Ok(res.rows_affected > 0)
    }

    async fn delete_many<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        ids: &[Uuid],
    ) -> Result<u64, DomainError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let res = ModifiedEntity::delete_many()
            .filter(Column::Id.is_in(ids.iter().copied()))
            .exec(conn)
            .await?;
        Ok(res.rows_affected)
    }

    async fn list_by_ids<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        ids: &[Uuid],
    ) -> Result<Vec<ModifiedObject>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut objects = ModifiedEntity::find()
            .filter(Column::Id.is_in(ids.iter().copied()))
            .all(conn)
            .await?
            .into_iter()
            .map(modified_from_model)
            .collect::<Result<Vec<_>, _>>()?;

        // Newest first; equal timestamps (one provisioning run) fall back to
        // the reverse of their position in `ids`.
        let position = |id: &Uuid| ids.iter().position(|i| i == id).unwrap_or(0);
        objects.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| position(&b.id).cmp(&position(&a.id)))
        });
        Ok(objects)
    }
}
