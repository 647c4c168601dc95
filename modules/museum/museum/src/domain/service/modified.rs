use std::sync::Arc;

use museum_sdk::{Interaction, ModifiedObject, ModifiedObjectPatch, NewModifiedObject};
use sea_orm::{DatabaseConnection, TransactionTrait};
use time::OffsetDateTime;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::repos::{CatalogRepository, ModifiedRepository, UsersRepository};

const ENTITY: &str = "Modified object";

/// Lifecycle of placed objects. Ownership is membership in the owner's
/// `modifiedObjectIds`; both writes of create and delete share a transaction.
pub struct ModifiedService<CR, MR, UR> {
    db: DatabaseConnection,
    catalog: Arc<CR>,
    modified: Arc<MR>,
    users: Arc<UR>,
}

impl<CR, MR, UR> ModifiedService<CR, MR, UR>
where
    CR: CatalogRepository,
    MR: ModifiedRepository,
    UR: UsersRepository,
{
    pub fn new(
        db: DatabaseConnection,
        catalog: Arc<CR>,
        modified: Arc<MR>,
        users: Arc<UR>,
    ) -> Self {
        Self {
            db,
            catalog,
            modified,
            users,
        }
    }

    /// # Errors
    /// `Validation` for a bad name, payload or variant; `NotFound` when the
    /// original object does not exist.
    #[instrument(
        skip(self, input, owner_id),
        fields(owner_id = %owner_id, original_object_id = %input.original_object_id)
    )]
    pub async fn create(
        &self,
        owner_id: Uuid,
        input: NewModifiedObject,
    ) -> Result<ModifiedObject, DomainError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name", "is required"));
        }
        let interaction =
            Interaction::from_parts(input.item_function, input.additional_data.as_ref())?;

        let original = self
            .catalog
            .find(&self.db, input.original_object_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Object", input.original_object_id))?;

        if original.image_variants.is_empty() {
            return Err(DomainError::validation(
                "originalObjectId",
                "original object has no image variants",
            ));
        }
        let selected = original
            .find_variant(input.current_image_variant_id)
            .ok_or_else(|| {
                DomainError::validation(
                    "currentImageVariantId",
                    "does not belong to the original object",
                )
            })?
            .snapshot();

        let now = OffsetDateTime::now_utc();
        let object = ModifiedObject {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            description: input.description.or_else(|| original.description.clone()),
            current_image_variant: selected,
            image_variants: original.snapshot_variants(),
            placement_surface: input.placement_surface,
            coordinates: input.coordinates,
            is_reversed: input.is_reversed,
            interaction,
            original_object_id: Some(original.id),
            provenance: None,
            is_user_made: original.is_user_made,
            created_at: now,
            updated_at: now,
        };

        let txn = self.db.begin().await?;
        self.modified.insert(&txn, &object).await?;
        self.users
            .append_modified(&txn, owner_id, &[object.id])
            .await?;
        txn.commit().await?;

        info!(object_id = %object.id, "modified object created");
        Ok(object)
    }

    /// # Errors
    /// `Validation` for an empty or illegal patch, `NotFound` for an unknown
    /// id, `Forbidden` when the caller does not own the object.
    #[instrument(skip(self, patch, caller_id), fields(object_id = %id, caller_id = %caller_id))]
    pub async fn update(
        &self,
        id: Uuid,
        caller_id: Uuid,
        patch: ModifiedObjectPatch,
    ) -> Result<ModifiedObject, DomainError> {
        if patch.is_empty() {
            return Err(DomainError::validation(
                "body",
                "Request body cannot be empty",
            ));
        }
        if patch.image_variants_supplied {
            return Err(DomainError::validation(
                "imageVariants",
                "imageVariants cannot be updated. Please create a new modified object instead.",
            ));
        }

        let mut object = self
            .modified
            .find(&self.db, id)
            .await?
            .ok_or_else(|| DomainError::not_found(ENTITY, id))?;
        self.ensure_owner(caller_id, id).await?;

        if let Some(name) = patch.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(DomainError::validation("name", "cannot be empty"));
            }
            name.clone_into(&mut object.name);
        }
        if let Some(description) = patch.description {
            object.description = description;
        }
        if let Some(coordinates) = patch.coordinates {
            object.coordinates = coordinates;
        }
        if let Some(is_reversed) = patch.is_reversed {
            object.is_reversed = is_reversed;
        }
        if let Some(surface) = patch.placement_surface {
            object.placement_surface = surface;
        }
        if patch.item_function.is_some() || patch.additional_data.is_some() {
            let kind = patch
                .item_function
                .unwrap_or_else(|| object.interaction.kind());
            let payload = patch
                .additional_data
                .unwrap_or_else(|| object.interaction.payload());
            object.interaction = Interaction::from_parts(kind, Some(&payload))?;
        }
        if let Some(index) = patch.current_image_variant_index {
            object.current_image_variant = object
                .image_variants
                .get(index)
                .cloned()
                .ok_or_else(|| {
                    DomainError::validation(
                        "currentImageVariantIndex",
                        format!(
                            "must be below {}, the number of image variants",
                            object.image_variants.len()
                        ),
                    )
                })?;
        }
        object.updated_at = OffsetDateTime::now_utc();

        self.modified.update(&self.db, &object).await?;
        debug!("modified object updated");
        Ok(object)
    }

    /// # Errors
    /// `NotFound` when the object does not exist at all, `Forbidden` when it
    /// exists but belongs to someone else.
    #[instrument(skip(self, caller_id), fields(object_id = %id, caller_id = %caller_id))]
    pub async fn delete(&self, id: Uuid, caller_id: Uuid) -> Result<(), DomainError> {
        let txn = self.db.begin().await?;

        if self.modified.find(&txn, id).await?.is_none() {
            return Err(DomainError::not_found(ENTITY, id));
        }
        let removed = self.users.remove_modified(&txn, caller_id, &[id]).await?;
        if removed == 0 {
            return Err(DomainError::forbidden(
                "You do not have permission to modify this object",
            ));
        }
        self.modified.delete(&txn, id).await?;
        txn.commit().await?;

        info!("modified object deleted");
        Ok(())
    }

    /// Objects in the owner's list, newest first.
    ///
    /// # Errors
    /// `NotFound` when the owner does not exist.
    #[instrument(skip(self, owner_id), fields(owner_id = %owner_id))]
    pub async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<ModifiedObject>, DomainError> {
        let profile = self
            .users
            .find_profile(&self.db, owner_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", owner_id))?;

        if profile.modified_object_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.modified
            .list_by_ids(&self.db, &profile.modified_object_ids)
            .await
    }

    async fn ensure_owner(&self, caller_id: Uuid, id: Uuid) -> Result<(), DomainError> {
        let owns = self
            .users
            .find_profile(&self.db, caller_id)
            .await?
            .is_some_and(|profile| profile.owns_modified(id));
        if owns {
            Ok(())
        } else {
            Err(DomainError::forbidden(
                "You do not have permission to modify this object",
            ))
        }
    }
}
