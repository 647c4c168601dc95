use std::sync::Arc;

use museum_sdk::{CatalogObject, ImageVariant, PlacementSurface};
use sea_orm::{DatabaseConnection, TransactionTrait};
use time::OffsetDateTime;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use super::{Collaborators, ServiceConfig};
use crate::domain::error::DomainError;
use crate::domain::image_payload::{decode_inline, extension_for_mime};
use crate::domain::ports::{GeneratedImage, ImageBytes, ImageOptions, TextOptions};
use crate::domain::prompts;
use crate::domain::repos::{CatalogRepository, UsersRepository};
use crate::domain::response_parser::{extract_json_object, string_field};

const DEFAULT_COLOR: &str = "#ffffff";
const DEFAULT_VARIANT_NAME: &str = "Default";

/// Inventory after a successful add.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryUpdate {
    pub object_ids: Vec<Uuid>,
    pub question_index: u32,
}

/// Fields pulled out of the metadata reply.
#[derive(Debug, Clone, PartialEq)]
struct ObjectMetadata {
    name: String,
    description: String,
    color: String,
    surface: PlacementSurface,
    visual_prompt: String,
}

pub struct ObjectsService<CR, UR> {
    db: DatabaseConnection,
    catalog: Arc<CR>,
    users: Arc<UR>,
    collaborators: Collaborators,
    config: ServiceConfig,
}

impl<CR, UR> ObjectsService<CR, UR>
where
    CR: CatalogRepository,
    UR: UsersRepository,
{
    pub fn new(
        db: DatabaseConnection,
        catalog: Arc<CR>,
        users: Arc<UR>,
        collaborators: Collaborators,
        config: ServiceConfig,
    ) -> Self {
        Self {
            db,
            catalog,
            users,
            collaborators,
            config,
        }
    }

    /// # Errors
    /// `Validation` for empty content, `Generation` when the text
    /// collaborator fails.
    #[instrument(skip(self, content))]
    pub async fn generate_follow_up_question(&self, content: &str) -> Result<String, DomainError> {
        if content.trim().is_empty() {
            return Err(DomainError::validation("content", "is required"));
        }
        let options = TextOptions {
            temperature: Some(self.config.follow_up_temperature),
            system_prompt: None,
            json_mode: false,
            max_tokens: None,
        };
        let question = self
            .collaborators
            .text
            .generate_text(&prompts::follow_up_question(content), &options)
            .await?;
        Ok(question.trim().to_owned())
    }

    /// Generates metadata and an image for `content` and stores a new
    /// user-made catalog object. The object is not added to the inventory.
    ///
    /// # Errors
    /// `Validation` for empty content, `Generation` when metadata or image
    /// synthesis fails, `Storage` when the upload fails.
    #[instrument(skip(self, content, user_id), fields(user_id = %user_id))]
    pub async fn create_from_text(
        &self,
        content: &str,
        user_id: Uuid,
    ) -> Result<CatalogObject, DomainError> {
        if content.trim().is_empty() {
            return Err(DomainError::validation("content", "is required"));
        }

        let metadata = self.generate_metadata(content).await?;
        debug!(name = %metadata.name, surface = %metadata.surface, "object metadata generated");

        let image = self.render_image(&metadata.visual_prompt).await?;
        let path = format!(
            "objects/{user_id}/{}.{}",
            Uuid::new_v4(),
            extension_for_mime(&image.mime_type)
        );
        let image_url = self
            .collaborators
            .storage
            .upload_from_buffer(image.bytes, &path, &image.mime_type)
            .await?;

        let variant = ImageVariant {
            variant_id: Some(Uuid::new_v4()),
            name: DEFAULT_VARIANT_NAME.to_owned(),
            color: metadata.color,
            image_url,
        };
        let now = OffsetDateTime::now_utc();
        let object = CatalogObject {
            id: Uuid::new_v4(),
            name: metadata.name,
            description: Some(metadata.description),
            current_image_variant: variant.clone(),
            image_variants: vec![variant],
            is_user_made: true,
            placement_surface: metadata.surface,
            created_at: now,
            updated_at: now,
        };
        self.catalog.insert(&self.db, &object).await?;

        info!(object_id = %object.id, "user-made object created");
        Ok(object)
    }

    /// # Errors
    /// `NotFound` for an unknown object or user, `Validation` for presets,
    /// `Conflict` when the object is already in the inventory.
    #[instrument(skip(self, object_id, user_id), fields(object_id = %object_id, user_id = %user_id))]
    pub async fn add_to_inventory(
        &self,
        object_id: Uuid,
        user_id: Uuid,
    ) -> Result<InventoryUpdate, DomainError> {
        let object = self
            .catalog
            .find(&self.db, object_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Object", object_id))?;
        if !object.is_user_made {
            return Err(DomainError::validation(
                "objectId",
                "Only user-made objects can be added to the inventory",
            ));
        }

        let txn = self.db.begin().await?;
        let profile = self
            .users
            .find_profile(&txn, user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", user_id))?;
        if profile.has_in_inventory(object_id) {
            return Err(DomainError::conflict("Object is already in inventory"));
        }
        self.users.add_to_inventory(&txn, user_id, object_id).await?;
        let question_index = self.users.increment_question_index(&txn, user_id).await?;
        txn.commit().await?;

        let mut object_ids = profile.object_ids;
        object_ids.push(object_id);
        info!(question_index, "object added to inventory");
        Ok(InventoryUpdate {
            object_ids,
            question_index,
        })
    }

    /// User-made objects in the caller's inventory, newest first.
    ///
    /// # Errors
    /// `NotFound` when the user does not exist.
    #[instrument(skip(self, user_id), fields(user_id = %user_id))]
    pub async fn list_user_objects(&self, user_id: Uuid) -> Result<Vec<CatalogObject>, DomainError> {
        let profile = self
            .users
            .find_profile(&self.db, user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", user_id))?;
        self.catalog
            .list_user_made(&self.db, &profile.object_ids)
            .await
    }

    /// # Errors
    /// Store failures.
    #[instrument(skip(self))]
    pub async fn list_presets(&self) -> Result<Vec<CatalogObject>, DomainError> {
        self.catalog.list_presets(&self.db).await
    }

    async fn generate_metadata(&self, content: &str) -> Result<ObjectMetadata, DomainError> {
        let options = TextOptions {
            temperature: None,
            system_prompt: None,
            json_mode: true,
            max_tokens: None,
        };
        let reply = self
            .collaborators
            .text
            .generate_text(&prompts::object_metadata(content), &options)
            .await
            .inspect_err(|e| error!(error = %e, "metadata generation failed"))?;

        parse_metadata(&reply).map_err(|reason| {
            error!(reason, reply = %reply, "unusable metadata reply");
            DomainError::generation(reason)
        })
    }

    async fn render_image(&self, visual_prompt: &str) -> Result<ImageBytes, DomainError> {
        let options = ImageOptions {
            size: self.config.image_size.clone(),
            count: 1,
        };
        let images = self
            .collaborators
            .images
            .generate_image(&prompts::image(visual_prompt), &options)
            .await
            .inspect_err(|e| error!(error = %e, "image generation failed"))?;

        match images.into_iter().next() {
            Some(GeneratedImage::Url(url)) => self.collaborators.fetcher.fetch(&url).await,
            Some(GeneratedImage::Inline(data)) => decode_inline(&data),
            None => {
                error!("image collaborator returned no images");
                Err(DomainError::generation("no image was generated"))
            }
        }
    }
}

fn parse_metadata(reply: &str) -> Result<ObjectMetadata, &'static str> {
    let map = extract_json_object(reply).ok_or("reply contains no JSON object")?;
    let name = string_field(&map, "name").ok_or("metadata is missing name")?;
    let description = string_field(&map, "description").ok_or("metadata is missing description")?;
    let surface = string_field(&map, "onType")
        .ok_or("metadata is missing onType")?
        .parse::<PlacementSurface>()
        .map_err(|_| "metadata onType is not Wall or Floor")?;
    let color = string_field(&map, "color").unwrap_or(DEFAULT_COLOR);
    let visual_prompt = string_field(&map, "visual_prompt")
        .map_or_else(|| format!("{name}: {description}"), str::to_owned);

    Ok(ObjectMetadata {
        name: name.to_owned(),
        description: description.to_owned(),
        color: color.to_owned(),
        surface,
        visual_prompt,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_defaults_color_and_visual_prompt() {
        let meta = parse_metadata(
            "Sure! {\"name\": \"Blue mug\", \"description\": \"Morning coffee\", \"onType\": \"LeftWall\"}",
        )
        .unwrap();
        assert_eq!(meta.color, "#ffffff");
        assert_eq!(meta.visual_prompt, "Blue mug: Morning coffee");
        assert_eq!(meta.surface, PlacementSurface::Wall);
    }

    #[test]
    fn metadata_requires_core_fields() {
        assert!(parse_metadata("no json here").is_err());
        assert!(parse_metadata("{\"name\": \"x\", \"onType\": \"Floor\"}").is_err());
        assert!(parse_metadata("{\"name\": \"x\", \"description\": \"y\", \"onType\": \"Roof\"}").is_err());
        assert!(parse_metadata("{\"name\": \"  \", \"description\": \"y\", \"onType\": \"Floor\"}").is_err());
    }
}
