use std::sync::Arc;

use museum_sdk::{CatalogObject, ImageVariant, PlacementSurface};
use sea_orm::DatabaseConnection;
use time::OffsetDateTime;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::image_payload::extension_for_mime;
use crate::domain::ports::{ImageBytes, ObjectStorage};
use crate::domain::repos::CatalogRepository;

const USER_MADE_FORBIDDEN: &str = "User-made objects cannot be modified through preset administration";

/// One uploaded variant of a new preset.
#[derive(Debug, Clone)]
pub struct PresetVariantUpload {
    pub name: String,
    pub color: String,
    pub file: ImageBytes,
}

#[derive(Debug, Clone)]
pub struct NewPreset {
    pub name: String,
    pub description: Option<String>,
    pub placement_surface: PlacementSurface,
    pub variants: Vec<PresetVariantUpload>,
}

/// Variant of a replacement list; images are referenced by URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetVariantInput {
    pub variant_id: Option<Uuid>,
    pub name: String,
    pub color: String,
    pub image_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresetPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub placement_surface: Option<PlacementSurface>,
    pub image_variants: Option<Vec<PresetVariantInput>>,
    pub current_image_variant_id: Option<Uuid>,
}

impl PresetPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.placement_surface.is_none()
            && self.image_variants.is_none()
            && self.current_image_variant_id.is_none()
    }
}

/// Administration of preset catalog objects.
pub struct PresetsService<CR> {
    db: DatabaseConnection,
    catalog: Arc<CR>,
    storage: Arc<dyn ObjectStorage>,
}

impl<CR: CatalogRepository> PresetsService<CR> {
    pub fn new(db: DatabaseConnection, catalog: Arc<CR>, storage: Arc<dyn ObjectStorage>) -> Self {
        Self {
            db,
            catalog,
            storage,
        }
    }

    /// Uploads every variant image and stores the preset. The first variant
    /// becomes current.
    ///
    /// # Errors
    /// `Validation` for a missing name or variants, `Storage` when an upload
    /// fails.
    #[instrument(skip(self, input), fields(variants = input.variants.len()))]
    pub async fn create(&self, input: NewPreset) -> Result<CatalogObject, DomainError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name", "is required"));
        }
        if input.variants.is_empty() {
            return Err(DomainError::validation(
                "imageVariants",
                "at least one variant with name, color and file is required",
            ));
        }

        let batch = Uuid::new_v4();
        let mut variants = Vec::with_capacity(input.variants.len());
        for (index, upload) in input.variants.into_iter().enumerate() {
            let path = format!(
                "presets/{batch}-{index}-{}.{}",
                sanitize_segment(&upload.name),
                extension_for_mime(&upload.file.mime_type)
            );
            let image_url = self
                .storage
                .upload_from_buffer(upload.file.bytes, &path, &upload.file.mime_type)
                .await?;
            debug!(index, %path, "preset variant uploaded");
            variants.push(ImageVariant {
                variant_id: Some(Uuid::new_v4()),
                name: upload.name,
                color: upload.color,
                image_url,
            });
        }

        let now = OffsetDateTime::now_utc();
        let object = CatalogObject {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            description: input
                .description
                .map(|d| d.trim().to_owned())
                .filter(|d| !d.is_empty()),
            current_image_variant: variants[0].clone(),
            image_variants: variants,
            is_user_made: false,
            placement_surface: input.placement_surface,
            created_at: now,
            updated_at: now,
        };
        self.catalog.insert(&self.db, &object).await?;

        info!(object_id = %object.id, "preset created");
        Ok(object)
    }

    /// # Errors
    /// `NotFound` for an unknown id, `Forbidden` for user-made objects,
    /// `Validation` for an empty patch or invalid variants.
    #[instrument(skip(self, patch), fields(object_id = %id))]
    pub async fn update(&self, id: Uuid, patch: PresetPatch) -> Result<CatalogObject, DomainError> {
        if patch.is_empty() {
            return Err(DomainError::validation(
                "body",
                "Request body cannot be empty",
            ));
        }
        let mut object = self.find_preset(id).await?;

        if let Some(name) = patch.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(DomainError::validation("name", "cannot be empty"));
            }
            name.clone_into(&mut object.name);
        }
        if let Some(description) = patch.description {
            object.description = Some(description);
        }
        if let Some(surface) = patch.placement_surface {
            object.placement_surface = surface;
        }
        if let Some(inputs) = patch.image_variants {
            object.image_variants = replacement_variants(inputs)?;
            object.current_image_variant = object.image_variants[0].clone();
        }
        if let Some(variant_id) = patch.current_image_variant_id {
            object.current_image_variant = object
                .find_variant(variant_id)
                .cloned()
                .ok_or_else(|| {
                    DomainError::validation(
                        "currentImageVariantId",
                        "does not reference a variant of this object",
                    )
                })?;
        }
        object.updated_at = OffsetDateTime::now_utc();

        self.catalog.update(&self.db, &object).await?;
        info!("preset updated");
        Ok(object)
    }

    /// Returns the id of the deleted preset.
    ///
    /// # Errors
    /// `NotFound` for an unknown id, `Forbidden` for user-made objects.
    #[instrument(skip(self), fields(object_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<Uuid, DomainError> {
        self.find_preset(id).await?;
        if !self.catalog.delete(&self.db, id).await? {
            return Err(DomainError::not_found("Object", id));
        }
        info!("preset deleted");
        Ok(id)
    }

    async fn find_preset(&self, id: Uuid) -> Result<CatalogObject, DomainError> {
        let object = self
            .catalog
            .find(&self.db, id)
            .await?
            .ok_or_else(|| DomainError::not_found("Object", id))?;
        if object.is_user_made {
            return Err(DomainError::forbidden(USER_MADE_FORBIDDEN));
        }
        Ok(object)
    }
}

/// Validates a full replacement list. Supplied variant ids are kept, missing
/// ones are assigned.
fn replacement_variants(inputs: Vec<PresetVariantInput>) -> Result<Vec<ImageVariant>, DomainError> {
    if inputs.is_empty() {
        return Err(DomainError::validation(
            "imageVariants",
            "must contain at least one variant",
        ));
    }
    inputs
        .into_iter()
        .enumerate()
        .map(|(i, input)| {
            for (field, value) in [
                ("name", &input.name),
                ("color", &input.color),
                ("imageUrl", &input.image_url),
            ] {
                if value.trim().is_empty() {
                    return Err(DomainError::validation(
                        format!("imageVariants[{i}].{field}"),
                        "must be a non-empty string",
                    ));
                }
            }
            Ok(ImageVariant {
                variant_id: Some(input.variant_id.unwrap_or_else(Uuid::new_v4)),
                name: input.name,
                color: input.color,
                image_url: input.image_url,
            })
        })
        .collect()
}

/// Keeps storage keys to `[A-Za-z0-9_-]`.
fn sanitize_segment(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "variant".to_owned()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, url: &str) -> PresetVariantInput {
        PresetVariantInput {
            variant_id: None,
            name: name.to_owned(),
            color: "#000000".to_owned(),
            image_url: url.to_owned(),
        }
    }

    #[test]
    fn sanitizes_storage_segments() {
        assert_eq!(sanitize_segment("Deep Blue/../x"), "Deep_Blue____x");
        assert_eq!(sanitize_segment("   "), "variant");
    }

    #[test]
    fn replacement_assigns_missing_ids_and_names_bad_field() {
        let kept = Uuid::new_v4();
        let mut first = input("Red", "https://cdn/red.png");
        first.variant_id = Some(kept);
        let variants =
            replacement_variants(vec![first, input("Blue", "https://cdn/blue.png")]).unwrap();
        assert_eq!(variants[0].variant_id, Some(kept));
        assert!(variants[1].variant_id.is_some());

        let err = replacement_variants(vec![input("Red", "https://cdn/red.png"), input("Blue", " ")])
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "imageVariants[1].imageUrl"));
        assert!(replacement_variants(Vec::new()).is_err());
    }
}
