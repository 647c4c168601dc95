use std::sync::Arc;

use museum_sdk::{ModifiedObject, Provenance};
use sea_orm::ConnectionTrait;
use time::OffsetDateTime;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::repos::{CatalogRepository, ModifiedRepository, UsersRepository};
use crate::domain::themes::{TemplateObject, ThemeCatalog};

/// Result of materializing a theme's templates. `NothingCreated` is a normal
/// outcome; callers decide whether it matters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    Created(Vec<Uuid>),
    NothingCreated { reason: String },
}

impl ProvisionOutcome {
    #[must_use]
    pub fn created_count(&self) -> usize {
        match self {
            Self::Created(ids) => ids.len(),
            Self::NothingCreated { .. } => 0,
        }
    }
}

pub struct ProvisioningService<CR, MR, UR> {
    catalog: Arc<CR>,
    modified: Arc<MR>,
    users: Arc<UR>,
    themes: Arc<ThemeCatalog>,
}

impl<CR, MR, UR> ProvisioningService<CR, MR, UR>
where
    CR: CatalogRepository,
    MR: ModifiedRepository,
    UR: UsersRepository,
{
    pub fn new(
        catalog: Arc<CR>,
        modified: Arc<MR>,
        users: Arc<UR>,
        themes: Arc<ThemeCatalog>,
    ) -> Self {
        Self {
            catalog,
            modified,
            users,
            themes,
        }
    }

    /// Creates one placed object per template of `theme_id` and appends them
    /// to the user's list. Runs on `conn`, so it joins the caller's transaction.
    ///
    /// Not idempotent: a second call creates a second set.
    ///
    /// # Errors
    /// Store failures only; unknown or unready themes and missing catalog
    /// objects are reported through [`ProvisionOutcome::NothingCreated`] or
    /// skipped with a warning.
    #[instrument(skip(self, conn, user_id), fields(user_id = %user_id))]
    pub async fn provision_default_objects<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        theme_id: u8,
        user_id: Uuid,
    ) -> Result<ProvisionOutcome, DomainError> {
        let Some(theme) = self.themes.get(theme_id) else {
            return Ok(ProvisionOutcome::NothingCreated {
                reason: "Invalid theme ID".to_owned(),
            });
        };

        if !theme.is_ready() {
            info!("theme still has placeholder objects; skipping provisioning");
            return Ok(ProvisionOutcome::NothingCreated {
                reason: format!(
                    "Theme configuration not finalized: theme {theme_id} still references placeholder objects"
                ),
            });
        }

        let now = OffsetDateTime::now_utc();
        let mut created = Vec::with_capacity(theme.templates.len());

        for (template_index, template) in theme.templates.iter().enumerate() {
            let TemplateObject::Object(original_id) = template.object else {
                continue;
            };

            let Some(original) = self.catalog.find(conn, original_id).await? else {
                warn!(
                    template_index,
                    original_object_id = %original_id,
                    "template object not found in catalog; skipping"
                );
                continue;
            };
            if original.image_variants.is_empty() {
                warn!(
                    template_index,
                    original_object_id = %original_id,
                    "template object has no image variants; skipping"
                );
                continue;
            }

            let object = ModifiedObject {
                id: Uuid::new_v4(),
                name: original.name.clone(),
                description: original.description.clone(),
                current_image_variant: original.current_image_variant.snapshot(),
                image_variants: original.snapshot_variants(),
                placement_surface: original.placement_surface,
                coordinates: template.coordinates,
                is_reversed: template.is_reversed,
                interaction: template.interaction.clone(),
                original_object_id: Some(original.id),
                provenance: Some(Provenance {
                    original_object_id: original.id,
                    user_id,
                    theme_id,
                    template_index,
                }),
                is_user_made: false,
                created_at: now,
                updated_at: now,
            };
            self.modified.insert(conn, &object).await?;
            debug!(template_index, object_id = %object.id, "default object created");
            created.push(object.id);
        }

        if created.is_empty() {
            warn!("no default objects could be created");
            return Ok(ProvisionOutcome::NothingCreated {
                reason: "Failed to create any default objects".to_owned(),
            });
        }

        self.users.append_modified(conn, user_id, &created).await?;
        info!(count = created.len(), "default objects provisioned");
        Ok(ProvisionOutcome::Created(created))
    }
}
