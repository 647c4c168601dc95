//! Domain services, one per resource.
//!
//! Services own the transactional boundary: multi-write flows open a
//! transaction on the shared `DatabaseConnection` and hand it to the
//! repositories. Outbound collaborators arrive as trait objects chosen once at
//! startup.

use std::sync::Arc;

use museum_auth::TokenService;
use sea_orm::DatabaseConnection;

use crate::domain::ports::{ImageFetcher, ImageGenerator, ObjectStorage, TextGenerator};
use crate::domain::repos::{CatalogRepository, ModifiedRepository, UsersRepository};
use crate::domain::themes::ThemeCatalog;

mod accounts;
mod modified;
mod objects;
mod onboarding;
mod presets;
mod provisioning;
mod themes;

pub use accounts::{AccountsService, AuthSession};
pub use modified::ModifiedService;
pub use objects::{InventoryUpdate, ObjectsService};
pub use onboarding::{AnalysisOutcome, OnboardingService};
pub use presets::{NewPreset, PresetPatch, PresetVariantInput, PresetVariantUpload, PresetsService};
pub use provisioning::{ProvisionOutcome, ProvisioningService};
pub use themes::{ThemeChange, ThemesService, parse_theme_id};

/// Tunables of the domain services.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub min_password_len: usize,
    pub max_invitation_len: usize,
    pub follow_up_temperature: f32,
    pub analysis_temperature: f32,
    pub analysis_max_tokens: u32,
    pub image_size: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            min_password_len: 6,
            max_invitation_len: 500,
            follow_up_temperature: 0.7,
            analysis_temperature: 0.7,
            analysis_max_tokens: 500,
            image_size: "1024x1024".to_owned(),
        }
    }
}

/// Outbound collaborators shared by the services.
#[derive(Clone)]
pub struct Collaborators {
    pub text: Arc<dyn TextGenerator>,
    pub images: Arc<dyn ImageGenerator>,
    pub fetcher: Arc<dyn ImageFetcher>,
    pub storage: Arc<dyn ObjectStorage>,
}

// DI container - aggregates all domain services
pub struct AppServices<CR, MR, UR>
where
    CR: CatalogRepository + 'static,
    MR: ModifiedRepository + 'static,
    UR: UsersRepository + 'static,
{
    pub accounts: AccountsService<UR>,
    pub themes: ThemesService<CR, MR, UR>,
    pub onboarding: OnboardingService<UR>,
    pub objects: ObjectsService<CR, UR>,
    pub presets: PresetsService<CR>,
    pub modified: ModifiedService<CR, MR, UR>,
    pub provisioning: Arc<ProvisioningService<CR, MR, UR>>,
}

impl<CR, MR, UR> AppServices<CR, MR, UR>
where
    CR: CatalogRepository + 'static,
    MR: ModifiedRepository + 'static,
    UR: UsersRepository + 'static,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        db: DatabaseConnection,
        catalog_repo: CR,
        modified_repo: MR,
        users_repo: UR,
        collaborators: Collaborators,
        tokens: Arc<TokenService>,
        catalog: Arc<ThemeCatalog>,
        config: ServiceConfig,
    ) -> Self {
        let catalog_repo = Arc::new(catalog_repo);
        let modified_repo = Arc::new(modified_repo);
        let users_repo = Arc::new(users_repo);

        let provisioning = Arc::new(ProvisioningService::new(
            Arc::clone(&catalog_repo),
            Arc::clone(&modified_repo),
            Arc::clone(&users_repo),
            Arc::clone(&catalog),
        ));

        Self {
            accounts: AccountsService::new(
                db.clone(),
                Arc::clone(&users_repo),
                tokens,
                config.clone(),
            ),
            themes: ThemesService::new(
                db.clone(),
                Arc::clone(&modified_repo),
                Arc::clone(&users_repo),
                Arc::clone(&catalog),
                Arc::clone(&provisioning),
                config.clone(),
            ),
            onboarding: OnboardingService::new(
                db.clone(),
                Arc::clone(&users_repo),
                Arc::clone(&collaborators.text),
                catalog,
                config.clone(),
            ),
            objects: ObjectsService::new(
                db.clone(),
                Arc::clone(&catalog_repo),
                Arc::clone(&users_repo),
                collaborators.clone(),
                config,
            ),
            presets: PresetsService::new(
                db.clone(),
                Arc::clone(&catalog_repo),
                Arc::clone(&collaborators.storage),
            ),
            modified: ModifiedService::new(db, catalog_repo, modified_repo, users_repo),
            provisioning,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support;

#[cfg(test)]
mod tests_provisioning;

#[cfg(test)]
mod tests_lifecycle;
