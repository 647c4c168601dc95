use std::sync::Arc;

use museum_sdk::ThemeRuntimeState;
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::provisioning::{ProvisionOutcome, ProvisioningService};
use super::ServiceConfig;
use crate::domain::error::DomainError;
use crate::domain::repos::{CatalogRepository, ModifiedRepository, UsersRepository};
use crate::domain::themes::{MAX_THEME_ID, MIN_THEME_ID, ThemeCatalog, ThemeDefinition};

/// Result of a theme switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeChange {
    pub theme_id: u8,
    pub name: String,
    pub runtime: ThemeRuntimeState,
    pub default_objects_added: usize,
}

fn invalid_theme() -> DomainError {
    DomainError::validation(
        "themeId",
        format!("Invalid theme ID. Must be between {MIN_THEME_ID} and {MAX_THEME_ID}."),
    )
}

/// Parses a theme id as sent in paths and bodies.
///
/// # Errors
/// `Validation` when `raw` is not a number in the theme range.
pub fn parse_theme_id(raw: &str) -> Result<u8, DomainError> {
    raw.trim()
        .parse::<u8>()
        .ok()
        .filter(|id| (MIN_THEME_ID..=MAX_THEME_ID).contains(id))
        .ok_or_else(invalid_theme)
}

pub struct ThemesService<CR, MR, UR> {
    db: DatabaseConnection,
    modified: Arc<MR>,
    users: Arc<UR>,
    catalog: Arc<ThemeCatalog>,
    provisioning: Arc<ProvisioningService<CR, MR, UR>>,
    config: ServiceConfig,
}

impl<CR, MR, UR> ThemesService<CR, MR, UR>
where
    CR: CatalogRepository,
    MR: ModifiedRepository,
    UR: UsersRepository,
{
    pub fn new(
        db: DatabaseConnection,
        modified: Arc<MR>,
        users: Arc<UR>,
        catalog: Arc<ThemeCatalog>,
        provisioning: Arc<ProvisioningService<CR, MR, UR>>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            db,
            modified,
            users,
            catalog,
            provisioning,
            config,
        }
    }

    /// Assigns `theme_id`, replaces the objects provisioned by the previous
    /// theme and provisions the new theme's defaults, all in one transaction.
    /// Objects the user placed themselves are kept.
    ///
    /// # Errors
    /// `Validation` for an unknown theme, `NotFound` for an unknown user.
    #[instrument(skip(self, user_id), fields(user_id = %user_id))]
    pub async fn change_theme(
        &self,
        user_id: Uuid,
        theme_id: u8,
    ) -> Result<ThemeChange, DomainError> {
        let theme = self.theme(theme_id)?;

        let txn = self.db.begin().await?;
        let profile = self
            .users
            .find_profile(&txn, user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", user_id))?;

        let provisioned: Vec<Uuid> = self
            .modified
            .list_by_ids(&txn, &profile.modified_object_ids)
            .await?
            .into_iter()
            .filter(|o| o.provenance.is_some())
            .map(|o| o.id)
            .collect();
        if !provisioned.is_empty() {
            self.users.remove_modified(&txn, user_id, &provisioned).await?;
            self.modified.delete_many(&txn, &provisioned).await?;
            info!(count = provisioned.len(), "previous theme objects removed");
        }

        self.users
            .set_theme(&txn, user_id, theme_id, &theme.runtime)
            .await?;

        let outcome = self
            .provisioning
            .provision_default_objects(&txn, theme_id, user_id)
            .await?;
        if let ProvisionOutcome::NothingCreated { reason } = &outcome {
            warn!(reason = %reason, "no default objects provisioned");
        }
        txn.commit().await?;

        info!(theme_id, added = outcome.created_count(), "theme changed");
        Ok(ThemeChange {
            theme_id,
            name: theme.name.clone(),
            runtime: theme.runtime.clone(),
            default_objects_added: outcome.created_count(),
        })
    }

    /// Swaps only the background music for the track of `theme_id`.
    ///
    /// # Errors
    /// `Validation` for an unknown theme, `NotFound` for an unknown user.
    #[instrument(skip(self, user_id), fields(user_id = %user_id))]
    pub async fn change_theme_music(
        &self,
        user_id: Uuid,
        theme_id: u8,
    ) -> Result<ThemeRuntimeState, DomainError> {
        let source = self.theme(theme_id)?;
        let profile = self
            .users
            .find_profile(&self.db, user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", user_id))?;

        let mut state = match profile.theme_state {
            Some(state) => state,
            None => profile
                .theme_id
                .and_then(|id| self.catalog.get(id))
                .unwrap_or(source)
                .runtime
                .clone(),
        };
        state.background_music = source.runtime.background_music.clone();
        self.users.set_theme_state(&self.db, user_id, &state).await?;

        info!(theme_id, "theme music changed");
        Ok(state)
    }

    /// Blank text clears the invitation.
    ///
    /// # Errors
    /// `Validation` when the text is too long, `NotFound` for an unknown user.
    #[instrument(skip(self, user_id, text), fields(user_id = %user_id))]
    pub async fn update_invitation(
        &self,
        user_id: Uuid,
        text: Option<String>,
    ) -> Result<Option<String>, DomainError> {
        let invitation = text.filter(|t| !t.trim().is_empty());
        if let Some(text) = &invitation
            && text.chars().count() > self.config.max_invitation_len
        {
            return Err(DomainError::validation(
                "invitation",
                format!(
                    "must be at most {} characters",
                    self.config.max_invitation_len
                ),
            ));
        }
        self.users
            .set_invitation(&self.db, user_id, invitation.clone())
            .await?;
        Ok(invitation)
    }

    fn theme(&self, theme_id: u8) -> Result<&ThemeDefinition, DomainError> {
        self.catalog.get(theme_id).ok_or_else(invalid_theme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_id_parsing() {
        assert_eq!(parse_theme_id("3").unwrap(), 3);
        assert_eq!(parse_theme_id(" 5 ").unwrap(), 5);
        for bad in ["0", "6", "-1", "abc", "", "300"] {
            let err = parse_theme_id(bad).unwrap_err();
            assert!(err.to_string().contains("Must be between 1 and 5"), "{bad}");
        }
    }
}
