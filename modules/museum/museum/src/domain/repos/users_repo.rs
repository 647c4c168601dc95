use async_trait::async_trait;
use museum_sdk::{AiThemeAnalysis, OnboardingResponse, ThemeRuntimeState, UserProfile};
use sea_orm::ConnectionTrait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::error::DomainError;

/// Login material; never leaves the domain layer.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

/// Persistence of user profiles and their two owned-reference lists.
///
/// List mutations are single-row inserts/deletes, so concurrent appends for
/// the same user never lose an id. Update methods fail with `NotFound` when
/// the user row is missing.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    /// Profile with both lists in insertion order.
    async fn find_profile<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<Option<UserProfile>, DomainError>;

    async fn find_credentials_by_email<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        email: &str,
    ) -> Result<Option<UserCredentials>, DomainError>;

    async fn email_exists<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        email: &str,
    ) -> Result<bool, DomainError>;

    async fn create<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        user: NewUser,
    ) -> Result<(), DomainError>;

    /// Appends placed-object ids with a single batched insert.
    async fn append_modified<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        user_id: Uuid,
        ids: &[Uuid],
    ) -> Result<(), DomainError>;

    /// Removes placed-object ids; returns how many were removed.
    async fn remove_modified<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        user_id: Uuid,
        ids: &[Uuid],
    ) -> Result<u64, DomainError>;

    async fn add_to_inventory<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        user_id: Uuid,
        object_id: Uuid,
    ) -> Result<(), DomainError>;

    /// Atomic `question_index = question_index + 1`; returns the new value.
    async fn increment_question_index<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        user_id: Uuid,
    ) -> Result<u32, DomainError>;

    async fn set_theme<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        user_id: Uuid,
        theme_id: u8,
        state: &ThemeRuntimeState,
    ) -> Result<(), DomainError>;

    async fn set_theme_state<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        user_id: Uuid,
        state: &ThemeRuntimeState,
    ) -> Result<(), DomainError>;

    async fn set_invitation<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        user_id: Uuid,
        invitation: Option<String>,
    ) -> Result<(), DomainError>;

    async fn set_onboarding_responses<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        user_id: Uuid,
        responses: &[OnboardingResponse],
    ) -> Result<(), DomainError>;

    async fn set_ai_analysis<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        user_id: Uuid,
        analysis: &AiThemeAnalysis,
    ) -> Result<(), DomainError>;
}
