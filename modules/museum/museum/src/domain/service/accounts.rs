use std::sync::Arc;

use museum_auth::{Caller, TokenService};
use museum_sdk::UserProfile;
use sea_orm::DatabaseConnection;
use time::OffsetDateTime;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::ServiceConfig;
use crate::domain::error::DomainError;
use crate::domain::repos::{NewUser, UsersRepository};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Token handed out by signup and login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub id: Uuid,
    pub email: String,
    pub token: String,
}

pub struct AccountsService<UR> {
    db: DatabaseConnection,
    users: Arc<UR>,
    tokens: Arc<TokenService>,
    config: ServiceConfig,
}

impl<UR: UsersRepository> AccountsService<UR> {
    pub fn new(
        db: DatabaseConnection,
        users: Arc<UR>,
        tokens: Arc<TokenService>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            db,
            users,
            tokens,
            config,
        }
    }

    /// # Errors
    /// `Validation` for a malformed email or short password, `Conflict` when
    /// the email is taken.
    #[instrument(skip(self, email, password))]
    pub async fn signup(&self, email: &str, password: &str) -> Result<AuthSession, DomainError> {
        let email = normalize_email(email)?;
        if password.chars().count() < self.config.min_password_len {
            return Err(DomainError::validation(
                "password",
                format!(
                    "must be at least {} characters",
                    self.config.min_password_len
                ),
            ));
        }
        if self.users.email_exists(&self.db, &email).await? {
            return Err(DomainError::conflict("Email is already registered"));
        }

        let password = password.to_owned();
        let password_hash = tokio::task::spawn_blocking(move || {
            museum_auth::hash_password(&password)
        })
        .await
        .map_err(|e| DomainError::internal(format!("hashing task failed: {e}")))??;

        let user = NewUser {
            id: Uuid::new_v4(),
            email,
            name: None,
            password_hash,
            created_at: OffsetDateTime::now_utc(),
        };
        let caller = Caller {
            id: user.id,
            email: user.email.clone(),
            name: None,
        };
        self.users.create(&self.db, user).await?;

        info!(user_id = %caller.id, "account created");
        self.session(caller)
    }

    /// # Errors
    /// `Unauthorized` for an unknown email or a wrong password.
    #[instrument(skip(self, email, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, DomainError> {
        let email = email.trim().to_lowercase();
        let Some(credentials) = self
            .users
            .find_credentials_by_email(&self.db, &email)
            .await?
        else {
            debug!("login for unknown email");
            return Err(DomainError::unauthorized(INVALID_CREDENTIALS));
        };

        let password = password.to_owned();
        let stored = credentials.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || {
            museum_auth::verify_password(&password, &stored)
        })
        .await
        .map_err(|e| DomainError::internal(format!("verification task failed: {e}")))?;
        if !valid {
            debug!(user_id = %credentials.id, "password mismatch");
            return Err(DomainError::unauthorized(INVALID_CREDENTIALS));
        }

        self.session(Caller {
            id: credentials.id,
            email: credentials.email,
            name: credentials.name,
        })
    }

    /// # Errors
    /// `NotFound` when the account no longer exists.
    #[instrument(skip(self, user_id), fields(user_id = %user_id))]
    pub async fn profile(&self, user_id: Uuid) -> Result<UserProfile, DomainError> {
        self.users
            .find_profile(&self.db, user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", user_id))
    }

    fn session(&self, caller: Caller) -> Result<AuthSession, DomainError> {
        let token = self.tokens.issue(&caller)?;
        Ok(AuthSession {
            id: caller.id,
            email: caller.email,
            token,
        })
    }
}

/// Lowercases `raw` after a `local@domain.tld` shape check.
fn normalize_email(raw: &str) -> Result<String, DomainError> {
    let email = raw.trim().to_lowercase();
    let valid = email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty()
            && !domain.contains('@')
            && domain
                .rsplit_once('.')
                .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
    }) && !email.chars().any(char::is_whitespace);

    if valid {
        Ok(email)
    } else {
        Err(DomainError::validation("email", "must be a valid email address"))
    }
}
