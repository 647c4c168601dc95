//! HS256 session tokens.

use std::fmt;
use std::time::Duration;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use time::OffsetDateTime;

use crate::claims::{Caller, Claims};
use crate::errors::AuthError;

/// Shortest signing secret accepted outside of mock setups.
pub const MIN_SECRET_LEN: usize = 32;

/// Issues and validates bearer tokens with a shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    #[must_use]
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            validation,
            ttl,
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Signs a token for `caller` that expires after the configured TTL.
    ///
    /// # Errors
    /// Returns [`AuthError::Internal`] if signing fails.
    pub fn issue(&self, caller: &Caller) -> Result<String, AuthError> {
        let iat = OffsetDateTime::now_utc().unix_timestamp();
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            sub: caller.id,
            email: caller.email.clone(),
            name: caller.name.clone(),
            iat,
            exp: iat.saturating_add(ttl),
        };
        self.sign(&claims)
    }

    /// Signs arbitrary claims. Used by [`Self::issue`] and by tests that need
    /// tokens with a chosen expiry.
    ///
    /// # Errors
    /// Returns [`AuthError::Internal`] if signing fails.
    pub fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AuthError::Internal(format!("failed to sign token: {e}")))
    }

    /// Verifies signature and expiry and returns the claims.
    ///
    /// # Errors
    /// [`AuthError::TokenExpired`] for expired tokens, [`AuthError::InvalidToken`]
    /// for anything else that fails verification.
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            })
    }
}
