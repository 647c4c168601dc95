//! Axum extractors and middleware for auth

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, Method, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use secrecy::{ExposeSecret, SecretString};

use crate::{claims::Caller, errors::AuthError, jwt::TokenService};

/// Header carrying the administrative key for preset management.
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// Extractor for the authenticated caller - requires `require_bearer` to have run
#[derive(Debug, Clone)]
pub struct Authz(pub Caller);

impl<S> FromRequestParts<S> for Authz
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Caller>()
            .cloned()
            .map(Authz)
            .ok_or_else(|| {
                AuthError::Internal("Caller not found - auth middleware not configured".to_owned())
            })
    }
}

/// Bearer token middleware.
///
/// Skips CORS preflight requests, otherwise requires a valid
/// `Authorization: Bearer <jwt>` header and inserts the [`Caller`] into the
/// request extensions.
pub async fn require_bearer(
    State(tokens): State<Arc<TokenService>>,
    mut request: Request,
    next: Next,
) -> Response {
    if is_preflight_request(request.method(), request.headers()) {
        return next.run(request).await;
    }

    let Some(token) = extract_bearer_token(request.headers()) else {
        return AuthError::Unauthenticated.into_response();
    };

    let claims = match tokens.validate(token) {
        Ok(claims) => claims,
        Err(err) => return err.into_response(),
    };

    request.extensions_mut().insert(Caller::from(claims));
    next.run(request).await
}

/// Shared admin key; `None` disables the admin surface entirely.
#[derive(Clone, Default)]
pub struct AdminKey(Option<Arc<SecretString>>);

impl AdminKey {
    #[must_use]
    pub fn new(key: Option<SecretString>) -> Self {
        Self(key.filter(|k| !k.expose_secret().is_empty()).map(Arc::new))
    }

    fn matches(&self, presented: &str) -> bool {
        self.0
            .as_ref()
            .is_some_and(|k| k.expose_secret().as_bytes() == presented.as_bytes())
    }
}

/// Middleware guarding administrative routes with [`ADMIN_KEY_HEADER`].
pub async fn require_admin_key(
    State(key): State<AdminKey>,
    request: Request,
    next: Next,
) -> Response {
    let presented = request
        .headers()
        .get(ADMIN_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if !key.matches(presented) {
        tracing::warn!(path = %request.uri().path(), "admin request rejected");
        return AuthError::Forbidden.into_response();
    }
    next.run(request).await
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer ").or_else(|| s.strip_prefix("bearer ")))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn is_preflight_request(method: &Method, headers: &HeaderMap) -> bool {
    method == Method::OPTIONS
        && headers.contains_key(header::ORIGIN)
        && headers.contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
}
