use thiserror::Error;

/// Message shown for every rejected bearer token, whatever the cause.
pub const ACCESS_DENIED: &str = "Access denied. Token is invalid or expired.";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication required: missing bearer token")]
    Unauthenticated,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Forbidden: admin key missing or invalid")]
    Forbidden,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(feature = "axum-ext")]
impl axum::response::IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;
        use axum::response::Json;
        use serde_json::json;

        let (status, message) = match self {
            AuthError::Unauthenticated | AuthError::InvalidToken(_) | AuthError::TokenExpired => {
                tracing::debug!(error = %self, "rejecting request");
                (StatusCode::UNAUTHORIZED, ACCESS_DENIED.to_owned())
            }
            AuthError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            AuthError::Hashing(_) | AuthError::Internal(_) => {
                tracing::error!(error = %self, "auth internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_owned(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
