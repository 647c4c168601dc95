//! Axum handlers, grouped by resource.

pub mod accounts;
pub mod modified;
pub mod objects;
pub mod onboarding;
pub mod presets;
pub mod users;

use axum::Json;

use super::dto::HealthResponse;

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
