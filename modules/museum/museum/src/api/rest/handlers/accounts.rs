use std::sync::Arc;

use axum::Json;
use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use museum_auth::axum_ext::Authz;

use crate::api::rest::dto::{
    AuthResponse, CredentialsRequest, ProfileDto, VerifiedUser, VerifyResponse,
};
use crate::api::rest::error::{ApiJson, ApiResult};
use crate::api::rest::routes::ConcreteServices;

pub async fn signup(
    Extension(svc): Extension<Arc<ConcreteServices>>,
    ApiJson(req): ApiJson<CredentialsRequest>,
) -> ApiResult<impl IntoResponse> {
    let session = svc.accounts.signup(&req.email, &req.password).await?;
    Ok((StatusCode::CREATED, Json(AuthResponse::from(session))))
}

pub async fn login(
    Extension(svc): Extension<Arc<ConcreteServices>>,
    ApiJson(req): ApiJson<CredentialsRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let session = svc.accounts.login(&req.email, &req.password).await?;
    Ok(Json(session.into()))
}

pub async fn profile(
    Authz(caller): Authz,
    Extension(svc): Extension<Arc<ConcreteServices>>,
) -> ApiResult<Json<ProfileDto>> {
    let profile = svc.accounts.profile(caller.id).await?;
    Ok(Json(profile.into()))
}

/// The bearer middleware already validated the token.
pub async fn verify(Authz(caller): Authz) -> Json<VerifyResponse> {
    Json(VerifyResponse {
        valid: true,
        user: VerifiedUser {
            id: caller.id,
            email: caller.email,
        },
    })
}
