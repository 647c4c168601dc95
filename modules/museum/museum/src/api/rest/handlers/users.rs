use std::sync::Arc;

use axum::Json;
use axum::extract::Extension;
use museum_auth::axum_ext::Authz;

use crate::api::rest::dto::{
    InvitationRequest, InvitationResponse, ThemeChangeResponse, ThemeMusicRequest,
    ThemeMusicResponse,
};
use crate::api::rest::error::{ApiJson, ApiPath, ApiResult};
use crate::api::rest::routes::ConcreteServices;
use crate::domain::service::parse_theme_id;

pub async fn change_theme(
    Authz(caller): Authz,
    Extension(svc): Extension<Arc<ConcreteServices>>,
    ApiPath(raw_theme_id): ApiPath<String>,
) -> ApiResult<Json<ThemeChangeResponse>> {
    let theme_id = parse_theme_id(&raw_theme_id)?;
    let change = svc.themes.change_theme(caller.id, theme_id).await?;
    Ok(Json(change.into()))
}

pub async fn change_theme_music(
    Authz(caller): Authz,
    Extension(svc): Extension<Arc<ConcreteServices>>,
    ApiJson(req): ApiJson<ThemeMusicRequest>,
) -> ApiResult<Json<ThemeMusicResponse>> {
    let theme_id = parse_theme_id(&req.theme_id.as_text())?;
    let theme = svc.themes.change_theme_music(caller.id, theme_id).await?;
    Ok(Json(ThemeMusicResponse {
        message: "Background music updated",
        theme,
    }))
}

pub async fn update_invitation(
    Authz(caller): Authz,
    Extension(svc): Extension<Arc<ConcreteServices>>,
    ApiJson(req): ApiJson<InvitationRequest>,
) -> ApiResult<Json<InvitationResponse>> {
    let invitation = svc
        .themes
        .update_invitation(caller.id, req.invitation)
        .await?;
    Ok(Json(InvitationResponse {
        message: "Invitation updated",
        invitation,
    }))
}
