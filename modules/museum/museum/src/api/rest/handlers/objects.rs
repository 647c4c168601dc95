use std::sync::Arc;

use axum::Json;
use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use museum_auth::axum_ext::Authz;

use crate::api::rest::dto::{
    AddToInventoryRequest, CatalogObjectDto, ContentRequest, FollowUpResponse, InventoryResponse,
};
use crate::api::rest::error::{ApiJson, ApiResult, domain_error_to_problem};
use crate::api::rest::routes::ConcreteServices;

pub async fn follow_up_question(
    Extension(svc): Extension<Arc<ConcreteServices>>,
    ApiJson(req): ApiJson<ContentRequest>,
) -> ApiResult<Json<FollowUpResponse>> {
    let question = svc
        .objects
        .generate_follow_up_question(&req.content)
        .await?;
    Ok(Json(FollowUpResponse { question }))
}

pub async fn create_from_text(
    Authz(caller): Authz,
    Extension(svc): Extension<Arc<ConcreteServices>>,
    ApiJson(req): ApiJson<ContentRequest>,
) -> ApiResult<impl IntoResponse> {
    let object = svc
        .objects
        .create_from_text(&req.content, caller.id)
        .await
        .map_err(|e| domain_error_to_problem(&e, "/object"))?;
    Ok((StatusCode::CREATED, Json(CatalogObjectDto::from(object))))
}

pub async fn list_user_objects(
    Authz(caller): Authz,
    Extension(svc): Extension<Arc<ConcreteServices>>,
) -> ApiResult<Json<Vec<CatalogObjectDto>>> {
    let objects = svc.objects.list_user_objects(caller.id).await?;
    Ok(Json(objects.into_iter().map(Into::into).collect()))
}

pub async fn add_to_inventory(
    Authz(caller): Authz,
    Extension(svc): Extension<Arc<ConcreteServices>>,
    ApiJson(req): ApiJson<AddToInventoryRequest>,
) -> ApiResult<Json<InventoryResponse>> {
    let update = svc
        .objects
        .add_to_inventory(req.object_id, caller.id)
        .await
        .map_err(|e| domain_error_to_problem(&e, "/object/add"))?;
    Ok(Json(update.into()))
}

pub async fn list_presets(
    Extension(svc): Extension<Arc<ConcreteServices>>,
) -> ApiResult<Json<Vec<CatalogObjectDto>>> {
    let presets = svc.objects.list_presets().await?;
    Ok(Json(presets.into_iter().map(Into::into).collect()))
}
