use std::sync::Arc;

use axum::Json;
use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use museum_auth::axum_ext::Authz;
use uuid::Uuid;

use crate::api::rest::dto::{CreateModifiedRequest, ModifiedObjectDto, PatchModifiedRequest};
use crate::api::rest::error::{ApiJson, ApiPath, ApiResult};
use crate::api::rest::routes::ConcreteServices;

pub async fn create(
    Authz(caller): Authz,
    Extension(svc): Extension<Arc<ConcreteServices>>,
    ApiJson(req): ApiJson<CreateModifiedRequest>,
) -> ApiResult<impl IntoResponse> {
    let object = svc.modified.create(caller.id, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ModifiedObjectDto::from(object))))
}

pub async fn list(
    Authz(caller): Authz,
    Extension(svc): Extension<Arc<ConcreteServices>>,
) -> ApiResult<Json<Vec<ModifiedObjectDto>>> {
    let objects = svc.modified.list_for_owner(caller.id).await?;
    Ok(Json(objects.into_iter().map(Into::into).collect()))
}

pub async fn update(
    Authz(caller): Authz,
    Extension(svc): Extension<Arc<ConcreteServices>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<PatchModifiedRequest>,
) -> ApiResult<Json<ModifiedObjectDto>> {
    let object = svc.modified.update(id, caller.id, req.into()).await?;
    Ok(Json(object.into()))
}

pub async fn delete(
    Authz(caller): Authz,
    Extension(svc): Extension<Arc<ConcreteServices>>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    svc.modified.delete(id, caller.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
