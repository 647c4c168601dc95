use std::sync::Arc;

use axum::Json;
use axum::extract::Extension;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use museum_auth::axum_ext::Authz;
use museum_sdk::{AiThemeAnalysis, OnboardingResponse};

use crate::api::rest::dto::{AnalysisResponse, AnalyzeRequest, QuestionsResponse, ResponsesSaved};
use crate::api::rest::error::{ApiJson, ApiResult};
use crate::api::rest::routes::ConcreteServices;
use crate::domain::onboarding::QUESTIONS;

pub async fn questions() -> Json<QuestionsResponse> {
    Json(QuestionsResponse {
        questions: QUESTIONS.to_vec(),
    })
}

pub async fn save_responses(
    Authz(caller): Authz,
    Extension(svc): Extension<Arc<ConcreteServices>>,
    ApiJson(responses): ApiJson<Vec<OnboardingResponse>>,
) -> ApiResult<impl IntoResponse> {
    let saved = svc.onboarding.save_responses(caller.id, responses).await?;
    Ok((
        StatusCode::CREATED,
        Json(ResponsesSaved {
            message: "Onboarding responses saved",
            count: saved.len(),
        }),
    ))
}

pub async fn analyze(
    Authz(caller): Authz,
    Extension(svc): Extension<Arc<ConcreteServices>>,
    ApiJson(req): ApiJson<AnalyzeRequest>,
) -> ApiResult<Json<AnalysisResponse>> {
    let outcome = svc.onboarding.analyze(caller.id, req.responses).await?;
    Ok(Json(outcome.into()))
}

pub async fn analyze_from_profile(
    Authz(caller): Authz,
    Extension(svc): Extension<Arc<ConcreteServices>>,
) -> ApiResult<Json<AnalysisResponse>> {
    let outcome = svc.onboarding.analyze_from_profile(caller.id).await?;
    Ok(Json(outcome.into()))
}

pub async fn get_analysis(
    Authz(caller): Authz,
    Extension(svc): Extension<Arc<ConcreteServices>>,
) -> ApiResult<Json<AiThemeAnalysis>> {
    Ok(Json(svc.onboarding.get_analysis(caller.id).await?))
}
