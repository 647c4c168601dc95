use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::StatusCode;

use super::problem::{Problem, ValidationViolation};
use crate::domain::error::DomainError;

pub type ApiResult<T> = Result<T, Problem>;

/// JSON body extractor whose rejections are problems.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Problem))]
pub struct ApiJson<T>(pub T);

/// Path extractor whose rejections are problems.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Problem))]
pub struct ApiPath<T>(pub T);

fn trace_id() -> Option<String> {
    tracing::Span::current()
        .id()
        .map(|id| id.into_u64().to_string())
}

/// Map domain error to RFC 9457 Problem
pub fn domain_error_to_problem(e: &DomainError, instance: &str) -> Problem {
    let problem = match e {
        DomainError::Validation { field, message } => {
            Problem::new(StatusCode::BAD_REQUEST, "Bad Request", format!("{field}: {message}"))
                .with_code("MUSEUM_VALIDATION")
                .with_errors(vec![ValidationViolation {
                    field: field.clone(),
                    message: message.clone(),
                }])
        }
        DomainError::Unauthorized(msg) => {
            Problem::new(StatusCode::UNAUTHORIZED, "Unauthorized", msg.as_str())
                .with_code("MUSEUM_UNAUTHORIZED")
        }
        DomainError::Forbidden(msg) => {
            tracing::warn!(error = %e, "access forbidden");
            Problem::new(StatusCode::FORBIDDEN, "Forbidden", msg.as_str())
                .with_code("MUSEUM_FORBIDDEN")
        }
        DomainError::NotFound { entity, .. } => {
            Problem::new(StatusCode::NOT_FOUND, "Not Found", format!("{entity} not found"))
                .with_code("MUSEUM_NOT_FOUND")
        }
        DomainError::Conflict(msg) => {
            Problem::new(StatusCode::CONFLICT, "Conflict", msg.as_str()).with_code("MUSEUM_CONFLICT")
        }
        DomainError::Generation(_) => {
            internal(e, "Failed to generate object", "MUSEUM_GENERATION")
        }
        DomainError::Storage(_) => internal(e, "Failed to store file", "MUSEUM_STORAGE"),
        DomainError::Database(_) => {
            internal(e, "An internal database error occurred", "MUSEUM_DATABASE")
        }
        DomainError::Internal(_) => internal(e, "An internal error occurred", "MUSEUM_INTERNAL"),
    };
    problem.with_instance(instance).with_trace_id(trace_id())
}

fn internal(e: &DomainError, detail: &str, code: &str) -> Problem {
    tracing::error!(error = %e, code, "request failed");
    Problem::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", detail).with_code(code)
}

/// Implement From<DomainError> for Problem so `?` works in handlers
impl From<DomainError> for Problem {
    fn from(e: DomainError) -> Self {
        domain_error_to_problem(&e, "/")
    }
}

impl From<JsonRejection> for Problem {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection, "rejected JSON body");
        Problem::new(StatusCode::BAD_REQUEST, "Bad Request", rejection.body_text())
            .with_code("MUSEUM_BAD_REQUEST")
            .with_trace_id(trace_id())
    }
}

impl From<PathRejection> for Problem {
    fn from(rejection: PathRejection) -> Self {
        Problem::new(StatusCode::BAD_REQUEST, "Bad Request", rejection.body_text())
            .with_code("MUSEUM_BAD_REQUEST")
            .with_trace_id(trace_id())
    }
}

impl From<MultipartRejection> for Problem {
    fn from(rejection: MultipartRejection) -> Self {
        Problem::new(StatusCode::BAD_REQUEST, "Bad Request", rejection.body_text())
            .with_code("MUSEUM_BAD_REQUEST")
            .with_trace_id(trace_id())
    }
}

impl From<MultipartError> for Problem {
    fn from(err: MultipartError) -> Self {
        tracing::debug!(error = %err, "malformed multipart body");
        let status = err.status();
        let title = status.canonical_reason().unwrap_or("Bad Request");
        Problem::new(status, title, err.body_text())
            .with_code("MUSEUM_BAD_REQUEST")
            .with_trace_id(trace_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_detail_names_the_field() {
        let p = domain_error_to_problem(
            &DomainError::validation("additionalData.link", "must not be empty"),
            "/modified",
        );
        assert_eq!(p.status, StatusCode::BAD_REQUEST);
        assert_eq!(p.detail, "additionalData.link: must not be empty");
        assert_eq!(p.code, "MUSEUM_VALIDATION");
        assert_eq!(p.instance, "/modified");
        assert_eq!(p.errors.unwrap()[0].field, "additionalData.link");
    }

    #[test]
    fn server_errors_hide_details() {
        let p: Problem = DomainError::generation("model returned garbage: {{{").into();
        assert_eq!(p.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(p.detail, "Failed to generate object");
        assert_eq!(p.instance, "/");

        let p: Problem = DomainError::database("constraint xyz").into();
        assert!(!p.detail.contains("xyz"));
    }

    #[test]
    fn status_mapping() {
        let cases = [
            (DomainError::unauthorized("Invalid email or password"), 401),
            (DomainError::forbidden("nope"), 403),
            (DomainError::not_found("Modified object", "x"), 404),
            (DomainError::conflict("Object is already in inventory"), 409),
            (DomainError::storage("s3 down"), 500),
        ];
        for (err, status) in cases {
            assert_eq!(Problem::from(err).status.as_u16(), status);
        }
        let p: Problem = DomainError::not_found("Modified object", "x").into();
        assert_eq!(p.detail, "Modified object not found");
    }
}
