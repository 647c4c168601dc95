//! Outer HTTP middleware stack.

use anyhow::Context as _;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method, Request, StatusCode};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

const REQUEST_ID_HEADER: &str = "x-request-id";
const ADMIN_KEY_HEADER: &str = "x-admin-key";

fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let parsed = origins
            .iter()
            .map(|o| HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin '{o}'")))
            .collect::<anyhow::Result<Vec<_>>>()?;
        AllowOrigin::list(parsed)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static(ADMIN_KEY_HEADER),
        ]))
}

/// Registration order is innermost first; at runtime a request passes
/// `SetRequestId`, `PropagateRequestId`, Trace, Timeout, CORS, body limit,
/// then the module router.
///
/// # Errors
/// Fails on an invalid CORS origin.
pub fn apply_middleware_stack(router: Router, cfg: &ServerConfig) -> anyhow::Result<Router> {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let mut router = router.layer(DefaultBodyLimit::max(cfg.body_limit_bytes));

    if !cfg.cors_allowed_origins.is_empty() {
        router = router.layer(cors_layer(&cfg.cors_allowed_origins)?);
    }

    router = router.layer(TimeoutLayer::with_status_code(
        StatusCode::GATEWAY_TIMEOUT,
        cfg.request_timeout,
    ));

    router = router.layer(TraceLayer::new_for_http().make_span_with(
        |req: &Request<axum::body::Body>| {
            let rid = req
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("n/a");
            tracing::info_span!(
                "http_request",
                method = %req.method(),
                uri = %req.uri().path(),
                request_id = %rid,
            )
        },
    ));

    router = router.layer(PropagateRequestIdLayer::new(request_id.clone()));
    router = router.layer(SetRequestIdLayer::new(request_id, MakeRequestUuid));
    Ok(router)
}
