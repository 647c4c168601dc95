use std::sync::Arc;

use axum::routing::{get, patch, post, put};
use axum::{Extension, Router, middleware};
use museum_auth::TokenService;
use museum_auth::axum_ext::{AdminKey, require_admin_key, require_bearer};

use crate::api::rest::handlers::{self, accounts, modified, objects, onboarding, presets, users};
use crate::domain::service::AppServices;
use crate::infra::storage::{SeaCatalogRepository, SeaModifiedRepository, SeaUsersRepository};

/// Type alias for the concrete service container.
pub type ConcreteServices =
    AppServices<SeaCatalogRepository, SeaModifiedRepository, SeaUsersRepository>;

fn public_routes() -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/signup", post(accounts::signup))
        .route("/login", post(accounts::login))
        .route("/object/basic", get(objects::list_presets))
}

fn user_routes(tokens: Arc<TokenService>) -> Router {
    Router::new()
        .route("/profile", get(accounts::profile))
        .route("/verify", get(accounts::verify))
        .route("/users/theme/music", patch(users::change_theme_music))
        .route("/users/theme/{theme_id}", put(users::change_theme))
        .route("/users/invitation", patch(users::update_invitation))
        .route(
            "/onboarding/theme",
            get(onboarding::questions).post(onboarding::save_responses),
        )
        .route("/arti/analyze", post(onboarding::analyze))
        .route(
            "/arti/analyze-from-profile",
            post(onboarding::analyze_from_profile),
        )
        .route("/arti/analysis", get(onboarding::get_analysis))
        .route("/object/followup", post(objects::follow_up_question))
        .route(
            "/object",
            post(objects::create_from_text).get(objects::list_user_objects),
        )
        .route("/object/add", post(objects::add_to_inventory))
        .route("/modified", post(modified::create).get(modified::list))
        .route(
            "/modified/{id}",
            patch(modified::update).delete(modified::delete),
        )
        .layer(middleware::from_fn_with_state(tokens, require_bearer))
}

fn admin_routes(admin_key: AdminKey) -> Router {
    Router::new()
        .route("/object/basic", post(presets::create))
        .route("/object/{id}", patch(presets::update).delete(presets::delete))
        .layer(middleware::from_fn_with_state(admin_key, require_admin_key))
}

/// Builds the module router. Each route group carries its own guard.
pub fn register_routes(
    services: Arc<ConcreteServices>,
    tokens: Arc<TokenService>,
    admin_key: AdminKey,
) -> Router {
    public_routes()
        .merge(user_routes(tokens))
        .merge(admin_routes(admin_key))
        .layer(Extension(services))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::service::test_support::{TEST_SECRET, db, services};
    use crate::domain::themes::ThemeCatalog;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use museum_auth::Caller;
    use secrecy::SecretString;
    use serde_json::Value;
    use std::time::Duration;
    use tower::ServiceExt as _;
    use uuid::Uuid;

    async fn app() -> Router {
        let db = db().await;
        let tokens = Arc::new(TokenService::new(
            &SecretString::from(TEST_SECRET.to_owned()),
            Duration::from_secs(3600),
        ));
        register_routes(
            Arc::new(services(&db, ThemeCatalog::builtin())),
            tokens,
            AdminKey::new(Some(SecretString::from("admin-key".to_owned()))),
        )
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let response = app()
            .await
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn user_routes_require_a_token() {
        let response = app()
            .await
            .oneshot(Request::get("/modified").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_routes_require_the_key() {
        let response = app()
            .await
            .oneshot(
                Request::delete(format!("/object/{}", Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn malformed_json_is_a_problem() {
        let response = app()
            .await
            .oneshot(
                Request::post("/signup")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{\"email\": "))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/problem+json"
        );
        assert_eq!(json_body(response).await["code"], "MUSEUM_BAD_REQUEST");
    }

    #[tokio::test]
    async fn invalid_theme_id_is_rejected() {
        let tokens = TokenService::new(
            &SecretString::from(TEST_SECRET.to_owned()),
            Duration::from_secs(3600),
        );
        let token = tokens
            .issue(&Caller {
                id: Uuid::new_v4(),
                email: "someone@museum.test".to_owned(),
                name: None,
            })
            .unwrap();

        let response = app()
            .await
            .oneshot(
                Request::put("/users/theme/9")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(
            json["detail"],
            "themeId: Invalid theme ID. Must be between 1 and 5."
        );
        assert_eq!(json["instance"], "/");
    }
}
