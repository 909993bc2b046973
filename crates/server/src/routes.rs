pub mod users;

use std::sync::Arc;

use axum::{response::IntoResponse, routing::get, Json, Router};
use service::{
    storage::{InMemoryUserRepository, UserRepository},
    UserService,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;

use crate::{metrics, openapi::ApiDoc};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserService<dyn UserRepository>>,
}

impl AppState {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { users: Arc::new(UserService::new(repo)) }
    }

    /// Fresh in-memory store, optionally holding the sample user.
    pub fn in_memory(seed_sample_user: bool) -> Self {
        let repo: Arc<dyn UserRepository> = if seed_sample_user {
            Arc::new(InMemoryUserRepository::with_sample_user())
        } else {
            Arc::new(InMemoryUserRepository::new())
        };
        Self::new(repo)
    }
}

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = Health)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn prometheus_metrics() -> impl IntoResponse {
    metrics::encode_metrics()
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router: users CRUD plus health, metrics and API docs.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let users_routes = Router::new()
        .route(
            "/users",
            get(users::list_users)
                .post(users::create_user)
                .put(users::update_user),
        )
        .route("/users/:id", get(users::get_user).delete(users::delete_user));

    let ops = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        .route("/api-docs/openapi.json", get(openapi_json));

    ops.merge(users_routes)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法和路径等，日志级别为 INFO
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 请求到达时打点
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // 响应返回时打点，包含状态码与耗时
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 失败（5xx 等）时以 ERROR 记录
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::{Request, StatusCode}};
    use tower::ServiceExt;

    async fn body_json(res: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn app(seed: bool) -> Router {
        build_router(AppState::in_memory(seed), CorsLayer::very_permissive())
    }

    #[tokio::test]
    async fn health_is_ok() {
        let res = app(false)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await["status"], "ok");
    }

    #[tokio::test]
    async fn seeded_list_contains_joe_with_date_of_birth() {
        let res = app(true)
            .oneshot(Request::get("/users").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        let users = body.as_array().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0]["firstName"], "Joe");
        assert_eq!(users[0]["gender"], "MALE");
        assert!(users[0]["id"].is_string());
        assert!(users[0]["dateOfBirth"].is_string());
    }

    #[tokio::test]
    async fn invalid_gender_is_400_with_message() {
        let res = app(true)
            .oneshot(Request::get("/users?gender=robot").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(res).await["errorMessage"], "Invalid gender");
    }

    #[tokio::test]
    async fn malformed_id_is_rejected_by_extractor() {
        let res = app(true)
            .oneshot(Request::get("/users/not-a-uuid").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn storage_failure_is_500() {
        let state = AppState::new(Arc::new(service::storage::mock::FailingUserRepository));
        let res = build_router(state, CorsLayer::very_permissive())
            .oneshot(Request::get("/users").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_json(res).await["errorMessage"].as_str().unwrap().contains("storage error"));
    }

    #[tokio::test]
    async fn openapi_document_lists_user_paths() {
        let res = app(false)
            .oneshot(Request::get("/api-docs/openapi.json").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let doc = body_json(res).await;
        assert!(doc["paths"]["/users"].is_object());
        assert!(doc["paths"]["/users/{id}"].is_object());

        let schemas = &doc["components"]["schemas"];
        assert!(schemas["User"]["properties"]["firstName"].is_object());
        assert!(schemas["User"]["properties"]["dateOfBirth"].is_null());
        let genders = schemas["Gender"]["enum"].as_array().unwrap();
        assert!(genders.contains(&serde_json::json!("MALE")));
        assert!(genders.contains(&serde_json::json!("FEMALE")));
        assert!(schemas["ErrorMessage"]["properties"]["errorMessage"].is_object());
        assert!(schemas["UserResponse"].is_object());
    }

    #[tokio::test]
    async fn metrics_endpoint_reports_user_operations() {
        let router = app(false);
        let _ = router
            .clone()
            .oneshot(Request::get("/users").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let res = router
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("users_operations_total"));
    }
}
