use axum::{
    extract::{DefaultBodyLimit, OriginalUri},
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::middleware::{render_internal_errors, require_auth, TOKEN_HEADER};
use crate::state::AppState;

/// Full application router for the given state.
pub fn app(state: AppState) -> Router {
    let max_body = state.config.api.max_request_size_bytes;
    let cors = cors_layer(&state.config.security.cors_origins);

    Router::new()
        .merge(public_routes())
        .merge(protected_routes(state.clone()))
        .fallback(route_not_found)
        .layer(middleware::from_fn_with_state(state.clone(), render_internal_errors))
        .layer(DefaultBodyLimit::max(max_body))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use axum::routing::post;

    Router::new()
        .route("/api", get(public::index_get))
        .route("/api/health", get(public::health_get))
        .route("/api/auth", post(public::login_post))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use axum::routing::put;
    use protected::{auth, budgets, projects, users};

    Router::new()
        .route("/api/auth", get(auth::whoami_get))
        // Users
        .route("/api/users", get(users::users_get).post(users::users_post))
        .route(
            "/api/users/:id",
            get(users::user_get).put(users::user_put).delete(users::user_delete),
        )
        .route("/api/users/:id/password", put(users::password_put))
        // Projects
        .route("/api/projects", get(projects::projects_get).post(projects::projects_post))
        .route(
            "/api/projects/:id",
            get(projects::project_get)
                .put(projects::project_put)
                .delete(projects::project_delete),
        )
        // Budgets
        .route("/api/budgets", get(budgets::budgets_get).post(budgets::budgets_post))
        .route(
            "/api/budgets/:id",
            get(budgets::budget_get).put(budgets::budget_put).delete(budgets::budget_delete),
        )
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(TOKEN_HEADER),
        ]);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }
    let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| HeaderValue::from_str(o).ok()).collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

async fn route_not_found(method: Method, OriginalUri(uri): OriginalUri) -> ApiError {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    ApiError::RouteNotFound {
        method: method.to_string(),
        path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hash_password;
    use crate::config::AppConfig;
    use crate::database::models::User;
    use crate::types::Role;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, body)
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn unknown_routes_name_method_and_path() {
        let state = AppState::in_memory(AppConfig::for_tests()).unwrap();
        let request = Request::builder().uri("/api/nothing?x=1").body(Body::empty()).unwrap();
        let (status, body) = send(app(state), request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "success": false, "message": "Not Found - GET /api/nothing?x=1" }));
    }

    #[tokio::test]
    async fn protected_routes_need_a_token() {
        let state = AppState::in_memory(AppConfig::for_tests()).unwrap();
        let request = Request::builder().uri("/api/projects").body(Body::empty()).unwrap();
        let (status, body) = send(app(state), request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "No token, authorization denied");
    }

    #[tokio::test]
    async fn login_and_whoami_share_a_path() {
        let state = AppState::in_memory(AppConfig::for_tests()).unwrap();
        let hash = hash_password("password123", 4).await.unwrap();
        let user = User::new("Ada".into(), "ada@example.com".into(), hash, Role::Manager);
        state.store.insert_user(&user).await.unwrap();
        let router = app(state);

        let login = json_request("POST", "/api/auth", json!({ "email": "ada@example.com", "password": "password123" }));
        let (status, body) = send(router.clone(), login).await;
        assert_eq!(status, StatusCode::OK);
        let token = body["token"].as_str().unwrap().to_string();

        let whoami = Request::builder()
            .uri("/api/auth")
            .header(TOKEN_HEADER, token)
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(router, whoami).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "ada@example.com");
        assert!(body.get("password").is_none());
    }

    #[tokio::test]
    async fn oversized_bodies_are_refused() {
        let state = AppState::in_memory(AppConfig::for_tests()).unwrap();
        let padding = "x".repeat(20 * 1024);
        let request = json_request("POST", "/api/auth", json!({ "email": "a@b.co", "password": padding }));
        let (status, _) = send(app(state), request).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let state = AppState::in_memory(AppConfig::for_tests()).unwrap();
        let request = Request::builder()
            .method("POST")
            .uri("/api/auth")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(app(state), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["msg"].is_string());
    }

    #[tokio::test]
    async fn health_reports_store() {
        let state = AppState::in_memory(AppConfig::for_tests()).unwrap();
        let request = Request::builder().uri("/api/health").body(Body::empty()).unwrap();
        let (status, body) = send(app(state), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["database"], "connected");
    }
}
