//! # BabySleep dev backend
//!
//! Local stand-in for the hosted backend. It speaks the subset of the auth and
//! table REST surface the frontend uses, so the app can be run and exercised
//! end to end without a cloud project.
//!
//! ```text
//! Frontend ──▶ /auth/v1/*        ──▶ auth  ─┐
//!          └─▶ /rest/v1/{table}  ──▶ rest  ─┴─▶ Store (RwLock'd accounts + tables)
//! ```
//!
//! Every request must carry the `apikey` header; table requests also need a
//! bearer token issued by `/auth/v1/token` or `/auth/v1/signup`.

pub mod auth;
pub mod config;
pub mod error;
pub mod rest;
pub mod store;

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::DevBackendConfig;
use crate::error::ApiError;
use crate::store::Store;

pub const API_KEY_HEADER: &str = "apikey";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub config: Arc<DevBackendConfig>,
}

impl AppState {
    pub fn new(config: DevBackendConfig) -> Self {
        Self {
            store: Arc::new(Store::new(config.token_ttl_secs)),
            config: Arc::new(config),
        }
    }
}

async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    match request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
    {
        None => Err(ApiError::MissingApiKey),
        Some(key) if key == state.config.anon_key => Ok(next.run(request).await),
        Some(_) => Err(ApiError::InvalidApiKey),
    }
}

fn cors_layer(config: &DevBackendConfig) -> CorsLayer {
    let cors = match config.allowed_origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new().allow_origin(origin),
        Err(_) => {
            warn!(origin = %config.allowed_origin, "Unparseable allowed origin, allowing any");
            CorsLayer::new().allow_origin(Any)
        }
    };
    cors.allow_methods([
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
    ])
    .allow_headers(Any)
}

/// Create the axum router with all routes configured
pub fn create_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/signup", post(auth::sign_up))
        .route("/token", post(auth::token))
        .route("/logout", post(auth::logout))
        .route("/user", get(auth::get_user).put(auth::update_user))
        .route("/recover", post(auth::recover));

    let rest_routes = Router::new().route(
        "/:table",
        get(rest::select_rows)
            .post(rest::insert_rows)
            .patch(rest::update_rows)
            .delete(rest::delete_rows),
    );

    Router::new()
        .nest("/auth/v1", auth_routes)
        .nest("/rest/v1", rest_routes)
        .layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::util::ServiceExt; // for `oneshot`

    const KEY: &str = "test-anon-key";

    fn test_app() -> Router {
        create_router(AppState::new(DevBackendConfig {
            anon_key: KEY.to_string(),
            ..DevBackendConfig::default()
        }))
    }

    fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(API_KEY_HEADER, KEY)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let body = body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty);
        builder.body(body).unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn sign_up(app: &Router, email: &str, data: Value) -> Value {
        let (status, body) = send(
            app,
            request(
                "POST",
                "/auth/v1/signup",
                None,
                Some(json!({"email": email, "password": "secret123", "data": data})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body
    }

    fn token(session: &Value) -> String {
        session["access_token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_missing_api_key_is_rejected() {
        let app = test_app();
        let request = Request::builder()
            .uri("/rest/v1/babies")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error_description"], "No API key found in request");
    }

    #[tokio::test]
    async fn test_table_requests_need_a_token() {
        let app = test_app();
        let (status, _) = send(&app, request("GET", "/rest/v1/babies", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = send(&app, request("GET", "/rest/v1/babies", Some("bogus"), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_sign_in_with_password() {
        let app = test_app();
        sign_up(&app, "parent@example.com", json!({})).await;

        let (status, body) = send(
            &app,
            request(
                "POST",
                "/auth/v1/token?grant_type=password",
                None,
                Some(json!({"email": "parent@example.com", "password": "wrong-one"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_description"], "Invalid login credentials");

        let (status, session) = send(
            &app,
            request(
                "POST",
                "/auth/v1/token?grant_type=password",
                None,
                Some(json!({"email": "parent@example.com", "password": "secret123"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(session["user"]["email"], "parent@example.com");

        let (status, user) = send(&app, request("GET", "/auth/v1/user", Some(&token(&session)), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(user["id"], session["user"]["id"]);

        let (status, _) = send(&app, request("POST", "/auth/v1/logout", Some(&token(&session)), None)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, request("GET", "/auth/v1/user", Some(&token(&session)), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_duplicate_and_weak_sign_ups() {
        let app = test_app();
        sign_up(&app, "parent@example.com", json!({})).await;

        let (status, body) = send(
            &app,
            request(
                "POST",
                "/auth/v1/signup",
                None,
                Some(json!({"email": "parent@example.com", "password": "secret123"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error_description"], "User already registered");

        let (status, _) = send(
            &app,
            request(
                "POST",
                "/auth/v1/signup",
                None,
                Some(json!({"email": "new@example.com", "password": "123"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_rows_of_one_user_are_invisible_to_another() {
        let app = test_app();
        let alice = sign_up(&app, "alice@example.com", json!({})).await;
        let bob = sign_up(&app, "bob@example.com", json!({})).await;

        let (status, created) = send(
            &app,
            request(
                "POST",
                "/rest/v1/babies",
                Some(&token(&alice)),
                Some(json!({"name": "Ada", "birth_date": "2025-01-15"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created[0]["user_id"], alice["user"]["id"]);
        let baby_id = created[0]["id"].as_str().unwrap().to_string();

        let (_, for_alice) = send(&app, request("GET", "/rest/v1/babies?select=*", Some(&token(&alice)), None)).await;
        assert_eq!(for_alice.as_array().unwrap().len(), 1);
        let (_, for_bob) = send(&app, request("GET", "/rest/v1/babies?select=*", Some(&token(&bob)), None)).await;
        assert_eq!(for_bob, json!([]));

        let uri = format!("/rest/v1/babies?id=eq.{baby_id}");
        let (status, removed) = send(&app, request("DELETE", &uri, Some(&token(&bob)), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(removed, json!([]));

        let (_, patched) = send(
            &app,
            request("PATCH", &uri, Some(&token(&alice)), Some(json!({"name": "Ada Mae"}))),
        )
        .await;
        assert_eq!(patched[0]["name"], "Ada Mae");
    }

    #[tokio::test]
    async fn test_unknown_table_is_404() {
        let app = test_app();
        let session = sign_up(&app, "parent@example.com", json!({})).await;
        let (status, body) = send(&app, request("GET", "/rest/v1/diapers", Some(&token(&session)), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "relation \"public.diapers\" does not exist");
    }

    #[tokio::test]
    async fn test_refresh_token_is_single_use() {
        let app = test_app();
        let session = sign_up(&app, "parent@example.com", json!({})).await;
        let refresh = json!({"refresh_token": session["refresh_token"]});

        let (status, renewed) = send(
            &app,
            request("POST", "/auth/v1/token?grant_type=refresh_token", None, Some(refresh.clone())),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_ne!(renewed["access_token"], session["access_token"]);

        let (status, body) = send(
            &app,
            request("POST", "/auth/v1/token?grant_type=refresh_token", None, Some(refresh)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_description"], "Invalid Refresh Token");
    }

    #[tokio::test]
    async fn test_sign_up_with_referral_code_completes_referral() {
        let app = test_app();
        let referrer = sign_up(&app, "referrer@example.com", json!({})).await;
        let code = shared::referrals::referral_code(referrer["user"]["id"].as_str().unwrap());

        sign_up(&app, "friend@example.com", json!({"referral_code": code.to_lowercase()})).await;

        let (_, referrals) = send(&app, request("GET", "/rest/v1/referrals", Some(&token(&referrer)), None)).await;
        assert_eq!(referrals.as_array().unwrap().len(), 1);
        assert_eq!(referrals[0]["status"], "completed");
        assert_eq!(referrals[0]["referred_email"], "friend@example.com");
    }

    #[tokio::test]
    async fn test_password_update() {
        let app = test_app();
        let session = sign_up(&app, "parent@example.com", json!({})).await;
        let (status, _) = send(
            &app,
            request("PUT", "/auth/v1/user", Some(&token(&session)), Some(json!({"password": "brand-new"}))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &app,
            request(
                "POST",
                "/auth/v1/token?grant_type=password",
                None,
                Some(json!({"email": "parent@example.com", "password": "brand-new"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
}
