//! REST client for the hosted backend.
//!
//! One instance is built at the application root and shared through the
//! session context. It keeps the current token pair itself (mirrored to local
//! storage) so table calls always go out on behalf of whoever is signed in.

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use gloo::net::http::{Request, RequestBuilder, Response};
use gloo::storage::{LocalStorage, Storage};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use shared::backend::{
    AuthApi, AuthSession, AuthUser, Credentials, Filter, Query, Row, SignUpOutcome, TableApi,
};
use shared::{BackendConfig, BackendError};

use crate::services::date_utils::now_unix_secs;
use crate::services::logging::Logger;

pub const SESSION_STORAGE_KEY: &str = "babysleep.auth.session";

const COMPONENT: &str = "api-client";

#[derive(Clone)]
pub struct ApiClient {
    config: BackendConfig,
    session: Rc<RefCell<Option<AuthSession>>>,
}

impl PartialEq for ApiClient {
    fn eq(&self, other: &Self) -> bool {
        self.config == other.config && Rc::ptr_eq(&self.session, &other.session)
    }
}

fn network(error: gloo::net::Error) -> BackendError {
    BackendError::Network(error.to_string())
}

/// Human-readable message from an error response body. Tables answer with
/// `message`, the identity service with `error_description` or `msg`.
pub(crate) fn error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "error_description", "msg", "error"]
                .iter()
                .find_map(|key| value.get(key).and_then(Value::as_str).map(str::to_string))
        })
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty() && !trimmed.starts_with('{')).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| format!("Request failed with status {}", status))
}

async fn rejection(response: Response) -> BackendError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    BackendError::rejected(status, error_message(status, &body))
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    if !response.ok() {
        return Err(rejection(response).await);
    }
    response
        .json::<T>()
        .await
        .map_err(|e| BackendError::Decode(e.to_string()))
}

async fn read_empty(response: Response) -> Result<(), BackendError> {
    if response.ok() {
        Ok(())
    } else {
        Err(rejection(response).await)
    }
}

/// A sign-up answer is a full session, or just the user when the backend wants
/// the email confirmed first.
pub(crate) fn parse_sign_up(body: Value) -> Result<SignUpOutcome, BackendError> {
    let decode = |e: serde_json::Error| BackendError::Decode(e.to_string());
    if body.get("access_token").is_some() {
        let session: AuthSession = serde_json::from_value(body).map_err(decode)?;
        Ok(SignUpOutcome {
            user: session.user.clone(),
            session: Some(session),
        })
    } else {
        let user = body.get("user").cloned().unwrap_or(body);
        Ok(SignUpOutcome {
            user: serde_json::from_value(user).map_err(decode)?,
            session: None,
        })
    }
}

impl ApiClient {
    pub fn new(config: BackendConfig) -> Self {
        Logger::info_with_component(
            COMPONENT,
            &format!("🔌 Backend {} (key {})", config.url, config.masked_key()),
        );
        Self {
            config,
            session: Rc::new(RefCell::new(Self::stored_session())),
        }
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn stored_session() -> Option<AuthSession> {
        LocalStorage::get::<AuthSession>(SESSION_STORAGE_KEY).ok()
    }

    /// Re-read the persisted session after another tab changed it.
    pub fn reload_from_storage(&self) -> Option<AuthSession> {
        let session = Self::stored_session();
        *self.session.borrow_mut() = session.clone();
        session
    }

    fn remember(&self, session: &AuthSession) {
        if let Err(e) = LocalStorage::set(SESSION_STORAGE_KEY, session) {
            Logger::warn_with_component(COMPONENT, &format!("⚠️ Could not persist session: {}", e));
        }
        *self.session.borrow_mut() = Some(session.clone());
    }

    fn forget(&self) {
        LocalStorage::delete(SESSION_STORAGE_KEY);
        *self.session.borrow_mut() = None;
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        let bearer = self
            .session
            .borrow()
            .as_ref()
            .map(|s| s.access_token.clone())
            .unwrap_or_else(|| self.config.anon_key.clone());
        builder
            .header("apikey", &self.config.anon_key)
            .header("Authorization", &format!("Bearer {}", bearer))
    }

    fn returning_rows(&self, builder: RequestBuilder) -> RequestBuilder {
        self.authorized(builder)
            .header("Prefer", "return=representation")
    }

    async fn post_json<T: DeserializeOwned>(&self, url: &str, body: &Value) -> Result<T, BackendError> {
        let response = self
            .authorized(Request::post(url))
            .json(body)
            .map_err(network)?
            .send()
            .await
            .map_err(network)?;
        read_json(response).await
    }

    fn filter_pairs(filters: &[Filter]) -> Vec<(String, String)> {
        filters
            .iter()
            .map(|f| (f.column.clone(), f.to_query_value()))
            .collect()
    }
}

#[async_trait(?Send)]
impl AuthApi for ApiClient {
    async fn get_session(&self) -> Result<Option<AuthSession>, BackendError> {
        let stored = self.session.borrow().clone();
        let Some(mut session) = stored else {
            return Ok(None);
        };

        if session.is_expired(now_unix_secs()) {
            session = match self.refresh_session(&session.refresh_token).await {
                Ok(refreshed) => refreshed,
                Err(BackendError::Rejected { .. }) => {
                    self.forget();
                    return Ok(None);
                }
                Err(e) => return Err(e),
            };
        }

        let response = self
            .authorized(Request::get(&self.config.auth_url("user")))
            .send()
            .await
            .map_err(network)?;
        if matches!(response.status(), 401 | 403) {
            Logger::info_with_component(COMPONENT, "🔒 Stored session is no longer valid");
            self.forget();
            return Ok(None);
        }
        session.user = read_json::<AuthUser>(response).await?;
        self.remember(&session);
        Ok(Some(session))
    }

    async fn sign_in_with_password(
        &self,
        credentials: &Credentials,
    ) -> Result<AuthSession, BackendError> {
        let url = self.config.auth_url("token?grant_type=password");
        let body = json!({ "email": credentials.email, "password": credentials.password });
        let session: AuthSession = self.post_json(&url, &body).await?;
        self.remember(&session);
        Ok(session)
    }

    async fn sign_up(
        &self,
        credentials: &Credentials,
        metadata: Option<Value>,
    ) -> Result<SignUpOutcome, BackendError> {
        let mut body = json!({ "email": credentials.email, "password": credentials.password });
        if let Some(data) = metadata {
            body["data"] = data;
        }
        let answer: Value = self.post_json(&self.config.auth_url("signup"), &body).await?;
        let outcome = parse_sign_up(answer)?;
        if let Some(session) = &outcome.session {
            self.remember(session);
        }
        Ok(outcome)
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, BackendError> {
        let url = self.config.auth_url("token?grant_type=refresh_token");
        let session: AuthSession = self
            .post_json(&url, &json!({ "refresh_token": refresh_token }))
            .await?;
        self.remember(&session);
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        let result = match self
            .authorized(Request::post(&self.config.auth_url("logout")))
            .send()
            .await
        {
            Ok(response) => read_empty(response).await,
            Err(e) => Err(network(e)),
        };
        self.forget();
        result
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), BackendError> {
        let response = self
            .authorized(Request::post(&self.config.auth_url("recover")))
            .json(&json!({ "email": email }))
            .map_err(network)?
            .send()
            .await
            .map_err(network)?;
        read_empty(response).await
    }

    async fn update_password(&self, password: &str) -> Result<AuthUser, BackendError> {
        let response = self
            .authorized(Request::put(&self.config.auth_url("user")))
            .json(&json!({ "password": password }))
            .map_err(network)?
            .send()
            .await
            .map_err(network)?;
        read_json(response).await
    }
}

#[async_trait(?Send)]
impl TableApi for ApiClient {
    async fn select(&self, query: &Query) -> Result<Vec<Row>, BackendError> {
        let pairs = query.to_query_pairs();
        let response = self
            .authorized(Request::get(&self.config.table_url(&query.table)))
            .query(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .send()
            .await
            .map_err(network)?;
        read_json(response).await
    }

    async fn insert(&self, table: &str, row: Row) -> Result<Row, BackendError> {
        let response = self
            .returning_rows(Request::post(&self.config.table_url(table)))
            .json(&row)
            .map_err(network)?
            .send()
            .await
            .map_err(network)?;
        let mut rows: Vec<Row> = read_json(response).await?;
        if rows.is_empty() {
            return Err(BackendError::Decode(format!(
                "insert into {} returned no rows",
                table
            )));
        }
        Ok(rows.swap_remove(0))
    }

    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        patch: Row,
    ) -> Result<Vec<Row>, BackendError> {
        let pairs = Self::filter_pairs(filters);
        let response = self
            .returning_rows(Request::patch(&self.config.table_url(table)))
            .query(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .json(&patch)
            .map_err(network)?
            .send()
            .await
            .map_err(network)?;
        read_json(response).await
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<Vec<Row>, BackendError> {
        let pairs = Self::filter_pairs(filters);
        let response = self
            .returning_rows(Request::delete(&self.config.table_url(table)))
            .query(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .send()
            .await
            .map_err(network)?;
        read_json(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_error_message_prefers_backend_text() {
        assert_eq!(
            error_message(404, r#"{"code":"42P01","message":"relation \"public.x\" does not exist"}"#),
            "relation \"public.x\" does not exist"
        );
        assert_eq!(
            error_message(400, r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#),
            "Invalid login credentials"
        );
        assert_eq!(
            error_message(422, r#"{"msg":"User already registered"}"#),
            "User already registered"
        );
        assert_eq!(error_message(502, "Bad Gateway"), "Bad Gateway");
        assert_eq!(error_message(500, ""), "Request failed with status 500");
        assert_eq!(error_message(500, "{}"), "Request failed with status 500");
    }

    #[wasm_bindgen_test]
    fn test_sign_up_answer_shapes() {
        let with_session = parse_sign_up(json!({
            "access_token": "a",
            "refresh_token": "r",
            "expires_at": 1_750_000_000,
            "user": {"id": "u1", "email": "p@example.com"}
        }))
        .unwrap();
        assert_eq!(with_session.user.id, "u1");
        assert!(with_session.session.is_some());

        let pending = parse_sign_up(json!({"id": "u2", "email": "q@example.com"})).unwrap();
        assert_eq!(pending.user.id, "u2");
        assert!(pending.session.is_none());

        assert!(parse_sign_up(json!({"unexpected": true})).is_err());
    }

    #[wasm_bindgen_test]
    fn test_session_persists_across_clients() {
        LocalStorage::delete(SESSION_STORAGE_KEY);
        let config = BackendConfig::from_values(Some("http://localhost:54321"), Some("key")).unwrap();
        let client = ApiClient::new(config.clone());
        assert!(client.session.borrow().is_none());

        let session = AuthSession {
            access_token: "token".to_string(),
            refresh_token: "refresh".to_string(),
            token_type: "bearer".to_string(),
            expires_in: 3600,
            expires_at: 4_000_000_000,
            user: AuthUser {
                id: "u1".to_string(),
                email: None,
                user_metadata: None,
            },
        };
        client.remember(&session);

        let other_tab = ApiClient::new(config);
        assert_eq!(other_tab.session.borrow().as_ref(), Some(&session));

        client.forget();
        assert_eq!(other_tab.reload_from_storage(), None);
    }
}
