//! # Identity endpoints
//!
//! `/auth/v1/*`: email + password accounts, opaque bearer tokens with a fixed
//! lifetime and single-use refresh tokens. Passwords are stored as Argon2id
//! PHC strings.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::async_trait;
use axum::extract::{FromRequestParts, Query, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use shared::backend::{AuthSession, AuthUser};
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub const MIN_PASSWORD_LEN: usize = 6;

pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> ApiResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| ApiError::Internal(format!("Corrupt password hash: {e}")))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(ApiError::Internal(format!("Failed to verify password: {e}"))),
    }
}

fn check_password_strength(password: &str) -> ApiResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::WeakPassword(MIN_PASSWORD_LEN));
    }
    Ok(())
}

/// Raw bearer token from the `Authorization` header.
pub struct BearerToken(pub String);

#[async_trait]
impl FromRequestParts<AppState> for BearerToken {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::MissingToken)?;
        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(ApiError::MissingToken)?;
        Ok(Self(token.to_string()))
    }
}

/// The signed-in user behind the request's bearer token.
pub struct Caller(pub AuthUser);

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;
        let user = state.store.user_for_access_token(&token, Utc::now()).await?;
        Ok(Self(user))
    }
}

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub data: Option<Value>,
}

/// POST /auth/v1/signup
pub async fn sign_up(
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> ApiResult<Json<AuthSession>> {
    let email = request.email.trim();
    info!(email, "POST /auth/v1/signup");

    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::BadRequest(
            "Unable to validate email address: invalid format".to_string(),
        ));
    }
    check_password_strength(&request.password)?;

    let password_hash = hash_password(&request.password)?;
    let user = state
        .store
        .create_user(email, password_hash, request.data.clone())
        .await?;

    let code = request
        .data
        .as_ref()
        .and_then(|data| data.get("referral_code"))
        .and_then(Value::as_str)
        .filter(|code| !code.trim().is_empty());
    if let Some(code) = code {
        record_referral(&state, code, &user).await;
    }

    let session = state.store.issue_session(user, Utc::now()).await;
    Ok(Json(session))
}

async fn record_referral(state: &AppState, code: &str, user: &AuthUser) {
    let Some(referrer) = state.store.user_by_referral_code(code).await else {
        warn!(code, "Sign-up used an unknown referral code");
        return;
    };
    if referrer.id == user.id {
        return;
    }
    let email = user.email.clone().unwrap_or_default();
    match state
        .store
        .complete_referral(&referrer.id, &email, Utc::now())
        .await
    {
        Ok(_) => info!(referrer = %referrer.id, "Referral completed"),
        Err(e) => warn!(error = %e, "Failed to record referral"),
    }
}

#[derive(Debug, Deserialize)]
pub struct GrantParams {
    pub grant_type: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// POST /auth/v1/token?grant_type=password|refresh_token
pub async fn token(
    State(state): State<AppState>,
    Query(params): Query<GrantParams>,
    Json(request): Json<TokenRequest>,
) -> ApiResult<Json<AuthSession>> {
    info!(grant_type = %params.grant_type, "POST /auth/v1/token");
    let now = Utc::now();

    match params.grant_type.as_str() {
        "password" => {
            let email = request.email.unwrap_or_default();
            let password = request.password.unwrap_or_default();
            let (user, hash) = state
                .store
                .credentials_for(&email)
                .await
                .ok_or(ApiError::InvalidCredentials)?;
            if !verify_password(&password, &hash)? {
                return Err(ApiError::InvalidCredentials);
            }
            Ok(Json(state.store.issue_session(user, now).await))
        }
        "refresh_token" => {
            let refresh_token = request.refresh_token.unwrap_or_default();
            let session = state
                .store
                .exchange_refresh_token(&refresh_token, now)
                .await?;
            Ok(Json(session))
        }
        other => Err(ApiError::UnsupportedGrant(other.to_string())),
    }
}

/// POST /auth/v1/logout
pub async fn logout(State(state): State<AppState>, Caller(user): Caller) -> StatusCode {
    info!(user = %user.id, "POST /auth/v1/logout");
    state.store.revoke_all(&user.id).await;
    StatusCode::NO_CONTENT
}

/// GET /auth/v1/user
pub async fn get_user(Caller(user): Caller) -> Json<AuthUser> {
    Json(user)
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub password: String,
}

/// PUT /auth/v1/user
pub async fn update_user(
    State(state): State<AppState>,
    Caller(user): Caller,
    Json(request): Json<UpdateUserRequest>,
) -> ApiResult<Json<AuthUser>> {
    info!(user = %user.id, "PUT /auth/v1/user");
    check_password_strength(&request.password)?;
    let hash = hash_password(&request.password)?;
    let user = state.store.set_password_hash(&user.id, hash).await?;
    Ok(Json(user))
}

#[derive(Debug, Deserialize)]
pub struct RecoverRequest {
    pub email: String,
}

/// POST /auth/v1/recover
///
/// Answers the same way whether or not the account exists.
pub async fn recover(
    State(state): State<AppState>,
    Json(request): Json<RecoverRequest>,
) -> Json<Value> {
    if state.store.credentials_for(&request.email).await.is_some() {
        info!(email = %request.email, "📧 Password recovery requested (no mail is sent in dev)");
    } else {
        info!(email = %request.email, "Password recovery requested for unknown account");
    }
    Json(json!({}))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("hunter22").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("hunter22", &hash).unwrap());
        assert!(!verify_password("hunter23", &hash).unwrap());
    }

    #[test]
    fn test_short_passwords_are_weak() {
        assert_eq!(check_password_strength("12345"), Err(ApiError::WeakPassword(6)));
        assert!(check_password_strength("123456").is_ok());
    }
}
