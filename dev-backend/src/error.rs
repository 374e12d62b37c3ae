use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Handler errors, rendered the way the hosted backend renders them: auth
/// endpoints answer with `error` / `error_description`, table endpoints with
/// `code` / `message`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("No API key found in request")]
    MissingApiKey,
    #[error("Invalid API key")]
    InvalidApiKey,
    #[error("Auth session missing!")]
    MissingToken,
    #[error("JWT expired or invalid")]
    InvalidToken,
    #[error("Invalid login credentials")]
    InvalidCredentials,
    #[error("User already registered")]
    UserExists,
    #[error("Password should be at least {0} characters")]
    WeakPassword(usize),
    #[error("Invalid Refresh Token")]
    InvalidRefreshToken,
    #[error("Unsupported grant type: {0}")]
    UnsupportedGrant(String),
    #[error("relation \"public.{0}\" does not exist")]
    UnknownTable(String),
    #[error("new row violates row-level security policy for table \"{0}\"")]
    RowLevelSecurity(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingApiKey
            | ApiError::InvalidApiKey
            | ApiError::MissingToken
            | ApiError::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiError::InvalidCredentials
            | ApiError::InvalidRefreshToken
            | ApiError::UnsupportedGrant(_)
            | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::UserExists | ApiError::WeakPassword(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::UnknownTable(_) => StatusCode::NOT_FOUND,
            ApiError::RowLevelSecurity(_) => StatusCode::FORBIDDEN,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::MissingApiKey | ApiError::InvalidApiKey => "invalid_api_key",
            ApiError::MissingToken | ApiError::InvalidToken => "bad_jwt",
            ApiError::InvalidCredentials => "invalid_grant",
            ApiError::UserExists => "user_already_exists",
            ApiError::WeakPassword(_) => "weak_password",
            ApiError::InvalidRefreshToken => "invalid_grant",
            ApiError::UnsupportedGrant(_) => "unsupported_grant_type",
            ApiError::UnknownTable(_) => "42P01",
            ApiError::RowLevelSecurity(_) => "42501",
            ApiError::BadRequest(_) => "PGRST100",
            ApiError::Internal(_) => "unexpected_failure",
        }
    }

    fn is_table_error(&self) -> bool {
        matches!(
            self,
            ApiError::UnknownTable(_) | ApiError::RowLevelSecurity(_) | ApiError::BadRequest(_)
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Dev backend failure");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let body = if self.is_table_error() {
            json!({ "code": self.code(), "message": self.to_string() })
        } else {
            json!({ "error": self.code(), "error_description": self.to_string() })
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
