//! # Error taxonomy
//!
//! Every layer reports failures through one of these enums:
//! - [`ConfigError`]: the backend URL or public key is missing or malformed
//! - [`BackendError`]: transport-level failure reported by a client implementation
//! - [`AuthError`]: sign-in / sign-up / password flows, shown inline on forms
//! - [`AccessError`]: entity reads and writes, including [`SchemaError`] for rows
//!   that do not match their typed DTO
//!
//! Backend messages are carried verbatim so the UI can show exactly what the
//! backend said.

use thiserror::Error;

/// Missing or malformed backend configuration. Fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Backend URL is not set (BABYSLEEP_BACKEND_URL)")]
    MissingUrl,
    #[error("Backend anon key is not set (BABYSLEEP_ANON_KEY)")]
    MissingAnonKey,
    #[error("Backend URL must start with http:// or https://, got '{0}'")]
    InvalidUrl(String),
}

/// Failure reported by a backend client implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("Network error: {0}")]
    Network(String),
    /// The backend answered with a non-success status; `message` is its own text.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("Unexpected response from backend: {0}")]
    Decode(String),
}

impl BackendError {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Authentication flow failures. Never retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Please fill in all required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("You are not signed in")]
    NotAuthenticated,
    #[error("{0}")]
    Rejected(String),
    #[error("Network error: {0}")]
    Network(String),
}

impl From<BackendError> for AuthError {
    fn from(error: BackendError) -> Self {
        match error {
            BackendError::Rejected { message, .. } => AuthError::Rejected(message),
            BackendError::Network(message) => AuthError::Network(message),
            BackendError::Decode(message) => AuthError::Rejected(message),
        }
    }
}

/// A backend row that could not be decoded into its typed DTO.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Malformed '{table}' record: {message}")]
pub struct SchemaError {
    pub table: &'static str,
    pub message: String,
}

impl SchemaError {
    pub fn new(table: &'static str, message: impl Into<String>) -> Self {
        Self {
            table,
            message: message.into(),
        }
    }
}

/// Entity access failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("You must be signed in to do that")]
    NotAuthenticated,
    #[error("Please fill in all required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("{message}")]
    Backend { status: u16, message: String },
    #[error("No '{table}' record with id {id}")]
    NotFound { table: &'static str, id: String },
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("Network error: {0}")]
    Network(String),
}

impl From<BackendError> for AccessError {
    fn from(error: BackendError) -> Self {
        match error {
            BackendError::Rejected { status, message } => AccessError::Backend { status, message },
            BackendError::Network(message) | BackendError::Decode(message) => {
                AccessError::Network(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_message_is_kept_verbatim() {
        let error: AccessError =
            BackendError::rejected(404, "relation \"public.babies\" does not exist").into();
        assert_eq!(error.to_string(), "relation \"public.babies\" does not exist");

        let auth: AuthError = BackendError::rejected(400, "Invalid login credentials").into();
        assert_eq!(auth.to_string(), "Invalid login credentials");
    }

    #[test]
    fn test_missing_fields_message_lists_fields() {
        let error = AccessError::MissingFields(vec!["name", "birth_date"]);
        assert_eq!(
            error.to_string(),
            "Please fill in all required fields: name, birth_date"
        );
    }

    #[test]
    fn test_schema_error_converts_into_access_error() {
        let error: AccessError = SchemaError::new("sleep_logs", "missing field `wake_time`").into();
        assert!(matches!(error, AccessError::Schema(_)));
        assert!(error.to_string().contains("sleep_logs"));
    }
}
