//! Backend connection settings.
//!
//! Both values are compiled into the browser bundle, so they are validated once
//! at startup. A missing or malformed value is fatal: the app shows a
//! configuration error instead of constructing a client.

use crate::error::ConfigError;

pub const BACKEND_URL_VAR: &str = "BABYSLEEP_BACKEND_URL";
pub const ANON_KEY_VAR: &str = "BABYSLEEP_ANON_KEY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub url: String,
    pub anon_key: String,
}

impl BackendConfig {
    pub fn from_values(url: Option<&str>, anon_key: Option<&str>) -> Result<Self, ConfigError> {
        let url = url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or(ConfigError::MissingUrl)?;
        let anon_key = anon_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingAnonKey)?;

        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl(url.to_string()));
        }

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        })
    }

    pub fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.url, path.trim_start_matches('/'))
    }

    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.url, table)
    }

    /// Key with everything but the first few characters hidden, for logs.
    pub fn masked_key(&self) -> String {
        let visible: String = self.anon_key.chars().take(6).collect();
        format!("{visible}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config_strips_trailing_slash() {
        let config =
            BackendConfig::from_values(Some("https://demo.example.co/"), Some("anon-key-123"))
                .unwrap();
        assert_eq!(config.url, "https://demo.example.co");
        assert_eq!(config.auth_url("token"), "https://demo.example.co/auth/v1/token");
        assert_eq!(config.table_url("babies"), "https://demo.example.co/rest/v1/babies");
        assert_eq!(config.masked_key(), "anon-k…");
    }

    #[test]
    fn test_missing_values_are_fatal() {
        assert_eq!(
            BackendConfig::from_values(None, Some("key")),
            Err(ConfigError::MissingUrl)
        );
        assert_eq!(
            BackendConfig::from_values(Some("http://localhost:54321"), Some("  ")),
            Err(ConfigError::MissingAnonKey)
        );
    }

    #[test]
    fn test_url_must_be_http() {
        assert_eq!(
            BackendConfig::from_values(Some("localhost:54321"), Some("key")),
            Err(ConfigError::InvalidUrl("localhost:54321".into()))
        );
    }
}
