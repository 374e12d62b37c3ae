//! Environment driven settings for the dev backend.
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file by `main`. Everything has a default so `cargo run` works out of the box.

use std::net::SocketAddr;

use thiserror::Error;

pub const ADDR_VAR: &str = "DEV_BACKEND_ADDR";
pub const ANON_KEY_VAR: &str = "DEV_BACKEND_ANON_KEY";
pub const TOKEN_TTL_VAR: &str = "DEV_BACKEND_TOKEN_TTL_SECS";
pub const ALLOWED_ORIGIN_VAR: &str = "DEV_BACKEND_ALLOWED_ORIGIN";

pub const DEFAULT_ADDR: &str = "127.0.0.1:54321";
pub const DEFAULT_ANON_KEY: &str = "babysleep-dev-anon-key";
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:8080";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is not a valid socket address: '{value}'")]
    InvalidAddr { var: &'static str, value: String },
    #[error("{var} must be a positive number of seconds, got '{value}'")]
    InvalidTtl { var: &'static str, value: String },
    #[error("{var} must not be empty")]
    Empty { var: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevBackendConfig {
    pub addr: SocketAddr,
    pub anon_key: String,
    pub token_ttl_secs: i64,
    pub allowed_origin: String,
}

impl DevBackendConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source; used by `from_env` and the tests.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_addr = lookup(ADDR_VAR).unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = raw_addr
            .trim()
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidAddr {
                var: ADDR_VAR,
                value: raw_addr.clone(),
            })?;

        let anon_key = lookup(ANON_KEY_VAR).unwrap_or_else(|| DEFAULT_ANON_KEY.to_string());
        if anon_key.trim().is_empty() {
            return Err(ConfigError::Empty { var: ANON_KEY_VAR });
        }

        let token_ttl_secs = match lookup(TOKEN_TTL_VAR) {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidTtl {
                        var: TOKEN_TTL_VAR,
                        value: raw,
                    })
                }
            },
            None => DEFAULT_TOKEN_TTL_SECS,
        };

        let allowed_origin =
            lookup(ALLOWED_ORIGIN_VAR).unwrap_or_else(|| DEFAULT_ALLOWED_ORIGIN.to_string());

        Ok(Self {
            addr,
            anon_key: anon_key.trim().to_string(),
            token_ttl_secs,
            allowed_origin,
        })
    }
}

impl Default for DevBackendConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 54321)),
            anon_key: DEFAULT_ANON_KEY.to_string(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DevBackendConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, DevBackendConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = DevBackendConfig::from_lookup(lookup(&[
            (ADDR_VAR, "0.0.0.0:9000"),
            (ANON_KEY_VAR, " secret "),
            (TOKEN_TTL_VAR, "120"),
        ]))
        .unwrap();
        assert_eq!(config.addr.port(), 9000);
        assert_eq!(config.anon_key, "secret");
        assert_eq!(config.token_ttl_secs, 120);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            DevBackendConfig::from_lookup(lookup(&[(ADDR_VAR, "localhost")])),
            Err(ConfigError::InvalidAddr { .. })
        ));
        assert!(matches!(
            DevBackendConfig::from_lookup(lookup(&[(TOKEN_TTL_VAR, "0")])),
            Err(ConfigError::InvalidTtl { .. })
        ));
        assert_eq!(
            DevBackendConfig::from_lookup(lookup(&[(ANON_KEY_VAR, "  ")])),
            Err(ConfigError::Empty { var: ANON_KEY_VAR })
        );
    }
}
