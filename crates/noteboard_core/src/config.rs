//! Client configuration.
//!
//! # Responsibility
//! - Hold backend selection, API endpoint and local data settings.
//! - Apply `NOTEBOARD_*` environment overrides on top of defaults.
//!
//! # Invariants
//! - Unknown override values are rejected, never silently ignored.
//! - `request_timeout_secs` is always at least 1.

use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const SESSION_DB_FILE_NAME: &str = "noteboard_session.sqlite3";

const ENV_BACKEND: &str = "NOTEBOARD_BACKEND";
const ENV_API_URL: &str = "NOTEBOARD_API_URL";
const ENV_TIMEOUT_SECS: &str = "NOTEBOARD_TIMEOUT_SECS";
const ENV_DATA_DIR: &str = "NOTEBOARD_DATA_DIR";
const ENV_LOG_LEVEL: &str = "NOTEBOARD_LOG_LEVEL";

/// Which persistence gateway a session talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackendKind {
    #[default]
    Mock,
    Http,
}

impl BackendKind {
    /// Parses `mock|http`, ignoring case and surrounding whitespace.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mock" => Some(Self::Mock),
            "http" | "rest" => Some(Self::Http),
            _ => None,
        }
    }

    /// Label accepted by `parse`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mock => "mock",
            Self::Http => "http",
        }
    }
}

/// Invalid configuration override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue {
                key,
                value,
                expected,
            } => write!(f, "invalid value `{value}` for {key}; expected {expected}"),
        }
    }
}

impl Error for ConfigError {}

/// Runtime settings for one client process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub backend: BackendKind,
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    /// Directory holding the session database. `None` keeps session state in memory.
    pub data_dir: Option<PathBuf>,
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            data_dir: None,
            log_level: default_log_level().to_string(),
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by values from `lookup`. Blank values are ignored.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(value) = read(ENV_BACKEND) {
            config.backend = BackendKind::parse(&value).ok_or(ConfigError::InvalidValue {
                key: ENV_BACKEND,
                value,
                expected: "mock|http",
            })?;
        }
        if let Some(value) = read(ENV_API_URL) {
            config.api_base_url = value;
        }
        if let Some(value) = read(ENV_TIMEOUT_SECS) {
            config.request_timeout_secs = match value.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: ENV_TIMEOUT_SECS,
                        value,
                        expected: "a positive number of seconds",
                    })
                }
            };
        }
        if let Some(value) = read(ENV_DATA_DIR) {
            config.data_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = read(ENV_LOG_LEVEL) {
            config.log_level = value;
        }

        Ok(config)
    }

    /// Session database path, when a data directory is configured.
    pub fn session_db_path(&self) -> Option<PathBuf> {
        self.data_dir
            .as_ref()
            .map(|dir| dir.join(SESSION_DB_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::{BackendKind, ClientConfig, ConfigError, DEFAULT_API_BASE_URL};
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_use_mock_backend_and_local_api() {
        let config = ClientConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.backend, BackendKind::Mock);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert!(config.session_db_path().is_none());
    }

    #[test]
    fn overrides_are_applied_and_blank_values_ignored() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("NOTEBOARD_BACKEND", "HTTP"),
            ("NOTEBOARD_API_URL", "https://notes.example.com/api"),
            ("NOTEBOARD_TIMEOUT_SECS", "5"),
            ("NOTEBOARD_DATA_DIR", "/tmp/noteboard"),
            ("NOTEBOARD_LOG_LEVEL", "  "),
        ]))
        .unwrap();
        assert_eq!(config.backend, BackendKind::Http);
        assert_eq!(config.api_base_url, "https://notes.example.com/api");
        assert_eq!(config.request_timeout_secs, 5);
        assert!(config
            .session_db_path()
            .unwrap()
            .ends_with("noteboard_session.sqlite3"));
        assert_eq!(config.log_level, ClientConfig::default().log_level);
    }

    #[test]
    fn invalid_backend_and_timeout_are_rejected() {
        let err = ClientConfig::from_lookup(lookup_from(&[("NOTEBOARD_BACKEND", "ftp")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "NOTEBOARD_BACKEND", .. }));

        let err = ClientConfig::from_lookup(lookup_from(&[("NOTEBOARD_TIMEOUT_SECS", "0")]))
            .unwrap_err();
        assert!(err.to_string().contains("positive"));
    }
}
