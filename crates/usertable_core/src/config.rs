//! Client configuration resolved from the environment.
//!
//! # Responsibility
//! - Collect the API base URL, mirror DB path, logging and timeout settings.
//! - Validate values before any component is constructed.
//!
//! # Invariants
//! - Blank environment values count as unset.
//! - `request_timeout = None` means requests are unbounded.

use crate::logging::{default_log_level, normalize_level};
use reqwest::Url;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_API_URL: &str = "USERTABLE_API_URL";
pub const ENV_DB_PATH: &str = "USERTABLE_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "USERTABLE_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "USERTABLE_LOG_DIR";
pub const ENV_TIMEOUT_MS: &str = "USERTABLE_TIMEOUT_MS";

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";
const DEFAULT_DB_FILE_NAME: &str = "usertable.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidApiUrl(String),
    InvalidLogLevel(String),
    InvalidTimeout(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidApiUrl(value) => {
                write!(f, "api url must be an absolute http(s) url: `{value}`")
            }
            Self::InvalidLogLevel(message) => write!(f, "{message}"),
            Self::InvalidTimeout(value) => {
                write!(f, "timeout must be a positive number of milliseconds: `{value}`")
            }
        }
    }
}

impl Error for ConfigError {}

/// Runtime settings for one client session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub db_path: PathBuf,
    pub log_level: &'static str,
    /// File logging is off when unset.
    pub log_dir: Option<PathBuf>,
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level(),
            log_dir: None,
            request_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Resolves settings from `USERTABLE_*` process variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves settings through `lookup`, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(url) = read(ENV_API_URL) {
            config.api_base_url = url;
        }
        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = normalize_level(&level).map_err(ConfigError::InvalidLogLevel)?;
        }
        if let Some(dir) = read(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(raw) = read(ENV_TIMEOUT_MS) {
            config.request_timeout = Some(parse_timeout_ms(&raw)?);
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_api_url(&self.api_base_url)?;
        if self.request_timeout.is_some_and(|timeout| timeout.is_zero()) {
            return Err(ConfigError::InvalidTimeout("0".to_string()));
        }
        Ok(())
    }
}

/// Parses an absolute http(s) base URL.
///
/// The HTTP adapter builds its endpoints from the same result, so a URL that
/// passes here is one the adapter accepts.
pub fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    match Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(url),
        _ => Err(ConfigError::InvalidApiUrl(trimmed.to_string())),
    }
}

/// Parses a positive millisecond count.
pub fn parse_timeout_ms(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(ConfigError::InvalidTimeout(raw.to_string())),
    }
}
