//! Runtime configuration.
//!
//! # Responsibility
//! - Provide defaults for viewer address, debounce window and log level.
//! - Read overrides from `NBREVIEW_*` environment variables.
//!
//! # Invariants
//! - Blank variables fall back to defaults; invalid values are errors.

use crate::debounce::DEFAULT_DEBOUNCE;
use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub const DEFAULT_VIEWER_BASE_URL: &str = "https://nbfiddle.app/";

pub const ENV_VIEWER_BASE_URL: &str = "NBREVIEW_VIEWER_BASE_URL";
pub const ENV_DEBOUNCE_MS: &str = "NBREVIEW_DEBOUNCE_MS";
pub const ENV_LOG_LEVEL: &str = "NBREVIEW_LOG_LEVEL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidDebounce(String),
    InvalidViewerBaseUrl(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDebounce(value) => {
                write!(f, "invalid {ENV_DEBOUNCE_MS}: `{value}`; expected milliseconds")
            }
            Self::InvalidViewerBaseUrl(value) => write!(
                f,
                "invalid {ENV_VIEWER_BASE_URL}: `{value}`; expected http(s) URL"
            ),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewConfig {
    pub viewer_base_url: String,
    pub debounce: Duration,
    pub log_level: String,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            viewer_base_url: DEFAULT_VIEWER_BASE_URL.to_string(),
            debounce: DEFAULT_DEBOUNCE,
            log_level: default_log_level().to_string(),
        }
    }
}

impl ReviewConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, one call per variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(value) = read(ENV_VIEWER_BASE_URL) {
            if !(value.starts_with("https://") || value.starts_with("http://")) {
                return Err(ConfigError::InvalidViewerBaseUrl(value));
            }
            config.viewer_base_url = value;
        }
        if let Some(value) = read(ENV_DEBOUNCE_MS) {
            let millis = value
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidDebounce(value.clone()))?;
            config.debounce = Duration::from_millis(millis);
        }
        if let Some(value) = read(ENV_LOG_LEVEL) {
            config.log_level = value;
        }
        Ok(config)
    }
}
