//! Client configuration.
//!
//! Resolved from the environment, with defaults that match a backend running
//! locally:
//! - `TODO_API_URL` (default `http://localhost:5000/api`)
//! - `TODO_API_TIMEOUT_SECS` (default 10)

use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub const BASE_URL_VAR: &str = "TODO_API_URL";
pub const TIMEOUT_VAR: &str = "TODO_API_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var} must be a whole number of seconds greater than zero, got `{value}`")]
    InvalidTimeout { var: &'static str, value: String },
    #[error("{var} must not be empty")]
    EmptyBaseUrl { var: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    /// Upper bound on a whole request/response round-trip.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Resolve the configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(url) = lookup(BASE_URL_VAR) {
            let url = url.trim();
            if url.is_empty() {
                return Err(ConfigError::EmptyBaseUrl { var: BASE_URL_VAR });
            }
            config.base_url = url.to_string();
        }

        if let Some(raw) = lookup(TIMEOUT_VAR) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::InvalidTimeout {
                    var: TIMEOUT_VAR,
                    value: raw.clone(),
                })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}
