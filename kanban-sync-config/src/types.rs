//! Typed configuration for the kanban-sync engine

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use url::Url;

/// Default remote API base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";

/// Default request timeout for gateway calls
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Default debounce window for list reordering
pub const DEFAULT_LIST_DEBOUNCE_MS: u64 = 300;

/// Upper bound accepted for the list debounce window
pub const MAX_LIST_DEBOUNCE_MS: u64 = 10_000;

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Remote collection API settings
    pub api: ApiConfig,
    /// Optimistic sync behaviour
    pub sync: SyncSettings,
}

impl SyncConfig {
    /// Validate all sections
    pub fn validate(&self) -> ConfigResult<()> {
        self.api.validate()?;
        self.sync.validate()
    }
}

/// Remote collection API settings
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the remote store, e.g. `https://boards.example.com/api`
    pub base_url: String,
    /// Bearer credential supplied by the auth collaborator
    pub token: Option<String>,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

// Token stays out of logs.
impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl ApiConfig {
    /// Request timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Parse the base URL
    pub fn base_url(&self) -> ConfigResult<Url> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| ConfigError::invalid_value("api.base_url", e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::invalid_value(
                "api.base_url",
                format!("unsupported scheme '{}'", other),
            )),
        }
    }

    fn validate(&self) -> ConfigResult<()> {
        self.base_url()?;
        if self.timeout_ms == 0 {
            return Err(ConfigError::invalid_value("api.timeout_ms", "must be greater than zero"));
        }
        if matches!(self.token.as_deref(), Some(t) if t.trim().is_empty()) {
            return Err(ConfigError::invalid_value("api.token", "must not be blank"));
        }
        Ok(())
    }
}

/// Optimistic sync behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Debounce window for list reorder writes in milliseconds
    pub list_debounce_ms: u64,
    /// Refetch a stale board before handing out the read model
    pub refresh_on_read: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            list_debounce_ms: DEFAULT_LIST_DEBOUNCE_MS,
            refresh_on_read: true,
        }
    }
}

impl SyncSettings {
    /// Debounce window as a `Duration`
    pub fn list_debounce(&self) -> Duration {
        Duration::from_millis(self.list_debounce_ms)
    }

    /// Settings with a custom debounce window
    pub fn with_list_debounce(mut self, debounce: Duration) -> Self {
        self.list_debounce_ms = u64::try_from(debounce.as_millis()).unwrap_or(u64::MAX);
        self
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.list_debounce_ms > MAX_LIST_DEBOUNCE_MS {
            return Err(ConfigError::invalid_value(
                "sync.list_debounce_ms",
                format!("must be at most {}", MAX_LIST_DEBOUNCE_MS),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SyncConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sync.list_debounce(), Duration::from_millis(300));
        assert_eq!(config.api.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let mut config = SyncConfig::default();
        config.api.base_url = "ftp://boards.example.com".into();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "api.base_url"));
    }

    #[test]
    fn test_rejects_relative_url() {
        let mut config = SyncConfig::default();
        config.api.base_url = "/api".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_long_debounce() {
        let mut config = SyncConfig::default();
        config.sync.list_debounce_ms = MAX_LIST_DEBOUNCE_MS + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_blank_token() {
        let mut config = SyncConfig::default();
        config.api.token = Some("   ".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let api = ApiConfig {
            token: Some("secret-token".into()),
            ..Default::default()
        };
        let rendered = format!("{:?}", api);
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_with_list_debounce() {
        let settings = SyncSettings::default().with_list_debounce(Duration::from_millis(50));
        assert_eq!(settings.list_debounce_ms, 50);
    }

    #[test]
    fn test_huge_debounce_saturates_and_fails_validation() {
        let mut config = SyncConfig::default();
        config.sync = SyncSettings::default().with_list_debounce(Duration::MAX);
        assert_eq!(config.sync.list_debounce_ms, u64::MAX);
        assert!(config.validate().is_err());
    }
}
