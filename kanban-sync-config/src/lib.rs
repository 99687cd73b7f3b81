//! Configuration management for kanban-sync using Figment
//!
//! Settings are layered with this precedence (later wins):
//!
//! 1. Built-in defaults
//! 2. Global file: `~/.kanban-sync/sync.{toml,yaml,yml,json}`
//! 3. Project file: `./.kanban-sync/sync.{toml,yaml,yml,json}`
//! 4. Environment: `KANBAN_SYNC_` prefix, `__` separates nested keys
//!
//! ```no_run
//! use kanban_sync_config::load_configuration;
//!
//! let config = load_configuration()?;
//! println!("syncing against {}", config.api.base_url);
//! # Ok::<(), kanban_sync_config::ConfigError>(())
//! ```
//!
//! ## Example TOML Configuration
//!
//! ```toml
//! [api]
//! base_url = "https://boards.example.com/api"
//! timeout_ms = 5000
//!
//! [sync]
//! list_debounce_ms = 300
//! refresh_on_read = true
//! ```
//!
//! The bearer token is normally supplied through `KANBAN_SYNC_API__TOKEN`
//! rather than written to a file.

pub mod discovery;
mod error;
mod provider;
mod types;

#[cfg(test)]
mod tests;

pub use discovery::{ConfigFile, ConfigFormat, ConfigScope, FileDiscovery};
pub use error::ConfigError;
pub use provider::{ConfigProvider, ENV_PREFIX};
pub use types::{
    ApiConfig, SyncConfig, SyncSettings, DEFAULT_BASE_URL, DEFAULT_LIST_DEBOUNCE_MS,
    DEFAULT_TIMEOUT_MS, MAX_LIST_DEBOUNCE_MS,
};

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Load configuration from all available sources
pub fn load_configuration() -> ConfigResult<SyncConfig> {
    ConfigProvider::new().load()
}
