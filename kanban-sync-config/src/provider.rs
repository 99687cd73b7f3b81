//! Configuration provider using Figment

use crate::{
    discovery::{ConfigFile, ConfigFormat, FileDiscovery},
    error::ConfigError,
    types::SyncConfig,
    ConfigResult,
};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use tracing::{debug, info, trace};

/// Prefix for environment overrides, e.g. `KANBAN_SYNC_API__TOKEN`
pub const ENV_PREFIX: &str = "KANBAN_SYNC_";

/// Loads [`SyncConfig`] from all sources with a clear precedence order.
///
/// No caching is performed; configuration is read fresh on each call.
#[derive(Debug, Default, Clone)]
pub struct ConfigProvider {
    discovery: FileDiscovery,
}

impl ConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider using a custom file discovery
    pub fn with_discovery(discovery: FileDiscovery) -> Self {
        Self { discovery }
    }

    /// Load and validate the configuration
    pub fn load(&self) -> ConfigResult<SyncConfig> {
        let config: SyncConfig = self
            .build_figment()
            .extract()
            .map_err(|e| ConfigError::parse_error(None, e))?;

        config.validate()?;

        info!(
            base_url = %config.api.base_url,
            list_debounce_ms = config.sync.list_debounce_ms,
            "Loaded kanban-sync configuration"
        );
        Ok(config)
    }

    /// Build the figment with all sources in precedence order:
    /// 1. defaults
    /// 2. configuration files (global, then project)
    /// 3. environment variables with the `KANBAN_SYNC_` prefix
    fn build_figment(&self) -> Figment {
        debug!("Building figment configuration with precedence order");

        let mut figment = Figment::from(Serialized::defaults(SyncConfig::default()));

        for config_file in self.discovery.discover_all() {
            trace!(
                "Loading config file: {} ({:?})",
                config_file.path.display(),
                config_file.format
            );
            figment = figment.merge(Self::file_provider(&config_file));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn file_provider(config_file: &ConfigFile) -> Figment {
        let path = &config_file.path;
        match config_file.format {
            ConfigFormat::Toml => Figment::from(Toml::file(path)),
            ConfigFormat::Yaml => Figment::from(Yaml::file(path)),
            ConfigFormat::Json => Figment::from(Json::file(path)),
        }
    }
}
