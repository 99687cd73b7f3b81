//! Configuration file discovery
//!
//! Finds `sync.{toml,yaml,yml,json}` in the global `~/.kanban-sync/` directory
//! and the project `./.kanban-sync/` directory. Project files win over global
//! ones when merged.

use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Name of the configuration directory in both scopes
pub const CONFIG_DIR_NAME: &str = ".kanban-sync";

const CONFIG_FILE_NAMES: [&str; 4] = ["sync.toml", "sync.yaml", "sync.yml", "sync.json"];

/// A discovered configuration file
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Full path to the configuration file
    pub path: PathBuf,
    /// Detected format of the file
    pub format: ConfigFormat,
    /// Where the file was found
    pub scope: ConfigScope,
}

impl ConfigFile {
    pub fn new(path: PathBuf, format: ConfigFormat, scope: ConfigScope) -> Self {
        Self {
            path,
            format,
            scope,
        }
    }

    /// Priority for ordering (higher values take precedence)
    pub fn priority(&self) -> u8 {
        self.scope.priority()
    }
}

/// Configuration file format detected from file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Configuration scope indicating where the file was discovered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigScope {
    /// `~/.kanban-sync/`
    Global,
    /// `./.kanban-sync/`
    Project,
}

impl ConfigScope {
    pub fn priority(self) -> u8 {
        match self {
            Self::Global => 10,
            Self::Project => 20,
        }
    }
}

/// File discovery service for finding configuration files
#[derive(Debug, Default, Clone)]
pub struct FileDiscovery {
    project_dir: Option<PathBuf>,
    global_dir: Option<PathBuf>,
}

impl FileDiscovery {
    /// Discovery rooted at the current directory and the home directory,
    /// resolved lazily at discovery time.
    pub fn new() -> Self {
        Self::default()
    }

    /// Discovery with explicit directories (each is the `.kanban-sync` dir itself)
    pub fn with_directories(project_dir: Option<PathBuf>, global_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            global_dir,
        }
    }

    /// Discover all configuration files, lowest priority first so later
    /// files override earlier ones when merged.
    pub fn discover_all(&self) -> Vec<ConfigFile> {
        let project_dir = self.project_dir.clone().or_else(Self::resolve_project_dir);
        let global_dir = self.global_dir.clone().or_else(Self::resolve_global_dir);

        let mut files = Vec::new();
        if let Some(ref dir) = global_dir {
            files.extend(self.search_directory(dir, ConfigScope::Global));
        }
        if let Some(ref dir) = project_dir {
            files.extend(self.search_directory(dir, ConfigScope::Project));
        }

        files.sort_by_key(|f| f.priority());

        debug!("Discovered {} configuration files", files.len());
        for file in &files {
            trace!("Found config: {} ({:?})", file.path.display(), file.format);
        }
        files
    }

    fn search_directory(&self, dir: &Path, scope: ConfigScope) -> Vec<ConfigFile> {
        if !dir.exists() {
            trace!("Directory does not exist: {}", dir.display());
            return Vec::new();
        }
        if !dir.is_dir() {
            warn!("Path exists but is not a directory: {}", dir.display());
            return Vec::new();
        }

        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .filter(|candidate| candidate.is_file())
            .filter_map(|candidate| Self::classify_file(&candidate, scope))
            .collect()
    }

    fn classify_file(path: &Path, scope: ConfigScope) -> Option<ConfigFile> {
        let filename = path.file_name()?.to_str()?;
        if !CONFIG_FILE_NAMES.contains(&filename) {
            return None;
        }
        let format = ConfigFormat::from_extension(path.extension()?.to_str()?)?;
        Some(ConfigFile::new(path.to_path_buf(), format, scope))
    }

    fn resolve_project_dir() -> Option<PathBuf> {
        let dir = std::env::current_dir().ok()?.join(CONFIG_DIR_NAME);
        dir.is_dir().then_some(dir)
    }

    fn resolve_global_dir() -> Option<PathBuf> {
        let dir = dirs::home_dir()?.join(CONFIG_DIR_NAME);
        dir.is_dir().then_some(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_config_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("YML"),
            Some(ConfigFormat::Yaml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("txt"), None);
    }

    #[test]
    fn test_config_scope_priority() {
        assert!(ConfigScope::Project.priority() > ConfigScope::Global.priority());
    }

    #[test]
    fn test_classify_file_invalid_name() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "x = 1").unwrap();

        assert!(FileDiscovery::classify_file(&path, ConfigScope::Project).is_none());
    }

    #[test]
    fn test_discover_orders_global_before_project() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        fs::write(project.path().join("sync.toml"), "").unwrap();
        fs::write(global.path().join("sync.yaml"), "").unwrap();

        let discovery = FileDiscovery::with_directories(
            Some(project.path().to_path_buf()),
            Some(global.path().to_path_buf()),
        );
        let files = discovery.discover_all();

        assert_eq!(files.len(), 2);
        assert_eq!(files[0].scope, ConfigScope::Global);
        assert_eq!(files[0].format, ConfigFormat::Yaml);
        assert_eq!(files[1].scope, ConfigScope::Project);
        assert_eq!(files[1].format, ConfigFormat::Toml);
    }

    #[test]
    fn test_search_directory_ignores_unrelated_files() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("sah.toml"), "").unwrap();
        fs::write(temp_dir.path().join("sync.json"), "{}").unwrap();

        let discovery = FileDiscovery::new();
        let files = discovery.search_directory(temp_dir.path(), ConfigScope::Project);

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].format, ConfigFormat::Json);
    }
}
