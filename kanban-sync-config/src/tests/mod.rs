//! Configuration loading tests

mod env_integration;

use crate::{ConfigProvider, FileDiscovery};
use std::path::Path;

/// Provider that only looks at the given directories
pub(crate) fn provider_for(project: &Path, global: &Path) -> ConfigProvider {
    ConfigProvider::with_discovery(FileDiscovery::with_directories(
        Some(project.to_path_buf()),
        Some(global.to_path_buf()),
    ))
}
