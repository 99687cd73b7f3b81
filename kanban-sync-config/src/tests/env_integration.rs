//! Environment variable overrides

use super::provider_for;
use serial_test::serial;
use std::fs;
use tempfile::TempDir;

#[test]
#[serial]
fn test_environment_overrides_files() {
    let project = TempDir::new().unwrap();
    let global = TempDir::new().unwrap();

    fs::write(
        project.path().join("sync.toml"),
        "[api]\nbase_url = \"https://file.example.com/api\"\n\n[sync]\nlist_debounce_ms = 250\n",
    )
    .unwrap();

    std::env::set_var("KANBAN_SYNC_API__BASE_URL", "https://env.example.com/api");
    std::env::set_var("KANBAN_SYNC_API__TOKEN", "env-token");

    let result = provider_for(project.path(), global.path()).load();

    std::env::remove_var("KANBAN_SYNC_API__BASE_URL");
    std::env::remove_var("KANBAN_SYNC_API__TOKEN");

    let config = result.unwrap();
    assert_eq!(config.api.base_url, "https://env.example.com/api");
    assert_eq!(config.api.token.as_deref(), Some("env-token"));
    // File-only value should still be present
    assert_eq!(config.sync.list_debounce_ms, 250);
}

#[test]
#[serial]
fn test_environment_numeric_override() {
    let project = TempDir::new().unwrap();
    let global = TempDir::new().unwrap();

    std::env::set_var("KANBAN_SYNC_SYNC__LIST_DEBOUNCE_MS", "75");

    let result = provider_for(project.path(), global.path()).load();

    std::env::remove_var("KANBAN_SYNC_SYNC__LIST_DEBOUNCE_MS");

    assert_eq!(result.unwrap().sync.list_debounce_ms, 75);
}
