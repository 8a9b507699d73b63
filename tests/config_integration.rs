//! Configuration system integration tests for Cheese.
//!
//! Tests loading, saving and migrating config files using temporary
//! directories to avoid affecting the real config.

use cheese_lib::config::{get_config, load_from_path, reset_config, save_to_path, set_config, Config};
use cheese_lib::gesture::MissingPointPolicy;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

// =============================================================================
// Config File Operations Tests
// =============================================================================

#[test]
fn test_save_and_load_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.json");

    let mut config = Config::default();
    config.trigger.cooldown_ms = 8000;
    config.countdown.ticks = 5;
    config.detection.missing_point_policy = MissingPointPolicy::TreatAsAbsent;

    save_to_path(&config, &config_path).expect("Failed to save config");
    let loaded = load_from_path(&config_path).expect("Failed to load config");

    assert_eq!(loaded.trigger.cooldown_ms, 8000);
    assert_eq!(loaded.countdown.ticks, 5);
    assert_eq!(
        loaded.detection.missing_point_policy,
        MissingPointPolicy::TreatAsAbsent
    );
}

#[test]
fn test_load_nonexistent_config_returns_defaults() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nonexistent.json");

    let config = load_from_path(&config_path).expect("Should return defaults");

    assert_eq!(config.version, 1);
    assert_eq!(config.trigger.cooldown_ms, 5000);
    assert_eq!(config.storage.gallery_key, "selfies");
    // Loading defaults does not create the file
    assert!(!config_path.exists());
}

#[test]
fn test_save_creates_parent_directories() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nested").join("dir").join("config.json");

    save_to_path(&Config::default(), &config_path).expect("Failed to save");
    assert!(config_path.exists());
}

#[test]
fn test_multiple_saves_dont_corrupt() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("multi.json");

    let mut config = Config::default();
    for step in 1..=10 {
        config.trigger.cooldown_ms = 5000 + step * 100;
        save_to_path(&config, &config_path).expect("Failed to save");
    }

    let loaded = load_from_path(&config_path).expect("Failed to load");
    assert_eq!(loaded.trigger.cooldown_ms, 6000);
}

#[test]
fn test_config_pretty_printed_json() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("pretty.json");

    save_to_path(&Config::default(), &config_path).expect("Failed to save");

    let contents = fs::read_to_string(&config_path).expect("Failed to read");
    assert!(contents.contains('\n'));
    assert!(contents.contains("\"cooldown_ms\": 5000"));
}

// =============================================================================
// Config Version and Migration Tests
// =============================================================================

#[test]
fn test_version_0_config_is_migrated_and_saved() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("old.json");
    fs::write(&config_path, r#"{"version": 0, "trigger": {"cooldown_ms": 4000}}"#)
        .expect("Failed to write");

    let loaded = load_from_path(&config_path).expect("Failed to load");
    assert_eq!(loaded.version, 1);
    assert_eq!(loaded.trigger.cooldown_ms, 4000);

    // The migrated version was written back
    let on_disk: Config =
        serde_json::from_str(&fs::read_to_string(&config_path).unwrap()).unwrap();
    assert_eq!(on_disk.version, 1);
}

#[test]
fn test_future_version_rejected() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("future.json");
    fs::write(&config_path, r#"{"version": 99}"#).expect("Failed to write");

    let result = load_from_path(&config_path);
    assert!(result.unwrap_err().contains("Unknown config version"));
}

// =============================================================================
// Edge Cases
// =============================================================================

#[test]
fn test_config_handles_invalid_json() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("invalid.json");
    fs::write(&config_path, "{ not valid json").expect("Failed to write");

    let result = load_from_path(&config_path);
    assert!(result.unwrap_err().contains("Failed to parse config"));
}

#[test]
fn test_invalid_values_rejected_on_load() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("zero_ticks.json");
    fs::write(&config_path, r#"{"version": 1, "countdown": {"ticks": 0}}"#)
        .expect("Failed to write");

    assert!(load_from_path(&config_path).is_err());
}

#[test]
fn test_cooldown_shorter_than_countdown_rejected_on_load() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("short_cooldown.json");
    fs::write(
        &config_path,
        r#"{"version": 1, "trigger": {"cooldown_ms": 1000}, "countdown": {"ticks": 3, "tick_interval_ms": 1000}}"#,
    )
    .expect("Failed to write");

    let result = load_from_path(&config_path);
    assert!(result.unwrap_err().contains("cooldown_ms"));
}

#[test]
fn test_zero_cooldown_rejected_on_load() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("zero_cooldown.json");
    fs::write(&config_path, r#"{"version": 1, "trigger": {"cooldown_ms": 0}}"#)
        .expect("Failed to write");

    assert!(load_from_path(&config_path).is_err());
}

#[test]
fn test_download_dir_round_trips() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("storage.json");

    let mut config = Config::default();
    config.storage.download_dir = Some(PathBuf::from("/srv/selfies"));
    config.storage.persist_gallery = false;
    save_to_path(&config, &config_path).expect("Failed to save");

    let loaded = load_from_path(&config_path).expect("Failed to load");
    assert_eq!(loaded.storage.download_dir, Some(PathBuf::from("/srv/selfies")));
    assert!(!loaded.storage.persist_gallery);
}

// =============================================================================
// Set and Reset Tests
// =============================================================================

#[test]
fn test_set_then_reset_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("settings").join("config.json");

    let mut config = Config::default();
    config.version = 0;
    config.trigger.cooldown_ms = 7000;
    config.storage.file_prefix = "me".to_string();
    set_config(config, &config_path).expect("Failed to set config");

    let on_disk = load_from_path(&config_path).expect("Failed to load");
    assert_eq!(on_disk.version, 1);
    assert_eq!(on_disk.trigger.cooldown_ms, 7000);
    assert_eq!(get_config().trigger.cooldown_ms, 7000);
    assert_eq!(get_config().storage.file_prefix, "me");

    let defaults = reset_config(&config_path).expect("Failed to reset config");
    assert_eq!(defaults.trigger.cooldown_ms, 5000);

    let on_disk = load_from_path(&config_path).expect("Failed to load");
    assert_eq!(on_disk.trigger.cooldown_ms, 5000);
    assert_eq!(on_disk.storage.file_prefix, "selfie");
    assert_eq!(get_config().trigger.cooldown_ms, 5000);
}

#[test]
fn test_set_config_rejects_invalid_without_writing() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.json");

    let mut config = Config::default();
    config.countdown.ticks = 0;

    assert!(set_config(config, &config_path).is_err());
    assert!(!config_path.exists());
}
