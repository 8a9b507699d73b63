//! Configuration management for Cheese
//!
//! Provides persistent settings storage with schema versioning and migrations.
//! Configuration is stored in `~/.cheese/config.json`.

use crate::gesture::MissingPointPolicy;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Current config schema version
const CURRENT_VERSION: u32 = 1;

/// Global config instance for caching
static CONFIG: OnceLock<RwLock<Config>> = OnceLock::new();

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Schema version for migrations
    pub version: u32,
    /// Gesture detection settings
    pub detection: DetectionConfig,
    /// Trigger debounce settings
    pub trigger: TriggerConfig,
    /// Countdown settings
    pub countdown: CountdownConfig,
    /// Video source settings
    pub camera: CameraConfig,
    /// Download and gallery settings
    pub storage: StorageConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            detection: DetectionConfig::default(),
            trigger: TriggerConfig::default(),
            countdown: CountdownConfig::default(),
            camera: CameraConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Config {
    /// Checks that the values can drive a session
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.detection.min_confidence) {
            return Err(format!(
                "min_confidence must be between 0 and 1, got {}",
                self.detection.min_confidence
            ));
        }
        if self.countdown.ticks == 0 {
            return Err("Countdown must have at least one tick".to_string());
        }
        if self.countdown.tick_interval_ms == 0 {
            return Err("Countdown tick interval must be greater than 0".to_string());
        }
        let countdown_ms =
            u64::from(self.countdown.ticks).saturating_mul(self.countdown.tick_interval_ms);
        if self.trigger.cooldown_ms <= countdown_ms {
            return Err(format!(
                "cooldown_ms ({}) must be longer than the countdown ({} ms)",
                self.trigger.cooldown_ms, countdown_ms
            ));
        }
        if self.storage.gallery_key.is_empty() {
            return Err("Gallery key must not be empty".to_string());
        }
        Ok(())
    }
}

/// Gesture detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Pose keypoints must score strictly above this to count
    pub min_confidence: f32,
    /// How the peace sign treats unreported ring/pinky tips
    pub missing_point_policy: MissingPointPolicy,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
            missing_point_policy: MissingPointPolicy::default(),
        }
    }
}

/// Trigger debounce configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    /// Time after an accepted gesture during which gestures are ignored
    pub cooldown_ms: u64,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self { cooldown_ms: 5000 }
    }
}

/// Countdown configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CountdownConfig {
    /// Number of countdown ticks shown before capture
    pub ticks: u32,
    /// Time between ticks in milliseconds
    pub tick_interval_ms: u64,
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            ticks: 3,
            tick_interval_ms: 1000,
        }
    }
}

/// Video source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Preferred frame width in pixels
    pub width: u32,
    /// Preferred frame height in pixels
    pub height: u32,
    /// Mirror captured selfies to match the preview
    pub mirror: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            mirror: true,
        }
    }
}

/// Download and gallery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Key the gallery list is stored under
    pub gallery_key: String,
    /// Where downloaded selfies go (None for the user's downloads folder)
    pub download_dir: Option<PathBuf>,
    /// Filename prefix for downloaded selfies
    pub file_prefix: String,
    /// Keep the gallery across runs
    pub persist_gallery: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            gallery_key: "selfies".to_string(),
            download_dir: None,
            file_prefix: "selfie".to_string(),
            persist_gallery: true,
        }
    }
}

/// Get the path to the Cheese data directory (~/.cheese)
pub fn get_data_dir() -> PathBuf {
    home_dir_or_fallback().join(".cheese")
}

/// Get the path to the config file (~/.cheese/config.json)
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("config.json")
}

/// Get the home directory, falling back to /tmp if unavailable
fn home_dir_or_fallback() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| {
        tracing::error!("Could not determine home directory, using /tmp");
        PathBuf::from("/tmp")
    })
}

/// Load configuration from a file, using defaults if it does not exist
pub fn load_from_path(path: &Path) -> Result<Config, String> {
    if !path.exists() {
        tracing::info!("Config file not found at {:?}, using defaults", path);
        return Ok(Config::default());
    }

    let contents =
        fs::read_to_string(path).map_err(|e| format!("Failed to read config file: {}", e))?;

    let config: Config =
        serde_json::from_str(&contents).map_err(|e| format!("Failed to parse config: {}", e))?;

    let original_version = config.version;
    let migrated = migrate_config(config)?;

    if migrated.version != original_version {
        // Save the migrated config
        save_to_path(&migrated, path)?;
    }

    migrated.validate()?;
    Ok(migrated)
}

/// Save configuration to a file, creating parent directories as needed
pub fn save_to_path(config: &Config, path: &Path) -> Result<(), String> {
    if let Some(dir) = path.parent() {
        if !dir.exists() {
            fs::create_dir_all(dir)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }
    }

    let contents = serde_json::to_string_pretty(config)
        .map_err(|e| format!("Failed to serialise config: {}", e))?;

    fs::write(path, contents).map_err(|e| format!("Failed to write config file: {}", e))?;

    tracing::info!("Config saved to {:?}", path);
    Ok(())
}

/// Migrate configuration from older schema versions
fn migrate_config(mut config: Config) -> Result<Config, String> {
    let original_version = config.version;

    // Apply migrations sequentially
    while config.version < CURRENT_VERSION {
        config = apply_migration(config)?;
    }

    if config.version > CURRENT_VERSION {
        return Err(format!("Unknown config version: {}", config.version));
    }

    if config.version != original_version {
        tracing::info!(
            "Migrated config from version {} to {}",
            original_version,
            config.version
        );
    }

    Ok(config)
}

/// Apply a single migration step
fn apply_migration(config: Config) -> Result<Config, String> {
    match config.version {
        // Version 0 -> 1: Initial migration
        0 => {
            let mut migrated = config;
            migrated.version = 1;
            Ok(migrated)
        }
        v => Err(format!("Unknown config version: {}", v)),
    }
}

/// Get the global config instance
fn get_config_instance() -> &'static RwLock<Config> {
    CONFIG.get_or_init(|| {
        let config = load_from_path(&get_config_path()).unwrap_or_else(|e| {
            tracing::error!("Failed to load config, using defaults: {}", e);
            Config::default()
        });
        RwLock::new(config)
    })
}

/// Install an explicit configuration as the cached config
///
/// Only the first call before any `get_config` has an effect. Returns false
/// if the cache was already initialised.
pub fn install_config(config: Config) -> bool {
    CONFIG.set(RwLock::new(config)).is_ok()
}

/// Get the current configuration
///
/// The config is cached in memory and loaded from disk on first access.
pub fn get_config() -> Config {
    get_config_instance().read().clone()
}

/// Replace the cached configuration
///
/// Fills an empty cache directly rather than loading the default file first.
fn replace_cached(config: Config) {
    if !install_config(config.clone()) {
        *get_config_instance().write() = config;
    }
}

/// Update the configuration
///
/// Validates the configuration, persists it to `path` and makes it the
/// cached config. The version field is automatically updated to the current
/// schema.
pub fn set_config(mut config: Config, path: &Path) -> Result<(), String> {
    config.version = CURRENT_VERSION;
    config.validate()?;

    save_to_path(&config, path)?;

    tracing::info!(
        "Configuration updated (cooldown: {} ms, ticks: {})",
        config.trigger.cooldown_ms,
        config.countdown.ticks
    );
    replace_cached(config);
    Ok(())
}

/// Reset configuration to defaults
///
/// Writes the default settings to `path` and makes them the cached config.
pub fn reset_config(path: &Path) -> Result<Config, String> {
    let default_config = Config::default();
    set_config(default_config.clone(), path)?;

    tracing::info!("Configuration at {:?} reset to defaults", path);
    Ok(default_config)
}
