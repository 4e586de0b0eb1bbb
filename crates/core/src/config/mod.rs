//! Configuration for RepairMe
//!
//! This module provides a trait-based configuration system that supports:
//! - Type-safe config structs via serde
//! - TOML file format
//! - Auto-generation of default configs
//! - Manual reload capability
//!
//! # Example
//!
//! ```ignore
//! use repairme_core::{PluginConfig, RepairMeConfig};
//!
//! let config = RepairMeConfig::load().unwrap_or_default();
//! println!("Probing {}#{}", config.loading_addon_name, config.loading_addon_index);
//! ```

mod loader;

use std::path::Path;
use std::time::Duration;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::update_loop::{ClosePolicy, LoopSettings};

pub use loader::{
    configs_dir, host_base_dir, plugin_config_path, plugin_config_path_in, CONFIG_DIR_ENV,
};

/// Configuration system errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read or write config file
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML content
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize config to TOML
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// Could not determine config directory from plugin location
    #[error("Config directory not available - could not resolve plugin base path")]
    NoConfigDirectory,
}

/// Result type for config operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Trait for plugin configuration types.
///
/// Configs are stored at `configs/plugins/{PLUGIN_NAME}/{PLUGIN_NAME}.toml`.
/// The `*_from`/`*_to` variants take an explicit path and back the default
/// methods.
pub trait PluginConfig: Default + Serialize + DeserializeOwned + Send + Sync {
    /// The plugin name used for config file path resolution.
    const PLUGIN_NAME: &'static str;

    /// Load config from file, creating default if missing.
    fn load() -> ConfigResult<Self> {
        Self::load_from(&plugin_config_path(Self::PLUGIN_NAME)?)
    }

    /// Load config from `path`, creating default if missing.
    fn load_from(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            tracing::debug!("Loaded config for {} from {:?}", Self::PLUGIN_NAME, path);
            Ok(config)
        } else {
            let default = Self::default();
            default.save_to(path)?;
            tracing::info!(
                "Created default config for {} at {:?}",
                Self::PLUGIN_NAME,
                path
            );
            Ok(default)
        }
    }

    /// Save config to file.
    fn save(&self) -> ConfigResult<()> {
        self.save_to(&plugin_config_path(Self::PLUGIN_NAME)?)
    }

    /// Save config to `path`, creating parent directories if needed.
    fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        tracing::debug!("Saved config for {} to {:?}", Self::PLUGIN_NAME, path);
        Ok(())
    }

    /// Reload config from file.
    fn reload(&mut self) -> ConfigResult<()> {
        self.reload_from(&plugin_config_path(Self::PLUGIN_NAME)?)
    }

    /// Reload config from `path`, replacing self with its contents.
    fn reload_from(&mut self, path: &Path) -> ConfigResult<()> {
        let content = std::fs::read_to_string(path)?;
        *self = toml::from_str(&content)?;
        tracing::debug!("Reloaded config for {} from {:?}", Self::PLUGIN_NAME, path);
        Ok(())
    }
}

/// RepairMe plugin configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairMeConfig {
    /// Config version for future migration support
    pub version: u32,

    /// Enable debug logging
    pub debug: bool,

    /// Print a chat line for every equipment sample
    pub debug_chat: bool,

    /// Name of the loading screen UI object
    pub loading_addon_name: String,

    /// Index of the loading screen UI object
    pub loading_addon_index: u32,

    /// Pause after each sample in milliseconds (0 = none)
    pub sample_cooldown_ms: u64,

    /// Keep a signal that arrives while a sample is being taken
    pub preserve_signals_during_sample: bool,
}

impl Default for RepairMeConfig {
    fn default() -> Self {
        Self {
            version: 1,
            debug: false,
            debug_chat: false,
            loading_addon_name: "NowLoading".to_string(),
            loading_addon_index: 1,
            sample_cooldown_ms: 0,
            preserve_signals_during_sample: false,
        }
    }
}

impl PluginConfig for RepairMeConfig {
    const PLUGIN_NAME: &'static str = "repairme";
}

impl RepairMeConfig {
    /// Update loop settings derived from this config
    pub fn loop_settings(&self) -> LoopSettings {
        LoopSettings {
            cooldown: Duration::from_millis(self.sample_cooldown_ms),
            close_policy: if self.preserve_signals_during_sample {
                ClosePolicy::PreserveNewSignals
            } else {
                ClosePolicy::Unconditional
            },
            debug_chat: self.debug_chat,
        }
    }
}
