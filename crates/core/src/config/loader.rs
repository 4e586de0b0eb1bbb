//! Config path resolution
//!
//! Config files live in a `configs/` directory. The directory comes from the
//! `REPAIRME_CONFIG_DIR` environment variable when set. Otherwise it sits next
//! to the host executable that loaded the plugin, since a shared library has
//! no portable way to ask for its own path:
//!
//! ```text
//! <game dir>/game.exe
//! <game dir>/configs/plugins/repairme/repairme.toml
//! ```
//!
//! Hosts that keep plugins elsewhere point `REPAIRME_CONFIG_DIR` at them.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::{ConfigError, ConfigResult};

/// Environment variable overriding the configs directory
pub const CONFIG_DIR_ENV: &str = "REPAIRME_CONFIG_DIR";

/// Returns the directory containing the running executable.
///
/// Inside a loaded plugin this is the host's directory, not the plugin's.
pub fn host_base_dir() -> ConfigResult<PathBuf> {
    let exe = std::env::current_exe().map_err(ConfigError::IoError)?;
    exe.parent()
        .map(PathBuf::from)
        .ok_or(ConfigError::NoConfigDirectory)
}

/// Returns the base configs directory.
pub fn configs_dir() -> ConfigResult<PathBuf> {
    let override_dir = std::env::var_os(CONFIG_DIR_ENV).filter(|dir| !dir.is_empty());
    let host_dir = match override_dir {
        Some(_) => PathBuf::new(),
        None => host_base_dir()?,
    };
    Ok(resolve_configs_dir(override_dir, &host_dir))
}

/// An empty override counts as unset.
fn resolve_configs_dir(override_dir: Option<OsString>, host_dir: &Path) -> PathBuf {
    match override_dir {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => host_dir.join("configs"),
    }
}

/// Returns the path for a plugin's config file below `configs`.
///
/// Path: `{configs}/plugins/{plugin_name}/{plugin_name}.toml`
pub fn plugin_config_path_in(configs: &Path, plugin_name: &str) -> PathBuf {
    configs
        .join("plugins")
        .join(plugin_name)
        .join(format!("{}.toml", plugin_name))
}

/// Returns the path for a plugin's config file.
pub fn plugin_config_path(plugin_name: &str) -> ConfigResult<PathBuf> {
    Ok(plugin_config_path_in(&configs_dir()?, plugin_name))
}
