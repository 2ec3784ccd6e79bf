//! Config file discovery and layered loading.
//!
//! Resolution order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Explicit `--config` file, or `~/.config/courier/config.toml`
//! 3. `.env` in the working directory (only fills unset variables)
//! 4. Process environment
//! 5. CLI arguments (handled externally)

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::env::apply_env;
use crate::error::{ConfigError, Result};
use crate::types::BridgeConfig;

/// Default config filename within the config directory.
const USER_CONFIG_FILE: &str = "config.toml";

/// Application name for XDG directory resolution.
const APP_NAME: &str = "courier";

/// Environment variable overriding the config directory.
const CONFIG_DIR_ENV: &str = "COURIER_CONFIG_DIR";

/// Result of config discovery and loading.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The resolved configuration.
    pub config: BridgeConfig,
    /// Config file that was loaded, if any.
    pub source: Option<PathBuf>,
    /// `.env` file that was loaded, if any.
    pub dotenv: Option<PathBuf>,
    /// Environment variables that overrode file values.
    pub env_overrides: Vec<&'static str>,
}

/// Load configuration from all layers.
///
/// An explicit `path` must exist; the default user config is optional.
pub fn load_config(path: Option<&Path>) -> Result<LoadedConfig> {
    let dotenv = dotenvy::dotenv().ok();
    if let Some(ref p) = dotenv {
        debug!(path = %p.display(), "Loaded .env file");
    }

    let mut loaded = load_config_with_env(path, xdg_config_path(), |name| {
        std::env::var(name).ok()
    })?;
    loaded.dotenv = dotenv;
    Ok(loaded)
}

/// Load configuration with an explicit user config path and env lookup.
pub fn load_config_with_env<F>(
    path: Option<&Path>,
    user_config: Option<PathBuf>,
    lookup: F,
) -> Result<LoadedConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let (mut config, source) = match path {
        Some(p) => (load_config_file(p)?, Some(p.to_path_buf())),
        None => match user_config.filter(|p| p.is_file()) {
            Some(p) => (load_config_file(&p)?, Some(p)),
            None => (BridgeConfig::default(), None),
        },
    };

    if let Some(ref p) = source {
        debug!(path = %p.display(), "Loaded config file");
    }

    let env_overrides = apply_env(&mut config, lookup)?;
    config.validate()?;

    Ok(LoadedConfig {
        config,
        source,
        dotenv: None,
        env_overrides,
    })
}

/// Load a single config file.
pub fn load_config_file(path: &Path) -> Result<BridgeConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    BridgeConfig::from_toml(&contents)
}

/// Get the user config file path.
pub fn xdg_config_path() -> Option<PathBuf> {
    xdg_config_dir().map(|d| d.join(USER_CONFIG_FILE))
}

/// Get the config directory for courier.
///
/// Checks `COURIER_CONFIG_DIR` first, then falls back to the platform default
/// (`~/.config/courier` on Linux).
pub fn xdg_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|d| d.join(APP_NAME))
}
