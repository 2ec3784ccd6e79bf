//! Configuration system for the Courier session bridge.
//!
//! Layers, later overriding earlier:
//! 1. Built-in defaults
//! 2. TOML file (`--config` path, or `~/.config/courier/config.toml`)
//! 3. `.env` in the working directory
//! 4. Process environment (`PUBSUB_NAME`, `TOPIC_NAME`, `DAPR_HTTP_PORT`, ...)
//!
//! CLI flags are applied on top by the binary.

pub mod discovery;
pub mod env;
pub mod error;
pub mod types;

pub use discovery::{
    LoadedConfig, load_config, load_config_file, load_config_with_env, xdg_config_dir,
    xdg_config_path,
};
pub use env::apply_env;
pub use error::{ConfigError, Result};
pub use types::*;
