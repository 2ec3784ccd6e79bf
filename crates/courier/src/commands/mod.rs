//! CLI command handlers.

pub mod config;
pub mod send;
pub mod start;
pub mod status;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use courier_config::{BridgeConfig, LoadedConfig};
use courier_dapr::DaprClient;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Explicit config file, if one was given.
    pub config_path: Option<PathBuf>,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Resolve configuration from all layers.
    pub fn load_config(&self) -> Result<LoadedConfig> {
        courier_config::load_config(self.config_path.as_deref())
            .context("Failed to load configuration")
    }
}

/// Sidecar client for the resolved configuration.
pub fn dapr_client(config: &BridgeConfig) -> Result<DaprClient> {
    let mut builder = DaprClient::builder()
        .base_url(&config.dapr_http_endpoint)
        .timeout(config.publish_timeout());
    if let Some(ref token) = config.dapr_api_token {
        builder = builder.api_token(token);
    }
    builder
        .build()
        .with_context(|| format!("Invalid sidecar endpoint {}", config.dapr_http_endpoint))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dapr_client_uses_endpoint() {
        let config = BridgeConfig {
            dapr_http_endpoint: "http://sidecar:3600".to_string(),
            dapr_api_token: Some("secret".to_string()),
            ..Default::default()
        };
        let client = dapr_client(&config).unwrap();
        assert_eq!(client.base_url().as_str(), "http://sidecar:3600/");
    }

    #[test]
    fn test_dapr_client_rejects_bad_endpoint() {
        let config = BridgeConfig {
            dapr_http_endpoint: "not a url".to_string(),
            ..Default::default()
        };
        assert!(dapr_client(&config).is_err());
    }
}
