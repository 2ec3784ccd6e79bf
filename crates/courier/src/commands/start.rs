//! Start command - launches the bridge server.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Args;
use courier_config::BridgeConfig;
use courier_dapr::{DaprPublisher, WorkflowActorClient};
use courier_server::{AppState, Server, ServerConfig};
use tracing::{info, warn};

use super::{Context, dapr_client};

/// Arguments for the start command.
///
/// CLI arguments override config file and environment values.
#[derive(Args, Debug)]
pub struct StartArgs {
    /// Address to bind to (overrides config)
    #[arg(short, long)]
    pub bind: Option<SocketAddr>,

    /// Message published when a session starts; empty to disable (overrides config)
    #[arg(long)]
    pub greeting: Option<String>,
}

/// Run the start command.
pub async fn run(args: StartArgs, ctx: &Context) -> Result<()> {
    let loaded = ctx.load_config()?;
    if let Some(ref path) = loaded.source {
        info!(path = %path.display(), "Using config file");
    }
    if !loaded.env_overrides.is_empty() {
        info!(vars = ?loaded.env_overrides, "Applied environment overrides");
    }

    let config = loaded.config;
    let server_config = server_config(&config, &args)?;

    let client = dapr_client(&config)?;
    if let Err(e) = client.healthz().await {
        warn!(
            endpoint = %client.base_url(),
            error = %e,
            "Sidecar not reachable yet; publishing and updates will fail until it is"
        );
    }

    let transport = Arc::new(DaprPublisher::new(client.clone()));
    let source = Arc::new(
        WorkflowActorClient::new(client)
            .with_actor_type(config.actor_type.clone())
            .with_method(config.actor_method.clone()),
    );

    info!(
        bind = %server_config.bind_address,
        topic = %server_config.topic,
        actor_type = %config.actor_type,
        "Starting courier"
    );

    let state = AppState::new(server_config, transport, source);
    Server::from_state(state)
        .run()
        .await
        .context("Server stopped with an error")
}

/// Server settings from resolved config plus CLI overrides.
fn server_config(config: &BridgeConfig, args: &StartArgs) -> Result<ServerConfig> {
    let bind_address = match args.bind {
        Some(addr) => addr,
        None => config.bind_addr()?,
    };
    let greeting = args.greeting.clone().unwrap_or_else(|| config.greeting.clone());

    Ok(ServerConfig::new()
        .with_bind_address(bind_address)
        .with_topic(config.topic())
        .with_greeting(greeting)
        .with_actor_timeout(config.actor_timeout())
        .with_initial_cursor(config.initial_cursor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_server_config_from_bridge_config() {
        let config = BridgeConfig {
            topic_name: "chat".to_string(),
            actor_timeout_secs: 4,
            initial_cursor: 0,
            ..Default::default()
        };
        let args = StartArgs {
            bind: None,
            greeting: None,
        };

        let server = server_config(&config, &args).unwrap();
        assert_eq!(server.bind_address, "127.0.0.1:8000".parse().unwrap());
        assert_eq!(server.topic.to_string(), "ui/chat");
        assert_eq!(server.greeting, "Hello");
        assert_eq!(server.actor_timeout, Duration::from_secs(4));
        assert_eq!(server.initial_cursor, 0);
    }

    #[test]
    fn test_cli_overrides_win() {
        let args = StartArgs {
            bind: Some("0.0.0.0:9000".parse().unwrap()),
            greeting: Some(String::new()),
        };

        let server = server_config(&BridgeConfig::default(), &args).unwrap();
        assert_eq!(server.bind_address.port(), 9000);
        assert!(server.greeting.is_empty());
    }
}
