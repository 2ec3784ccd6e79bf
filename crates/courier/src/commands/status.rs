//! Status command - checks the sidecar and a running bridge.

use std::time::Duration;

use anyhow::Result;
use clap::Args;

use super::{Context, dapr_client};

/// Arguments for the status command.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Bridge URL (default: http://<bind_address>)
    #[arg(long)]
    pub url: Option<String>,
}

/// Run the status command.
pub async fn run(args: StatusArgs, ctx: &Context) -> Result<()> {
    let config = ctx.load_config()?.config;

    let client = dapr_client(&config)?;
    let sidecar = client.healthz().await;

    let bridge_url = args
        .url
        .unwrap_or_else(|| format!("http://{}", config.bind_address));
    let bridge = check_bridge(&bridge_url).await;

    if ctx.json_output {
        println!(
            "{}",
            serde_json::json!({
                "sidecar": {
                    "endpoint": client.base_url().as_str(),
                    "healthy": sidecar.is_ok(),
                    "error": sidecar.as_ref().err().map(|e| e.to_string()),
                },
                "bridge": {
                    "url": bridge_url,
                    "healthy": bridge.is_ok(),
                    "version": bridge.as_ref().ok(),
                    "error": bridge.as_ref().err().map(|e| e.to_string()),
                },
            })
        );
        return Ok(());
    }

    match &sidecar {
        Ok(()) => println!("Sidecar  {}  ok", client.base_url()),
        Err(e) => println!("Sidecar  {}  unreachable ({})", client.base_url(), e),
    }
    match &bridge {
        Ok(version) => println!("Bridge   {}  ok (v{})", bridge_url, version),
        Err(e) => println!("Bridge   {}  unreachable ({})", bridge_url, e),
    }

    if ctx.verbose {
        println!();
        println!("pubsub: {}", config.topic());
        println!("actor:  {}.{}", config.actor_type, config.actor_method);
    }

    Ok(())
}

/// Fetch the bridge's version from its health endpoint.
async fn check_bridge(url: &str) -> Result<String> {
    let body: serde_json::Value = reqwest::Client::new()
        .get(format!("{}/health", url.trim_end_matches('/')))
        .timeout(Duration::from_secs(5))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(body["version"].as_str().unwrap_or("unknown").to_string())
}
