//! Send command - publishes one input event for a session.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Args;
use courier_bridge::OutboundPublisher;
use courier_dapr::DaprPublisher;
use courier_types::CorrelationId;

use super::{Context, dapr_client};

/// Arguments for the send command.
#[derive(Args, Debug)]
pub struct SendArgs {
    /// Correlation id of the session
    pub session: String,

    /// Message text
    pub message: String,

    /// Publish as an approval reply instead of input
    #[arg(long)]
    pub approval: bool,
}

/// Run the send command.
pub async fn run(args: SendArgs, ctx: &Context) -> Result<()> {
    let id = CorrelationId::new(args.session);
    anyhow::ensure!(!id.is_empty(), "Session id must not be empty");

    let config = ctx.load_config()?.config;
    let client = dapr_client(&config)?;
    let publisher = OutboundPublisher::new(Arc::new(DaprPublisher::new(client)), config.topic());

    let published = if args.approval {
        publisher.send_approval(args.message, &id).await
    } else {
        publisher.send(args.message, &id).await
    };
    published.with_context(|| format!("Failed to publish to {}", publisher.topic()))?;

    if ctx.json_output {
        println!(
            "{}",
            serde_json::json!({
                "published": true,
                "session_id": id.as_str(),
                "topic": publisher.topic().to_string(),
            })
        );
    } else {
        println!("Published to {} for session {}", publisher.topic(), id);
    }

    Ok(())
}
