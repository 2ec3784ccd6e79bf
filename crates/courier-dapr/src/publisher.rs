//! Pub/sub publishing through the sidecar.

use async_trait::async_trait;
use courier_bridge::{BridgeError, EventPublisher};
use courier_types::{CONTENT_TYPE, InputEvent, Topic};
use tracing::trace;

use crate::client::DaprClient;

/// [`EventPublisher`] backed by the sidecar's publish API.
#[derive(Debug, Clone)]
pub struct DaprPublisher {
    client: DaprClient,
}

impl DaprPublisher {
    pub fn new(client: DaprClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EventPublisher for DaprPublisher {
    async fn publish(&self, topic: &Topic, event: &InputEvent) -> courier_bridge::Result<()> {
        let body = event
            .to_json()
            .map_err(|e| BridgeError::Transport(format!("Failed to encode event: {e}")))?;

        self.client
            .publish_event(
                &topic.pubsub_name,
                &topic.topic_name,
                body,
                CONTENT_TYPE,
                &event.metadata(),
            )
            .await
            .map_err(|e| BridgeError::Transport(e.to_string()))?;

        trace!(session_id = %event.id(), topic = %topic, "Event published");
        Ok(())
    }
}
