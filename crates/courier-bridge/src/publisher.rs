//! Outbound publishing of user input.

use std::sync::Arc;

use async_trait::async_trait;
use courier_types::{CorrelationId, InputEvent, Topic};
use tracing::{debug, warn};

use crate::error::Result;

/// Transport that puts an envelope on the bus.
///
/// Implementations publish the envelope as `application/json` with
/// [`InputEvent::metadata`] as routing metadata, and report failures as
/// [`BridgeError::Transport`](crate::BridgeError::Transport). Retrying is
/// the transport's own business.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, topic: &Topic, event: &InputEvent) -> Result<()>;
}

/// Publishes user input for the workflow engine, correlated by session id.
///
/// Holds no per-session state; each call is exactly one publish.
#[derive(Clone)]
pub struct OutboundPublisher {
    transport: Arc<dyn EventPublisher>,
    topic: Topic,
}

impl OutboundPublisher {
    pub fn new(transport: Arc<dyn EventPublisher>, topic: Topic) -> Self {
        Self { transport, topic }
    }

    /// Topic every envelope is published to.
    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    /// Publish a user message as a `type = "input"` envelope.
    pub async fn send(&self, message: impl Into<String>, id: &CorrelationId) -> Result<()> {
        self.publish(InputEvent::input(message, id.clone())).await
    }

    /// Publish an approval reply as a `type = "approval"` envelope.
    pub async fn send_approval(&self, message: impl Into<String>, id: &CorrelationId) -> Result<()> {
        self.publish(InputEvent::approval(message, id.clone())).await
    }

    /// Publish a pre-built envelope.
    pub async fn publish(&self, event: InputEvent) -> Result<()> {
        debug!(
            session_id = %event.id(),
            topic = %self.topic,
            event_type = %event.event_type(),
            "Publishing input event"
        );

        self.transport
            .publish(&self.topic, &event)
            .await
            .inspect_err(|e| {
                warn!(session_id = %event.id(), topic = %self.topic, error = %e, "Publish failed");
            })
    }
}

impl std::fmt::Debug for OutboundPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutboundPublisher")
            .field("topic", &self.topic)
            .finish_non_exhaustive()
    }
}
