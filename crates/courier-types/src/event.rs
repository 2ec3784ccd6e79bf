//! Outbound event envelope.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::CorrelationId;

/// Content type attached to every published envelope.
pub const CONTENT_TYPE: &str = "application/json";

/// Metadata key brokers use to pick a partition (and thus an ordering domain).
pub const PARTITION_KEY: &str = "partitionKey";

/// Discriminator carried in the envelope's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// Free-text user input.
    Input,
    /// A reply to an approval request raised by the workflow.
    Approval,
}

impl EventType {
    /// Wire name of the discriminator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Approval => "approval",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Envelope published once per user message.
///
/// Serializes as `{"input": ..., "id": ..., "type": ...}`. Fields are
/// private; an envelope does not change after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEvent {
    input: String,
    id: CorrelationId,
    #[serde(rename = "type")]
    event_type: EventType,
}

impl InputEvent {
    /// Build an envelope of an arbitrary type.
    pub fn new(input: impl Into<String>, id: CorrelationId, event_type: EventType) -> Self {
        Self {
            input: input.into(),
            id,
            event_type,
        }
    }

    /// Build a `type = "input"` envelope.
    pub fn input(input: impl Into<String>, id: CorrelationId) -> Self {
        Self::new(input, id, EventType::Input)
    }

    /// Build a `type = "approval"` envelope.
    pub fn approval(input: impl Into<String>, id: CorrelationId) -> Self {
        Self::new(input, id, EventType::Approval)
    }

    pub fn message(&self) -> &str {
        &self.input
    }

    pub fn id(&self) -> &CorrelationId {
        &self.id
    }

    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    /// Routing metadata for the transport, keyed on the correlation id so
    /// partitioned brokers keep one conversation in one ordering domain.
    pub fn metadata(&self) -> BTreeMap<String, String> {
        BTreeMap::from([(PARTITION_KEY.to_string(), self.id.to_string())])
    }

    /// Serialize the envelope body.
    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

/// A pub/sub component and topic pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Topic {
    /// Name of the pub/sub component.
    pub pubsub_name: String,
    /// Topic within the component.
    pub topic_name: String,
}

impl Topic {
    pub fn new(pubsub_name: impl Into<String>, topic_name: impl Into<String>) -> Self {
        Self {
            pubsub_name: pubsub_name.into(),
            topic_name: topic_name.into(),
        }
    }
}

impl Default for Topic {
    fn default() -> Self {
        Self::new("ui", "events")
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.pubsub_name, self.topic_name)
    }
}
