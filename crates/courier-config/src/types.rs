//! Configuration types mapping to the TOML schema.
//!
//! ```toml
//! pubsub_name = "ui"
//! topic_name = "events"
//! dapr_http_endpoint = "http://127.0.0.1:3500"
//! actor_type = "WorkflowActor"
//! actor_timeout_secs = 10
//! greeting = "Hello"
//! bind_address = "127.0.0.1:8000"
//! ```

use std::net::SocketAddr;
use std::time::Duration;

use courier_types::Topic;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Default pub/sub component name.
pub const DEFAULT_PUBSUB_NAME: &str = "ui";

/// Default topic for input events.
pub const DEFAULT_TOPIC_NAME: &str = "events";

/// Default sidecar HTTP endpoint.
pub const DEFAULT_DAPR_HTTP_ENDPOINT: &str = "http://127.0.0.1:3500";

/// Default actor type hosting conversations.
pub const DEFAULT_ACTOR_TYPE: &str = "WorkflowActor";

/// Default actor method returning the conversation.
pub const DEFAULT_ACTOR_METHOD: &str = "get_conversation";

/// Message published when a live session starts.
pub const DEFAULT_GREETING: &str = "Hello";

/// Default listen address for the bridge server.
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8000";

/// Root configuration structure.
///
/// Every field has a default, so an empty file (or no file) is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Pub/sub component that carries input events and notifications.
    pub pubsub_name: String,

    /// Topic input events are published to and notifications arrive on.
    pub topic_name: String,

    /// Base URL of the sidecar HTTP API.
    pub dapr_http_endpoint: String,

    /// Token sent as `dapr-api-token`, if the sidecar requires one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dapr_api_token: Option<String>,

    /// Actor type hosting the durable conversations.
    pub actor_type: String,

    /// Actor method returning the full conversation.
    pub actor_method: String,

    /// Upper bound on one conversation fetch.
    pub actor_timeout_secs: u64,

    /// Upper bound on one sidecar publish.
    pub publish_timeout_secs: u64,

    /// First message published for every new live session.
    pub greeting: String,

    /// Address the bridge server listens on.
    pub bind_address: String,

    /// Turns considered already shown when a session's cursor is created.
    pub initial_cursor: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            pubsub_name: DEFAULT_PUBSUB_NAME.to_string(),
            topic_name: DEFAULT_TOPIC_NAME.to_string(),
            dapr_http_endpoint: DEFAULT_DAPR_HTTP_ENDPOINT.to_string(),
            dapr_api_token: None,
            actor_type: DEFAULT_ACTOR_TYPE.to_string(),
            actor_method: DEFAULT_ACTOR_METHOD.to_string(),
            actor_timeout_secs: 10,
            publish_timeout_secs: 30,
            greeting: DEFAULT_GREETING.to_string(),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            initial_cursor: 1,
        }
    }
}

impl BridgeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Where input events go and notifications come from.
    pub fn topic(&self) -> Topic {
        Topic::new(self.pubsub_name.clone(), self.topic_name.clone())
    }

    pub fn actor_timeout(&self) -> Duration {
        Duration::from_secs(self.actor_timeout_secs)
    }

    pub fn publish_timeout(&self) -> Duration {
        Duration::from_secs(self.publish_timeout_secs)
    }

    /// Parse the bind address.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.bind_address.parse().map_err(|e| ConfigError::Invalid {
            field: "bind_address".to_string(),
            reason: format!("'{}': {}", self.bind_address, e),
        })
    }

    /// Reject settings that would make the bridge unusable.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("pubsub_name", &self.pubsub_name),
            ("topic_name", &self.topic_name),
            ("actor_type", &self.actor_type),
            ("actor_method", &self.actor_method),
            ("dapr_http_endpoint", &self.dapr_http_endpoint),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field: field.to_string(),
                    reason: "must not be empty".to_string(),
                });
            }
        }

        for (field, secs) in [
            ("actor_timeout_secs", self.actor_timeout_secs),
            ("publish_timeout_secs", self.publish_timeout_secs),
        ] {
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    field: field.to_string(),
                    reason: "must be greater than zero".to_string(),
                });
            }
        }

        self.bind_addr()?;
        Ok(())
    }
}
