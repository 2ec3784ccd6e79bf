//! Conversation reads from the workflow actor.

use async_trait::async_trait;
use courier_bridge::{BridgeError, ConversationSource};
use courier_types::{ConversationSnapshot, CorrelationId};

use crate::client::DaprClient;

/// Actor type hosting durable conversations.
pub const DEFAULT_ACTOR_TYPE: &str = "WorkflowActor";

/// Actor method returning the full conversation.
pub const DEFAULT_CONVERSATION_METHOD: &str = "get_conversation";

/// [`ConversationSource`] that invokes the workflow actor through the
/// sidecar.
///
/// Stateless: the actor is addressed by correlation id on every call, so
/// there is no per-session proxy to create or cache.
#[derive(Debug, Clone)]
pub struct WorkflowActorClient {
    client: DaprClient,
    actor_type: String,
    method: String,
}

impl WorkflowActorClient {
    pub fn new(client: DaprClient) -> Self {
        Self {
            client,
            actor_type: DEFAULT_ACTOR_TYPE.to_string(),
            method: DEFAULT_CONVERSATION_METHOD.to_string(),
        }
    }

    /// Override the actor type.
    pub fn with_actor_type(mut self, actor_type: impl Into<String>) -> Self {
        self.actor_type = actor_type.into();
        self
    }

    /// Override the method that returns the conversation.
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn actor_type(&self) -> &str {
        &self.actor_type
    }
}

#[async_trait]
impl ConversationSource for WorkflowActorClient {
    async fn get_conversation(
        &self,
        id: &CorrelationId,
    ) -> courier_bridge::Result<ConversationSnapshot> {
        self.client
            .invoke_actor(&self.actor_type, id.as_str(), &self.method, None)
            .await
            .map_err(|e| BridgeError::ActorUnavailable {
                session_id: id.clone(),
                reason: if e.is_timeout() {
                    format!("{} call timed out", self.method)
                } else {
                    e.to_string()
                },
            })
    }
}
