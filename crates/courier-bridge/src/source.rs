//! Conversation fetch from the durable actor.

use std::time::Duration;

use async_trait::async_trait;
use courier_types::{ConversationSnapshot, CorrelationId};
use tracing::debug;

use crate::error::{BridgeError, Result};

/// Read access to the authoritative conversation record.
#[async_trait]
pub trait ConversationSource: Send + Sync {
    /// Fetch the full conversation for `id`.
    async fn get_conversation(&self, id: &CorrelationId) -> Result<ConversationSnapshot>;
}

/// Fetch a snapshot, bounding the round trip by `timeout`.
///
/// Every failure, including the timeout, is reported as
/// [`BridgeError::ActorUnavailable`]. There is no caching; each call is a
/// full refetch.
pub async fn fetch_conversation(
    source: &dyn ConversationSource,
    session_id: &CorrelationId,
    timeout: Duration,
) -> Result<ConversationSnapshot> {
    debug!(session_id = %session_id, "Fetching conversation from actor");

    match tokio::time::timeout(timeout, source.get_conversation(session_id)).await {
        Ok(Ok(snapshot)) => {
            debug!(session_id = %session_id, turns = snapshot.len(), "Conversation fetched");
            Ok(snapshot)
        }
        Ok(Err(e @ BridgeError::ActorUnavailable { .. })) => Err(e),
        Ok(Err(e)) => Err(BridgeError::ActorUnavailable {
            session_id: session_id.clone(),
            reason: e.to_string(),
        }),
        Err(_) => Err(BridgeError::ActorUnavailable {
            session_id: session_id.clone(),
            reason: format!("timed out after {}ms", timeout.as_millis()),
        }),
    }
}
