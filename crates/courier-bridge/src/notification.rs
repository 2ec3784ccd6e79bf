//! Inbound update notifications.

use courier_types::CorrelationId;
use serde_json::Value;

use crate::error::{BridgeError, Result};

/// A bus message announcing that a conversation has new turns.
///
/// Only the correlation id under `data.id` is read. `data` may be an
/// object, or a string holding JSON when the publisher pre-serialized it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateNotification {
    session_id: CorrelationId,
}

impl UpdateNotification {
    pub fn new(session_id: CorrelationId) -> Self {
        Self { session_id }
    }

    /// Extract the notification from a delivered event payload.
    pub fn from_payload(payload: &Value) -> Result<Self> {
        let data = payload
            .get("data")
            .ok_or_else(|| BridgeError::MalformedNotification("missing `data`".to_string()))?;

        let decoded;
        let data = match data {
            Value::String(raw) => {
                decoded = serde_json::from_str::<Value>(raw).map_err(|e| {
                    BridgeError::MalformedNotification(format!("`data` is not valid JSON: {e}"))
                })?;
                &decoded
            }
            other => other,
        };

        let id = data
            .get("id")
            .and_then(Value::as_str)
            .map(CorrelationId::from)
            .ok_or_else(|| BridgeError::MalformedNotification("missing `data.id`".to_string()))?;

        if id.is_empty() {
            return Err(BridgeError::MalformedNotification(
                "empty `data.id`".to_string(),
            ));
        }

        Ok(Self::new(id))
    }

    pub fn session_id(&self) -> &CorrelationId {
        &self.session_id
    }
}
