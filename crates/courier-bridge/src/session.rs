//! Live session seams.
//!
//! The display layer owns session lifecycle. The bridge only looks sessions
//! up by id and hands them normalized messages; there is no ambient
//! "current session" to rebind.

use std::sync::Arc;

use async_trait::async_trait;
use courier_types::{CorrelationId, DisplayMessage};

use crate::error::Result;

/// A connected interactive session that can render messages.
#[async_trait]
pub trait LiveSession: Send + Sync {
    /// Correlation id this session is bound to.
    fn id(&self) -> &CorrelationId;

    /// Append a message to the session's view.
    ///
    /// Returns [`BridgeError::SessionClosed`](crate::BridgeError::SessionClosed)
    /// once the session can no longer accept output.
    async fn deliver(&self, message: DisplayMessage) -> Result<()>;
}

/// Shared handle to a live session.
pub type SessionHandle = Arc<dyn LiveSession>;

/// Lookup of live sessions by correlation id.
pub trait SessionResolver: Send + Sync {
    /// The session currently attached for `id`, if any.
    fn resolve(&self, id: &CorrelationId) -> Option<SessionHandle>;
}
