//! Error types for bridge operations.

use courier_types::CorrelationId;

/// Error type for bridge operations.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Inbound payload is missing the correlation id.
    #[error("Malformed notification: {0}")]
    MalformedNotification(String),

    /// No live session is attached for the id.
    #[error("Session not found: {0}")]
    SessionNotFound(CorrelationId),

    /// Fetching the conversation from the actor failed or timed out.
    #[error("Actor unavailable for {session_id}: {reason}")]
    ActorUnavailable {
        session_id: CorrelationId,
        reason: String,
    },

    /// A turn carries no displayable text block.
    #[error("Turn has no text content")]
    NoTextContent,

    /// Publishing to the bus failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The live session went away while turns were being delivered.
    #[error("Session closed: {0}")]
    SessionClosed(CorrelationId),
}

impl BridgeError {
    /// Short machine-readable code, used in logs and client error frames.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedNotification(_) => "malformed_notification",
            Self::SessionNotFound(_) => "session_not_found",
            Self::ActorUnavailable { .. } => "actor_unavailable",
            Self::NoTextContent => "no_text_content",
            Self::Transport(_) => "transport_error",
            Self::SessionClosed(_) => "session_closed",
        }
    }

    /// Whether this failure is part of normal session churn rather than a
    /// fault worth alerting on.
    pub fn is_expected(&self) -> bool {
        matches!(self, Self::SessionNotFound(_) | Self::SessionClosed(_))
    }
}

/// Result type for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;
