//! WebSocket protocol types for client-server communication.

use courier_types::{CorrelationId, DisplayMessage};
use serde::{Deserialize, Serialize};

/// Messages from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// User input for the workflow.
    Chat {
        /// The message content.
        message: String,
    },
    /// Reply to an approval request.
    Approve {
        /// The approver's reply.
        message: String,
    },
    /// Ping to keep connection alive.
    Ping,
}

/// Messages from server to client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Session created; input and updates are correlated by this id.
    SessionCreated {
        /// The session ID.
        session_id: String,
    },
    /// A conversation turn to display.
    Message {
        session_id: String,
        author: String,
        content: String,
    },
    /// Error message.
    Error {
        /// Error code.
        code: String,
        /// Error message.
        message: String,
    },
    /// Pong response.
    Pong,
}

impl ServerMessage {
    /// Create an error message.
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn session_created(id: &CorrelationId) -> Self {
        Self::SessionCreated {
            session_id: id.to_string(),
        }
    }

    /// Frame carrying a delivered turn.
    pub fn message(id: &CorrelationId, message: DisplayMessage) -> Self {
        Self::Message {
            session_id: id.to_string(),
            author: message.author,
            content: message.content,
        }
    }
}
