//! WebSocket message handlers.

use super::connection::WsSession;
use super::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;
use courier_bridge::LiveSession;

/// Handle a client message, returning the frame to send back, if any.
///
/// Input is published correlated with the session's id; replies from the
/// workflow arrive later as `message` frames.
pub async fn handle_message(
    msg: ClientMessage,
    session: &WsSession,
    state: &AppState,
) -> Option<ServerMessage> {
    let result = match msg {
        ClientMessage::Ping => return Some(ServerMessage::Pong),
        ClientMessage::Chat { message } => state.publisher.send(message, session.id()).await,
        ClientMessage::Approve { message } => {
            state.publisher.send_approval(message, session.id()).await
        }
    };

    result
        .err()
        .map(|e| ServerMessage::error("send_failed", e.to_string()))
}
