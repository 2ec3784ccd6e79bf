//! WebSocket live sessions.
//!
//! Each connection is one live session with a freshly generated correlation
//! id. Client frames become input events on the bus; conversation updates
//! for the session arrive through [`LiveSession::deliver`] and are written
//! back as `message` frames.
//!
//! - `protocol` - Frame types (ClientMessage, ServerMessage)
//! - `connection` - Connection lifecycle and the session sink
//! - `handlers` - Client frame processing
//!
//! [`LiveSession::deliver`]: courier_bridge::LiveSession::deliver

mod connection;
mod handlers;
mod protocol;

use axum::{
    extract::{State, ws::WebSocketUpgrade},
    response::Response,
};

use crate::state::AppState;

pub use connection::WsSession;
pub use protocol::{ClientMessage, ServerMessage};

/// GET /ws - WebSocket upgrade handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let max_size = state.config().max_ws_message_size;
    ws.max_message_size(max_size)
        .on_upgrade(|socket| connection::handle_socket(socket, state))
}
