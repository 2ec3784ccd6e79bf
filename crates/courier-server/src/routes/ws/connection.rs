//! WebSocket connection lifecycle and the live session sink.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use courier_bridge::{BridgeError, LiveSession};
use courier_types::{CorrelationId, DisplayMessage};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use super::handlers::handle_message;
use super::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;

/// Frames buffered for a slow client before delivery waits.
const OUTBOUND_BUFFER: usize = 64;

/// How long queued frames may take to flush once the client is gone.
const FLUSH_TIMEOUT: Duration = Duration::from_secs(1);

/// The session sink for one WebSocket connection.
///
/// Frames go through a channel to the connection's writer task, so
/// deliveries from notification handlers never touch the socket directly.
#[derive(Debug)]
pub struct WsSession {
    id: CorrelationId,
    outbound: mpsc::Sender<ServerMessage>,
}

impl WsSession {
    fn new(id: CorrelationId, outbound: mpsc::Sender<ServerMessage>) -> Self {
        Self { id, outbound }
    }

    /// Queue a frame for the client.
    pub async fn send(&self, msg: ServerMessage) -> courier_bridge::Result<()> {
        self.outbound
            .send(msg)
            .await
            .map_err(|_| BridgeError::SessionClosed(self.id.clone()))
    }
}

#[async_trait]
impl LiveSession for WsSession {
    fn id(&self) -> &CorrelationId {
        &self.id
    }

    async fn deliver(&self, message: DisplayMessage) -> courier_bridge::Result<()> {
        self.send(ServerMessage::message(&self.id, message)).await
    }
}

/// Handle a WebSocket connection.
pub async fn handle_socket(socket: WebSocket, state: AppState) {
    let (sender, mut receiver) = socket.split();
    let (tx, rx) = mpsc::channel(OUTBOUND_BUFFER);
    let mut writer = tokio::spawn(write_frames(sender, rx));

    let session = Arc::new(WsSession::new(CorrelationId::generate(), tx));
    let id = session.id().clone();
    state.open_session(session.clone());

    tracing::info!(session_id = %id, "Chat session started");

    if session
        .send(ServerMessage::session_created(&id))
        .await
        .is_ok()
    {
        let greeting = &state.config().greeting;
        if !greeting.is_empty()
            && let Err(e) = state.publisher.send(greeting.as_str(), &id).await
        {
            let _ = session
                .send(ServerMessage::error("send_failed", e.to_string()))
                .await;
        }

        read_frames(&mut receiver, &session, &state).await;
    }

    state.close_session(&id);
    drop(session);

    // The writer ends once every sender is gone; a delivery still holding
    // the session must not keep it alive past the flush window.
    if tokio::time::timeout(FLUSH_TIMEOUT, &mut writer).await.is_err() {
        writer.abort();
    }

    tracing::info!(session_id = %id, "Chat session ended");
}

async fn read_frames(
    receiver: &mut futures::stream::SplitStream<WebSocket>,
    session: &WsSession,
    state: &AppState,
) {
    let idle_timeout = state.config().idle_timeout;

    loop {
        let msg = match tokio::time::timeout(idle_timeout, receiver.next()).await {
            Ok(Some(msg)) => msg,
            Ok(None) => break,
            Err(_) => {
                tracing::info!(session_id = %session.id(), "WebSocket closed due to idle timeout");
                let _ = session
                    .send(ServerMessage::error(
                        "idle_timeout",
                        "Connection closed due to inactivity",
                    ))
                    .await;
                break;
            }
        };

        // Binary frames are accepted when they hold UTF-8 JSON.
        let text = match msg {
            Ok(Message::Text(text)) => text.to_string(),
            Ok(Message::Binary(data)) => match String::from_utf8(data.to_vec()) {
                Ok(text) => text,
                Err(_) => {
                    let _ = session
                        .send(ServerMessage::error(
                            "invalid_message",
                            "Binary data must be UTF-8",
                        ))
                        .await;
                    continue;
                }
            },
            // axum answers pings itself
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => continue,
            Ok(Message::Close(_)) => break,
            Err(e) => {
                tracing::warn!(session_id = %session.id(), error = %e, "WebSocket error");
                break;
            }
        };

        let client_msg: ClientMessage = match serde_json::from_str(&text) {
            Ok(m) => m,
            Err(e) => {
                let _ = session
                    .send(ServerMessage::error(
                        "parse_error",
                        format!("Invalid message: {}", e),
                    ))
                    .await;
                continue;
            }
        };

        if let Some(response) = handle_message(client_msg, session, state).await
            && session.send(response).await.is_err()
        {
            break;
        }
    }
}

/// Drain queued frames onto the socket until the channel closes or the
/// client goes away.
async fn write_frames(
    mut sender: SplitSink<WebSocket, Message>,
    mut rx: mpsc::Receiver<ServerMessage>,
) {
    while let Some(msg) = rx.recv().await {
        if send_message(&mut sender, msg).await.is_err() {
            break;
        }
    }
    let _ = sender.close().await;
}

/// Send a message over the WebSocket.
pub async fn send_message(
    sender: &mut SplitSink<WebSocket, Message>,
    msg: ServerMessage,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(&msg).map_err(axum::Error::new)?;
    sender
        .send(Message::Text(json.into()))
        .await
        .map_err(axum::Error::new)
}
