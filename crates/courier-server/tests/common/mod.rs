//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use courier_bridge::testing::{MockConversationSource, RecordingPublisher};
use courier_server::{AppState, Server, ServerConfig, ServerMessage};
use futures::{SinkExt, StreamExt};
use reqwest::Client;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

/// A test server that runs in the background.
pub struct TestServer {
    /// The server's address.
    pub addr: SocketAddr,
    /// HTTP client configured for this server.
    pub client: Client,
    /// Actor double serving conversations.
    pub source: Arc<MockConversationSource>,
    /// Bus double recording published input.
    pub publisher: Arc<RecordingPublisher>,
    /// Shared application state.
    pub state: AppState,
    /// Handle to the server task.
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server with default configuration.
    pub async fn start() -> Result<Self> {
        Self::start_with(ServerConfig::default(), RecordingPublisher::new()).await
    }

    /// Start a new test server with the given config and bus double.
    pub async fn start_with(config: ServerConfig, publisher: RecordingPublisher) -> Result<Self> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let source = Arc::new(MockConversationSource::new());
        let publisher = Arc::new(publisher);
        let state = AppState::new(
            config.with_bind_address(addr),
            publisher.clone(),
            source.clone(),
        );

        let server = Server::from_state(state.clone());
        let handle = tokio::spawn(async move {
            let _ = server.serve(listener).await;
        });

        let client = Client::new();
        wait_for_server(&client, addr).await?;

        Ok(Self {
            addr,
            client,
            source,
            publisher,
            state,
            _handle: handle,
        })
    }

    /// Get the base URL for the server.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Fetch `/health`.
    pub async fn health(&self) -> Result<serde_json::Value> {
        let resp = self
            .client
            .get(format!("{}/health", self.base_url()))
            .send()
            .await?;
        Ok(resp.json().await?)
    }

    /// POST a notification the way the sidecar does.
    pub async fn notify(&self, payload: serde_json::Value) -> Result<serde_json::Value> {
        let resp = self
            .client
            .post(format!("{}/events", self.base_url()))
            .header("content-type", "application/cloudevents+json")
            .body(payload.to_string())
            .send()
            .await?;
        anyhow::ensure!(resp.status().is_success(), "status {}", resp.status());
        Ok(resp.json().await?)
    }

    /// Open a live session and wait for its id.
    pub async fn connect(&self) -> Result<TestSession> {
        let url = format!("ws://{}/ws", self.addr);
        let (mut socket, _) = tokio_tungstenite::connect_async(url).await?;

        let session_id = match next_frame(&mut socket).await? {
            ServerMessage::SessionCreated { session_id } => session_id,
            other => anyhow::bail!("expected session_created, got {:?}", other),
        };

        Ok(TestSession { session_id, socket })
    }
}

/// A connected WebSocket client.
pub struct TestSession {
    pub session_id: String,
    pub socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestSession {
    /// Send a client frame.
    pub async fn send(&mut self, frame: serde_json::Value) -> Result<()> {
        self.socket
            .send(Message::Text(frame.to_string().into()))
            .await?;
        Ok(())
    }

    /// Wait for the next server frame.
    pub async fn recv(&mut self) -> Result<ServerMessage> {
        next_frame(&mut self.socket).await
    }

    /// Assert nothing arrives for a short while.
    pub async fn expect_silence(&mut self) -> Result<()> {
        match timeout(Duration::from_millis(200), self.socket.next()).await {
            Err(_) => Ok(()),
            Ok(frame) => anyhow::bail!("unexpected frame: {:?}", frame),
        }
    }

    pub async fn close(mut self) -> Result<()> {
        self.socket.close(None).await?;
        Ok(())
    }
}

async fn next_frame(
    socket: &mut WebSocketStream<MaybeTlsStream<TcpStream>>,
) -> Result<ServerMessage> {
    loop {
        let frame = timeout(Duration::from_secs(5), socket.next())
            .await
            .context("timed out waiting for frame")?
            .context("socket closed")??;

        match frame {
            Message::Text(text) => return Ok(serde_json::from_str(text.as_str())?),
            Message::Ping(_) | Message::Pong(_) => continue,
            other => anyhow::bail!("unexpected frame: {:?}", other),
        }
    }
}

/// Wait until `check` holds, polling briefly.
pub async fn eventually<F: Fn() -> bool>(check: F) -> Result<()> {
    timeout(Duration::from_secs(5), async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .context("condition not met in time")
}

/// Wait for the server to become ready.
async fn wait_for_server(client: &Client, addr: SocketAddr) -> Result<()> {
    let url = format!("http://{}/health", addr);

    let result = timeout(Duration::from_secs(5), async {
        loop {
            match client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => return,
                _ => tokio::time::sleep(Duration::from_millis(50)).await,
            }
        }
    })
    .await;

    match result {
        Ok(()) => Ok(()),
        Err(_) => anyhow::bail!("Timeout waiting for server to start"),
    }
}
