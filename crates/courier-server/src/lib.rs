//! Dapr subscription endpoints and WebSocket live sessions for Courier.
//!
//! This crate is the display layer of the bridge: it owns the live
//! session registry, accepts update notifications from the sidecar and
//! turns client input into published events.
//!
//! # Example
//!
//! ```ignore
//! use courier_server::{AppState, Server, ServerConfig};
//!
//! let state = AppState::new(ServerConfig::default(), transport, source);
//! Server::from_state(state).run().await?;
//! ```

pub mod config;
pub mod error;
pub mod registry;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use registry::SessionRegistry;
pub use routes::{ClientMessage, ServerMessage, SubscriptionResponse, SubscriptionStatus};
pub use state::AppState;

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// The Courier HTTP/WebSocket server.
pub struct Server {
    /// Application state.
    state: AppState,
}

impl Server {
    /// Create a server from a pre-built application state.
    pub fn from_state(state: AppState) -> Self {
        Self { state }
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        use axum::routing::{get, post};

        Router::new()
            .merge(routes::health_routes())
            .route("/dapr/subscribe", get(routes::dapr_subscribe))
            .route(routes::EVENTS_ROUTE, post(routes::events_handler))
            .route("/ws", get(routes::ws_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the server on the configured address.
    pub async fn run(self) -> Result<()> {
        let addr = self.state.config.bind_address;
        self.run_on(addr).await
    }

    /// Run the server on a specific address (useful for testing).
    pub async fn run_on(self, addr: SocketAddr) -> Result<()> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener.
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let router = self.router();

        if let Ok(addr) = listener.local_addr() {
            info!(
                addr = %addr,
                topic = %self.state.config.topic,
                "Starting server"
            );
        }

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(ServerError::Serve)
    }

    /// Get the configured bind address.
    pub fn bind_address(&self) -> SocketAddr {
        self.state.config.bind_address
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    } else {
        // No signal handler available; run until the task is dropped.
        std::future::pending::<()>().await;
    }
}
