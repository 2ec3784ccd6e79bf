//! Server configuration.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use courier_bridge::{DEFAULT_ACTOR_TIMEOUT, DEFAULT_INITIAL_CURSOR};
use courier_types::Topic;

/// Idle timeout for WebSocket connections (30 minutes).
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Default max message size for WebSocket (1 MB).
pub const DEFAULT_MAX_WS_MESSAGE_SIZE: usize = 1024 * 1024;

/// Default greeting published when a session starts.
pub const DEFAULT_GREETING: &str = "Hello";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to.
    pub bind_address: SocketAddr,

    /// Pub/sub topic for input events and update notifications.
    pub topic: Topic,

    /// Published on behalf of every new session. Empty disables it.
    pub greeting: String,

    /// Bound on one conversation fetch.
    pub actor_timeout: Duration,

    /// Turns considered already shown for a new session.
    pub initial_cursor: usize,

    /// Connections that send nothing for this long are closed.
    pub idle_timeout: Duration,

    /// Maximum WebSocket message size in bytes.
    pub max_ws_message_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from((Ipv4Addr::LOCALHOST, 8000)),
            topic: Topic::default(),
            greeting: DEFAULT_GREETING.to_string(),
            actor_timeout: DEFAULT_ACTOR_TIMEOUT,
            initial_cursor: DEFAULT_INITIAL_CURSOR,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            max_ws_message_size: DEFAULT_MAX_WS_MESSAGE_SIZE,
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bind address.
    pub fn with_bind_address(mut self, addr: SocketAddr) -> Self {
        self.bind_address = addr;
        self
    }

    /// Set the pub/sub topic.
    pub fn with_topic(mut self, topic: Topic) -> Self {
        self.topic = topic;
        self
    }

    /// Set the session greeting.
    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = greeting.into();
        self
    }

    /// Set the actor fetch timeout.
    pub fn with_actor_timeout(mut self, timeout: Duration) -> Self {
        self.actor_timeout = timeout;
        self
    }

    /// Set the starting cursor for new sessions.
    pub fn with_initial_cursor(mut self, initial: usize) -> Self {
        self.initial_cursor = initial;
        self
    }

    /// Set the WebSocket idle timeout.
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Set the maximum WebSocket message size.
    pub fn with_max_ws_message_size(mut self, size: usize) -> Self {
        self.max_ws_message_size = size;
        self
    }
}
