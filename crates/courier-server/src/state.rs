//! Application state shared across handlers.

use std::sync::Arc;

use courier_bridge::{
    ConversationSource, CursorStore, EventPublisher, OutboundPublisher, SessionHandle,
    UpdateHandler,
};
use courier_types::CorrelationId;
use tracing::debug;

use crate::config::ServerConfig;
use crate::registry::SessionRegistry;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,

    /// Live sessions attached to this process.
    pub sessions: Arc<SessionRegistry>,

    /// Publishes user input to the workflow engine.
    pub publisher: Arc<OutboundPublisher>,

    /// Delivers new conversation turns to live sessions.
    pub updates: Arc<UpdateHandler>,
}

impl AppState {
    /// Create application state over the given bus transport and actor
    /// source.
    pub fn new(
        config: ServerConfig,
        transport: Arc<dyn EventPublisher>,
        source: Arc<dyn ConversationSource>,
    ) -> Self {
        let sessions = Arc::new(SessionRegistry::new());
        let cursors = Arc::new(CursorStore::with_initial(config.initial_cursor));
        let updates = UpdateHandler::new(sessions.clone(), source, cursors)
            .with_actor_timeout(config.actor_timeout);
        let publisher = OutboundPublisher::new(transport, config.topic.clone());

        Self {
            config: Arc::new(config),
            sessions,
            publisher: Arc::new(publisher),
            updates: Arc::new(updates),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Attach a newly connected session.
    pub fn open_session(&self, session: SessionHandle) {
        debug!(session_id = %session.id(), "Session opened");
        self.sessions.register(session);
    }

    /// Detach a session and discard its delivery cursor.
    pub fn close_session(&self, id: &CorrelationId) {
        self.sessions.unregister(id);
        self.updates.cursors().forget(id);
        debug!(session_id = %id, "Session closed");
    }
}
