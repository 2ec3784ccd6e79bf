//! Registry of live WebSocket sessions.

use std::collections::HashMap;

use courier_bridge::{SessionHandle, SessionResolver};
use courier_types::CorrelationId;
use parking_lot::RwLock;

/// Sessions currently attached to this process, by correlation id.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<CorrelationId, SessionHandle>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a session. Replaces any session already holding the id.
    pub fn register(&self, session: SessionHandle) -> Option<SessionHandle> {
        self.sessions.write().insert(session.id().clone(), session)
    }

    /// Detach the session for `id`.
    pub fn unregister(&self, id: &CorrelationId) -> Option<SessionHandle> {
        self.sessions.write().remove(id)
    }

    pub fn contains(&self, id: &CorrelationId) -> bool {
        self.sessions.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

impl SessionResolver for SessionRegistry {
    fn resolve(&self, id: &CorrelationId) -> Option<SessionHandle> {
        self.sessions.read().get(id).cloned()
    }
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("sessions", &self.len())
            .finish()
    }
}
