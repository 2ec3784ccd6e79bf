//! In-memory doubles for the bridge seams.
//!
//! Enabled with the `testing` feature so downstream crates can drive the
//! bridge without a sidecar or real sockets.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use courier_types::{ConversationSnapshot, CorrelationId, DisplayMessage, InputEvent, Topic, Turn};
use parking_lot::{Mutex, RwLock};

use crate::error::{BridgeError, Result};
use crate::publisher::EventPublisher;
use crate::session::{LiveSession, SessionHandle, SessionResolver};
use crate::source::ConversationSource;

/// Actor double serving scripted snapshots.
#[derive(Debug, Default)]
pub struct MockConversationSource {
    conversations: Mutex<HashMap<CorrelationId, Option<ConversationSnapshot>>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockConversationSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long before answering each fetch.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Serve `snapshot` for `id` from now on.
    pub fn set(&self, id: &CorrelationId, snapshot: ConversationSnapshot) {
        self.conversations.lock().insert(id.clone(), Some(snapshot));
    }

    /// Append a turn to the conversation for `id`.
    pub fn push_turn(&self, id: &CorrelationId, turn: Turn) {
        let mut conversations = self.conversations.lock();
        let entry = conversations
            .entry(id.clone())
            .or_insert_with(|| Some(ConversationSnapshot::default()));
        entry.get_or_insert_with(ConversationSnapshot::default).messages.push(turn);
    }

    /// Make fetches for `id` fail until the next [`set`](Self::set).
    pub fn fail(&self, id: &CorrelationId) {
        self.conversations.lock().insert(id.clone(), None);
    }

    /// Number of fetches served or failed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConversationSource for MockConversationSource {
    async fn get_conversation(&self, id: &CorrelationId) -> Result<ConversationSnapshot> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.conversations.lock().get(id) {
            Some(Some(snapshot)) => Ok(snapshot.clone()),
            Some(None) => Err(BridgeError::ActorUnavailable {
                session_id: id.clone(),
                reason: "scripted failure".to_string(),
            }),
            None => Err(BridgeError::ActorUnavailable {
                session_id: id.clone(),
                reason: "no such actor".to_string(),
            }),
        }
    }
}

/// Live session double that records what it was given.
#[derive(Debug)]
pub struct RecordingSession {
    id: CorrelationId,
    messages: Mutex<Vec<DisplayMessage>>,
    /// Deliveries still accepted before the session reports itself closed.
    remaining: Mutex<Option<usize>>,
}

impl RecordingSession {
    pub fn new(id: CorrelationId) -> Self {
        Self {
            id,
            messages: Mutex::new(Vec::new()),
            remaining: Mutex::new(None),
        }
    }

    /// Accept `n` more deliveries, then behave as closed.
    pub fn close_after(&self, n: usize) {
        *self.remaining.lock() = Some(n);
    }

    /// Accept deliveries again.
    pub fn reopen(&self) {
        *self.remaining.lock() = None;
    }

    pub fn messages(&self) -> Vec<DisplayMessage> {
        self.messages.lock().clone()
    }
}

#[async_trait]
impl LiveSession for RecordingSession {
    fn id(&self) -> &CorrelationId {
        &self.id
    }

    async fn deliver(&self, message: DisplayMessage) -> Result<()> {
        let mut remaining = self.remaining.lock();
        match remaining.as_mut() {
            Some(0) => return Err(BridgeError::SessionClosed(self.id.clone())),
            Some(n) => *n -= 1,
            None => {}
        }
        self.messages.lock().push(message);
        Ok(())
    }
}

/// Session registry double.
#[derive(Default)]
pub struct StaticSessions {
    sessions: RwLock<HashMap<CorrelationId, SessionHandle>>,
}

impl StaticSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, session: SessionHandle) {
        self.sessions.write().insert(session.id().clone(), session);
    }

    pub fn detach(&self, id: &CorrelationId) -> bool {
        self.sessions.write().remove(id).is_some()
    }
}

impl SessionResolver for StaticSessions {
    fn resolve(&self, id: &CorrelationId) -> Option<SessionHandle> {
        self.sessions.read().get(id).cloned()
    }
}

/// Transport double that records published envelopes.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<(Topic, InputEvent)>>,
    failure: Option<String>,
    attempts: AtomicUsize,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose every publish fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Successfully published envelopes, oldest first.
    pub fn published(&self) -> Vec<(Topic, InputEvent)> {
        self.published.lock().clone()
    }

    /// Envelopes published for one session.
    pub fn published_for(&self, id: &CorrelationId) -> Vec<InputEvent> {
        self.published
            .lock()
            .iter()
            .filter(|(_, event)| event.id() == id)
            .map(|(_, event)| event.clone())
            .collect()
    }

    /// Publish attempts, including failed ones.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, topic: &Topic, event: &InputEvent) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = &self.failure {
            return Err(BridgeError::Transport(reason.clone()));
        }
        self.published.lock().push((topic.clone(), event.clone()));
        Ok(())
    }
}

/// Convenience: a [`RecordingSession`] already attached to a registry.
pub fn attached_session(
    sessions: &StaticSessions,
    id: impl Into<CorrelationId>,
) -> Arc<RecordingSession> {
    let session = Arc::new(RecordingSession::new(id.into()));
    sessions.attach(session.clone());
    session
}
