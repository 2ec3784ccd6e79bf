//! Per-session delivery cursors.
//!
//! A cursor counts how many turns of a conversation a live session has
//! already examined. The count is the only record of what was shown; there
//! is no per-turn tracking. Cursors live in process memory and are lost on
//! restart, after which a reconnecting session starts again from the
//! initial value.
//!
//! [`CursorStore::lock`] hands out an owned per-session guard. Holding it
//! across fetch, slice, advance and delivery is what keeps two concurrent
//! notifications for the same session from delivering the same turns twice.

use std::collections::HashMap;
use std::sync::Arc;

use courier_types::{ConversationSnapshot, CorrelationId, Turn};
use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, trace};

/// Turns considered already shown when a session is first seen: the
/// bootstrap turn that opens every conversation.
pub const DEFAULT_INITIAL_CURSOR: usize = 1;

/// Delivery position for one live session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryCursor {
    session_id: CorrelationId,
    delivered: usize,
}

impl DeliveryCursor {
    pub fn new(session_id: CorrelationId, delivered: usize) -> Self {
        Self {
            session_id,
            delivered,
        }
    }

    pub fn session_id(&self) -> &CorrelationId {
        &self.session_id
    }

    /// Number of turns already examined for this session.
    pub fn delivered(&self) -> usize {
        self.delivered
    }

    /// Return the turns past the cursor and advance it to the end of the
    /// snapshot.
    ///
    /// The cursor moves before the caller delivers anything, so a failure
    /// partway through delivery loses the remaining turns rather than
    /// repeating them on the next notification. It never moves backwards;
    /// a snapshot shorter than the cursor yields nothing.
    pub fn take_pending<'a>(&mut self, snapshot: &'a ConversationSnapshot) -> &'a [Turn] {
        let turns = snapshot.turns();
        let pending = turns.get(self.delivered..).unwrap_or_default();
        self.delivered = self.delivered.max(turns.len());
        pending
    }
}

/// Concurrent map of cursors, one async lock per session.
#[derive(Debug)]
pub struct CursorStore {
    initial: usize,
    cursors: Mutex<HashMap<CorrelationId, Arc<AsyncMutex<DeliveryCursor>>>>,
}

impl CursorStore {
    /// Create a store whose new cursors start at [`DEFAULT_INITIAL_CURSOR`].
    pub fn new() -> Self {
        Self::with_initial(DEFAULT_INITIAL_CURSOR)
    }

    /// Create a store whose new cursors start at `initial`.
    pub fn with_initial(initial: usize) -> Self {
        Self {
            initial,
            cursors: Mutex::new(HashMap::new()),
        }
    }

    /// Starting position for sessions seen for the first time.
    pub fn initial(&self) -> usize {
        self.initial
    }

    /// Lock the cursor for `session_id`, creating it on first use.
    ///
    /// Waits while another task holds the same session's cursor. Different
    /// sessions never wait on each other beyond the short map lookup.
    pub async fn lock(&self, session_id: &CorrelationId) -> OwnedMutexGuard<DeliveryCursor> {
        let slot = {
            let mut cursors = self.cursors.lock();
            Arc::clone(cursors.entry(session_id.clone()).or_insert_with(|| {
                trace!(session_id = %session_id, initial = self.initial, "Creating delivery cursor");
                Arc::new(AsyncMutex::new(DeliveryCursor::new(
                    session_id.clone(),
                    self.initial,
                )))
            }))
        };
        slot.lock_owned().await
    }

    /// Current position for `session_id`, if a cursor exists.
    ///
    /// Waits for any in-flight delivery on that session to finish.
    pub async fn delivered(&self, session_id: &CorrelationId) -> Option<usize> {
        let slot = self.cursors.lock().get(session_id).cloned()?;
        let cursor = slot.lock().await;
        Some(cursor.delivered())
    }

    /// Discard the cursor of a session that has ended.
    ///
    /// Returns `true` if a cursor existed.
    pub fn forget(&self, session_id: &CorrelationId) -> bool {
        let removed = self.cursors.lock().remove(session_id).is_some();
        if removed {
            debug!(session_id = %session_id, "Discarded delivery cursor");
        }
        removed
    }

    /// Number of sessions with a cursor.
    pub fn len(&self) -> usize {
        self.cursors.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cursors.lock().is_empty()
    }
}

impl Default for CursorStore {
    fn default() -> Self {
        Self::new()
    }
}
