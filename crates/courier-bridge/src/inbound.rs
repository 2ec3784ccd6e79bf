//! Inbound update handling.

use std::sync::Arc;
use std::time::Duration;

use courier_types::CorrelationId;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cursor::CursorStore;
use crate::error::{BridgeError, Result};
use crate::normalize::{is_displayable, to_display_message};
use crate::notification::UpdateNotification;
use crate::session::SessionResolver;
use crate::source::{ConversationSource, fetch_conversation};

/// Default bound on the actor round trip.
pub const DEFAULT_ACTOR_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of one handled notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub session_id: CorrelationId,
    /// Turns past the cursor when the notification was handled.
    pub examined: usize,
    /// Turns handed to the live session.
    pub delivered: usize,
    /// Turns filtered out or without displayable text.
    pub skipped: usize,
}

impl DeliveryReport {
    fn new(session_id: CorrelationId) -> Self {
        Self {
            session_id,
            examined: 0,
            delivered: 0,
            skipped: 0,
        }
    }

    /// Turns neither delivered nor skipped (lost to a mid-delivery failure).
    pub fn dropped(&self) -> usize {
        self.examined - self.delivered - self.skipped
    }
}

/// Delivers newly appended conversation turns to live sessions.
///
/// For each notification: lock the session's cursor, resolve the session,
/// fetch the full conversation, take the turns past the cursor, then filter,
/// normalize and deliver them in order. The lock is per session, so
/// notifications for different sessions proceed in parallel while two for
/// the same session run one after the other.
pub struct UpdateHandler {
    sessions: Arc<dyn SessionResolver>,
    source: Arc<dyn ConversationSource>,
    cursors: Arc<CursorStore>,
    actor_timeout: Duration,
}

impl UpdateHandler {
    pub fn new(
        sessions: Arc<dyn SessionResolver>,
        source: Arc<dyn ConversationSource>,
        cursors: Arc<CursorStore>,
    ) -> Self {
        Self {
            sessions,
            source,
            cursors,
            actor_timeout: DEFAULT_ACTOR_TIMEOUT,
        }
    }

    /// Set the bound on the actor round trip.
    pub fn with_actor_timeout(mut self, timeout: Duration) -> Self {
        self.actor_timeout = timeout;
        self
    }

    pub fn actor_timeout(&self) -> Duration {
        self.actor_timeout
    }

    /// Cursor store backing this handler.
    pub fn cursors(&self) -> &Arc<CursorStore> {
        &self.cursors
    }

    /// Handle a raw notification payload as delivered by the bus.
    pub async fn on_update(&self, payload: &Value) -> Result<DeliveryReport> {
        let notification = UpdateNotification::from_payload(payload)?;
        self.handle(notification.session_id()).await
    }

    /// Deliver whatever `session_id` has not seen yet.
    ///
    /// Nothing is delivered when the session is not attached or the actor
    /// cannot be reached. A turn without displayable text is skipped on its
    /// own. If the session goes away mid-delivery, the remaining turns are
    /// dropped; the cursor has already moved past them.
    pub async fn handle(&self, session_id: &CorrelationId) -> Result<DeliveryReport> {
        let mut cursor = self.cursors.lock(session_id).await;

        // Resolved under the cursor lock: a session closing concurrently has
        // either already forgotten its cursor or will forget this one.
        debug!(session_id = %session_id, "Resolving live session");
        let Some(session) = self.sessions.resolve(session_id) else {
            drop(cursor);
            self.cursors.forget(session_id);
            return Err(BridgeError::SessionNotFound(session_id.clone()));
        };

        let snapshot =
            fetch_conversation(self.source.as_ref(), session_id, self.actor_timeout).await?;

        let from = cursor.delivered();
        let pending = cursor.take_pending(&snapshot);

        let mut report = DeliveryReport::new(session_id.clone());
        report.examined = pending.len();

        info!(
            session_id = %session_id,
            from,
            to = cursor.delivered(),
            pending = pending.len(),
            "Delivering new turns"
        );

        for (offset, turn) in pending.iter().enumerate() {
            let index = from + offset;

            if !is_displayable(turn) {
                report.skipped += 1;
                continue;
            }

            let message = match to_display_message(turn) {
                Ok(message) => message,
                Err(e) => {
                    warn!(
                        session_id = %session_id,
                        index,
                        author = %turn.name,
                        error = %e,
                        "Skipping turn without displayable text"
                    );
                    report.skipped += 1;
                    continue;
                }
            };

            if let Err(e) = session.deliver(message).await {
                warn!(
                    session_id = %session_id,
                    index,
                    remaining = pending.len() - offset,
                    error = %e,
                    "Delivery failed, dropping remaining turns"
                );
                break;
            }
            report.delivered += 1;
        }

        debug!(
            session_id = %session_id,
            delivered = report.delivered,
            skipped = report.skipped,
            "Notification handled"
        );

        Ok(report)
    }
}

impl std::fmt::Debug for UpdateHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateHandler")
            .field("cursors", &self.cursors.len())
            .field("actor_timeout", &self.actor_timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionHandle;
    use crate::testing::{
        MockConversationSource, RecordingSession, StaticSessions, attached_session,
    };
    use courier_types::{
        ContentBlock, ConversationSnapshot, DisplayMessage, Role, Turn,
    };
    use serde_json::json;

    struct Fixture {
        handler: Arc<UpdateHandler>,
        sessions: Arc<StaticSessions>,
        source: Arc<MockConversationSource>,
        session: Arc<RecordingSession>,
        id: CorrelationId,
    }

    fn fixture() -> Fixture {
        let id = CorrelationId::new("abc123");
        let sessions = Arc::new(StaticSessions::new());
        let session = attached_session(&sessions, id.clone());

        let source = Arc::new(MockConversationSource::new());
        let handler = Arc::new(UpdateHandler::new(
            sessions.clone(),
            source.clone(),
            Arc::new(CursorStore::new()),
        ));

        Fixture {
            handler,
            sessions,
            source,
            session,
            id,
        }
    }

    fn notification(id: &str) -> Value {
        json!({"data": {"id": id}})
    }

    #[tokio::test]
    async fn test_delivers_new_turns_after_bootstrap() {
        let f = fixture();
        f.source.set(
            &f.id,
            ConversationSnapshot::new(vec![
                Turn::user("Hello"),
                Turn::assistant("planner", "Hi, how can I help?"),
            ]),
        );

        let report = f.handler.on_update(&notification("abc123")).await.unwrap();

        assert_eq!(report.examined, 1);
        assert_eq!(report.delivered, 1);
        assert_eq!(
            f.session.messages(),
            vec![DisplayMessage::new("Hi, how can I help?", "planner")]
        );
        assert_eq!(f.handler.cursors().delivered(&f.id).await, Some(2));
    }

    #[tokio::test]
    async fn test_growing_conversation_delivers_each_turn_once() {
        let f = fixture();
        let mut snapshot = ConversationSnapshot::new(vec![Turn::system("prompt")]);
        let mut expected = Vec::new();

        for round in 0..4 {
            snapshot = snapshot
                .with_turn(Turn::user(format!("question {round}")))
                .with_turn(Turn::assistant("bot", format!("answer {round}")));
            expected.push(DisplayMessage::new(format!("answer {round}"), "bot"));
            f.source.set(&f.id, snapshot.clone());

            // Duplicate notifications must not repeat anything.
            f.handler.handle(&f.id).await.unwrap();
            f.handler.handle(&f.id).await.unwrap();
        }

        assert_eq!(f.session.messages(), expected);
        assert_eq!(f.source.calls(), 8);
    }

    #[tokio::test]
    async fn test_filters_system_and_user_named_turns() {
        let f = fixture();
        f.source.set(
            &f.id,
            ConversationSnapshot::new(vec![
                Turn::user("bootstrap"),
                Turn::new(Role::System, "x", "ignored"),
                Turn::tool("approver", "approved"),
                Turn::new(Role::Assistant, "user", "echo"),
                Turn::assistant("bot", "done"),
            ]),
        );

        let report = f.handler.handle(&f.id).await.unwrap();

        assert_eq!(report.examined, 4);
        assert_eq!(report.delivered, 2);
        assert_eq!(report.skipped, 2);
        assert_eq!(
            f.session.messages(),
            vec![
                DisplayMessage::new("approved", "approver"),
                DisplayMessage::new("done", "bot"),
            ]
        );
    }

    #[tokio::test]
    async fn test_turn_without_text_is_skipped_not_fatal() {
        let f = fixture();
        f.source.set(
            &f.id,
            ConversationSnapshot::new(vec![
                Turn::user("bootstrap"),
                Turn::assistant("artist", vec![ContentBlock::new("image")]),
                Turn::assistant(
                    "artist",
                    vec![ContentBlock::new("image"), ContentBlock::text("hi")],
                ),
            ]),
        );

        let report = f.handler.handle(&f.id).await.unwrap();

        assert_eq!(report.skipped, 1);
        assert_eq!(f.session.messages(), vec![DisplayMessage::new("hi", "artist")]);
        assert_eq!(f.handler.cursors().delivered(&f.id).await, Some(3));
    }

    #[tokio::test]
    async fn test_unresolved_session_delivers_nothing() {
        let f = fixture();
        f.source.set(
            &"nobody".into(),
            ConversationSnapshot::new(vec![Turn::user("a"), Turn::assistant("b", "c")]),
        );

        let err = f.handler.on_update(&notification("nobody")).await.unwrap_err();

        assert!(matches!(err, BridgeError::SessionNotFound(ref id) if id.as_str() == "nobody"));
        assert!(f.session.messages().is_empty());
        assert_eq!(f.source.calls(), 0);
        assert!(f.handler.cursors().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_notification() {
        let f = fixture();
        let err = f.handler.on_update(&json!({"data": {}})).await.unwrap_err();
        assert!(matches!(err, BridgeError::MalformedNotification(_)));
        assert_eq!(f.source.calls(), 0);
    }

    #[tokio::test]
    async fn test_actor_failure_keeps_cursor() {
        let f = fixture();
        f.source.fail(&f.id);

        let err = f.handler.handle(&f.id).await.unwrap_err();
        assert!(matches!(err, BridgeError::ActorUnavailable { .. }));
        assert!(f.session.messages().is_empty());

        // Once the actor recovers, nothing was lost.
        f.source.set(
            &f.id,
            ConversationSnapshot::new(vec![Turn::user("a"), Turn::assistant("bot", "b")]),
        );
        f.handler.handle(&f.id).await.unwrap();
        assert_eq!(f.session.messages(), vec![DisplayMessage::new("b", "bot")]);
    }

    #[tokio::test]
    async fn test_actor_timeout_is_unavailable() {
        let id = CorrelationId::new("slow");
        let sessions = Arc::new(StaticSessions::new());
        sessions.attach(Arc::new(RecordingSession::new(id.clone())));
        let source =
            Arc::new(MockConversationSource::new().with_delay(Duration::from_millis(200)));
        source.set(&id, ConversationSnapshot::default());

        let handler = UpdateHandler::new(sessions, source, Arc::new(CursorStore::new()))
            .with_actor_timeout(Duration::from_millis(20));

        let err = handler.handle(&id).await.unwrap_err();
        assert!(matches!(err, BridgeError::ActorUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_closed_session_drops_remaining_turns() {
        let f = fixture();
        f.session.close_after(1);
        f.source.set(
            &f.id,
            ConversationSnapshot::new(vec![
                Turn::user("bootstrap"),
                Turn::assistant("bot", "one"),
                Turn::assistant("bot", "two"),
                Turn::assistant("bot", "three"),
            ]),
        );

        let report = f.handler.handle(&f.id).await.unwrap();
        assert_eq!(report.delivered, 1);
        assert_eq!(report.dropped(), 2);

        // The lost turns are never redelivered.
        f.session.reopen();
        f.handler.handle(&f.id).await.unwrap();
        assert_eq!(f.session.messages(), vec![DisplayMessage::new("one", "bot")]);
    }

    #[tokio::test]
    async fn test_concurrent_notifications_do_not_duplicate() {
        let id = CorrelationId::new("busy");
        let sessions = Arc::new(StaticSessions::new());
        let session = Arc::new(RecordingSession::new(id.clone()));
        sessions.attach(session.clone());
        let source =
            Arc::new(MockConversationSource::new().with_delay(Duration::from_millis(10)));
        source.set(
            &id,
            ConversationSnapshot::new(vec![
                Turn::user("hi"),
                Turn::assistant("bot", "a"),
                Turn::assistant("bot", "b"),
            ]),
        );
        let handler = Arc::new(UpdateHandler::new(
            sessions,
            source,
            Arc::new(CursorStore::new()),
        ));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let handler = Arc::clone(&handler);
                let id = id.clone();
                tokio::spawn(async move { handler.handle(&id).await })
            })
            .collect();

        let reports = futures::future::join_all(tasks).await;
        let delivered: usize = reports
            .into_iter()
            .map(|r| r.unwrap().unwrap().delivered)
            .sum();

        assert_eq!(delivered, 2);
        assert_eq!(
            session.messages(),
            vec![DisplayMessage::new("a", "bot"), DisplayMessage::new("b", "bot")]
        );
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let f = fixture();
        let other_id = CorrelationId::new("other");
        let other = Arc::new(RecordingSession::new(other_id.clone()));
        f.sessions.attach(other.clone());

        f.source.set(
            &f.id,
            ConversationSnapshot::new(vec![Turn::user("a"), Turn::assistant("bot", "for abc")]),
        );
        f.source.set(
            &other_id,
            ConversationSnapshot::new(vec![
                Turn::user("a"),
                Turn::assistant("bot", "for other"),
            ]),
        );

        f.handler.handle(&f.id).await.unwrap();
        f.handler.handle(&other_id).await.unwrap();

        assert_eq!(f.session.messages(), vec![DisplayMessage::new("for abc", "bot")]);
        assert_eq!(other.messages(), vec![DisplayMessage::new("for other", "bot")]);
    }

    /// Resolver whose session ends while it is being looked up, the way a
    /// socket closing on another worker unregisters and forgets its cursor.
    struct ClosingResolver {
        sessions: StaticSessions,
        cursors: Arc<CursorStore>,
        hand_out: bool,
    }

    impl SessionResolver for ClosingResolver {
        fn resolve(&self, id: &CorrelationId) -> Option<SessionHandle> {
            let session = self.sessions.resolve(id);
            self.sessions.detach(id);
            self.cursors.forget(id);
            session.filter(|_| self.hand_out)
        }
    }

    fn closing_handler(
        hand_out: bool,
    ) -> (UpdateHandler, Arc<CursorStore>, Arc<MockConversationSource>, CorrelationId) {
        let id = CorrelationId::new("closing");
        let sessions = StaticSessions::new();
        attached_session(&sessions, id.clone());
        let cursors = Arc::new(CursorStore::new());
        let resolver = Arc::new(ClosingResolver {
            sessions,
            cursors: cursors.clone(),
            hand_out,
        });

        let source = Arc::new(MockConversationSource::new());
        source.set(
            &id,
            ConversationSnapshot::new(vec![Turn::user("a"), Turn::assistant("bot", "b")]),
        );

        let handler = UpdateHandler::new(resolver, source.clone(), cursors.clone());
        (handler, cursors, source, id)
    }

    #[tokio::test]
    async fn test_session_closed_during_lookup_leaves_no_cursor() {
        let (handler, cursors, source, id) = closing_handler(false);

        let err = handler.handle(&id).await.unwrap_err();

        assert!(matches!(err, BridgeError::SessionNotFound(_)));
        assert_eq!(source.calls(), 0);
        assert_eq!(cursors.len(), 0);
    }

    #[tokio::test]
    async fn test_session_closed_after_lookup_leaves_no_cursor() {
        let (handler, cursors, _source, id) = closing_handler(true);

        let report = handler.handle(&id).await.unwrap();

        assert_eq!(report.delivered, 1);
        assert_eq!(cursors.len(), 0);
    }
}
