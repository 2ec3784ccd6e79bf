//! Dapr subscription endpoints.
//!
//! The sidecar asks `GET /dapr/subscribe` which topics to deliver, then
//! POSTs each notification to [`EVENTS_ROUTE`]. Every failure is contained
//! here and acknowledged with `DROP`, so the broker never redelivers.

use axum::{Json, body::Bytes, extract::State};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::state::AppState;

/// Route the sidecar delivers notifications to.
pub const EVENTS_ROUTE: &str = "/events";

/// One programmatic subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub pubsubname: String,
    pub topic: String,
    pub route: String,
}

/// Acknowledgement status understood by the sidecar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SubscriptionStatus {
    Success,
    Drop,
}

/// Body returned for each delivered notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionResponse {
    pub status: SubscriptionStatus,
}

impl SubscriptionResponse {
    pub fn success() -> Self {
        Self {
            status: SubscriptionStatus::Success,
        }
    }

    pub fn dropped() -> Self {
        Self {
            status: SubscriptionStatus::Drop,
        }
    }
}

/// GET /dapr/subscribe
pub async fn dapr_subscribe(State(state): State<AppState>) -> Json<Vec<Subscription>> {
    let topic = &state.config().topic;
    Json(vec![Subscription {
        pubsubname: topic.pubsub_name.clone(),
        topic: topic.topic_name.clone(),
        route: EVENTS_ROUTE.to_string(),
    }])
}

/// POST /events
///
/// The body is parsed here rather than through the `Json` extractor so that
/// malformed payloads are acknowledged instead of rejected with a 4xx.
pub async fn events_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Json<SubscriptionResponse> {
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "Dropping notification with invalid JSON body");
            return Json(SubscriptionResponse::dropped());
        }
    };

    info!(event_id = ?payload.get("id"), "Update notification received");

    match state.updates.on_update(&payload).await {
        Ok(report) => {
            debug!(
                session_id = %report.session_id,
                delivered = report.delivered,
                skipped = report.skipped,
                dropped = report.dropped(),
                "Notification delivered"
            );
            Json(SubscriptionResponse::success())
        }
        Err(e) if e.is_expected() => {
            debug!(code = e.code(), error = %e, "Notification for detached session dropped");
            Json(SubscriptionResponse::dropped())
        }
        Err(e) => {
            warn!(code = e.code(), error = %e, "Notification dropped");
            Json(SubscriptionResponse::dropped())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        routing::{get, post},
    };
    use courier_bridge::testing::{MockConversationSource, RecordingPublisher, RecordingSession};
    use courier_types::{ConversationSnapshot, CorrelationId, Topic, Turn};
    use serde_json::json;
    use tower::ServiceExt;

    use crate::config::ServerConfig;

    fn app(source: Arc<MockConversationSource>) -> (Router, AppState) {
        let state = AppState::new(
            ServerConfig::default().with_topic(Topic::new("ui", "updates")),
            Arc::new(RecordingPublisher::new()),
            source,
        );
        let router = Router::new()
            .route("/dapr/subscribe", get(dapr_subscribe))
            .route(EVENTS_ROUTE, post(events_handler))
            .with_state(state.clone());
        (router, state)
    }

    async fn post_event(router: Router, body: impl Into<Body>) -> SubscriptionResponse {
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(EVENTS_ROUTE)
                    .header("content-type", "application/cloudevents+json")
                    .body(body.into())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_value(SubscriptionResponse::success()).unwrap(),
            json!({"status": "SUCCESS"})
        );
        assert_eq!(
            serde_json::to_value(SubscriptionResponse::dropped()).unwrap(),
            json!({"status": "DROP"})
        );
    }

    #[tokio::test]
    async fn test_subscribe_lists_configured_topic() {
        let (router, _) = app(Arc::new(MockConversationSource::new()));
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/dapr/subscribe")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let subscriptions: Vec<Subscription> = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            subscriptions,
            vec![Subscription {
                pubsubname: "ui".to_string(),
                topic: "updates".to_string(),
                route: "/events".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_event_delivers_to_session() {
        let source = Arc::new(MockConversationSource::new());
        let (router, state) = app(source.clone());
        let id = CorrelationId::new("abc");
        source.set(
            &id,
            ConversationSnapshot::default()
                .with_turn(Turn::user("Hello"))
                .with_turn(Turn::assistant("planner", "Hi there")),
        );
        let session = Arc::new(RecordingSession::new(id.clone()));
        state.open_session(session.clone());

        let body = json!({"specversion": "1.0", "data": {"id": "abc"}}).to_string();
        let response = post_event(router, body).await;

        assert_eq!(response, SubscriptionResponse::success());
        let messages = session.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "Hi there");
        assert_eq!(messages[0].author, "planner");
    }

    #[tokio::test]
    async fn test_unknown_session_is_dropped() {
        let source = Arc::new(MockConversationSource::new());
        let (router, _) = app(source.clone());

        let response = post_event(router, json!({"data": {"id": "nobody"}}).to_string()).await;
        assert_eq!(response, SubscriptionResponse::dropped());
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_malformed_payload_is_dropped() {
        let (router, _) = app(Arc::new(MockConversationSource::new()));
        let response = post_event(router, json!({"data": {}}).to_string()).await;
        assert_eq!(response, SubscriptionResponse::dropped());
    }

    #[tokio::test]
    async fn test_invalid_json_is_dropped() {
        let (router, _) = app(Arc::new(MockConversationSource::new()));
        let response = post_event(router, "{not json").await;
        assert_eq!(response, SubscriptionResponse::dropped());
    }

    #[tokio::test]
    async fn test_actor_failure_is_dropped() {
        let source = Arc::new(MockConversationSource::new());
        let (router, state) = app(source.clone());
        let id = CorrelationId::new("abc");
        source.fail(&id);
        let session = Arc::new(RecordingSession::new(id.clone()));
        state.open_session(session.clone());

        let response = post_event(router, json!({"data": {"id": "abc"}}).to_string()).await;
        assert_eq!(response, SubscriptionResponse::dropped());
        assert!(session.messages().is_empty());
    }
}
