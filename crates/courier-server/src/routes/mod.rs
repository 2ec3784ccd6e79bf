//! HTTP and WebSocket routes.

pub mod health;
pub mod subscribe;
pub mod ws;

pub use health::{HealthResponse, health_routes};
pub use subscribe::{
    EVENTS_ROUTE, Subscription, SubscriptionResponse, SubscriptionStatus, dapr_subscribe,
    events_handler,
};
pub use ws::{ClientMessage, ServerMessage, ws_handler};
