//! Session-actor event bridge.
//!
//! Connects live interactive sessions to a durable conversation workflow
//! over a publish/subscribe bus:
//!
//! - [`OutboundPublisher`] turns user input into a correlated [`InputEvent`]
//! - [`UpdateHandler`] reacts to update notifications by fetching the
//!   conversation, slicing off the turns a session has not seen, and
//!   delivering them in order
//!
//! Delivery is at-most-once per session: the [`CursorStore`] serializes
//! notification handling per correlation id and advances the cursor before
//! any turn is delivered.
//!
//! # Example
//!
//! ```rust,ignore
//! use courier_bridge::{CursorStore, UpdateHandler};
//!
//! let handler = UpdateHandler::new(sessions, actor, Arc::new(CursorStore::new()))
//!     .with_actor_timeout(Duration::from_secs(5));
//!
//! let report = handler.on_update(&notification).await?;
//! ```
//!
//! [`InputEvent`]: courier_types::InputEvent

mod cursor;
mod error;
mod inbound;
mod normalize;
mod notification;
mod publisher;
mod session;
mod source;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use cursor::{CursorStore, DEFAULT_INITIAL_CURSOR, DeliveryCursor};
pub use error::{BridgeError, Result};
pub use inbound::{DEFAULT_ACTOR_TIMEOUT, DeliveryReport, UpdateHandler};
pub use normalize::{extract_text, is_displayable, to_display_message};
pub use notification::UpdateNotification;
pub use publisher::{EventPublisher, OutboundPublisher};
pub use session::{LiveSession, SessionHandle, SessionResolver};
pub use source::{ConversationSource, fetch_conversation};
