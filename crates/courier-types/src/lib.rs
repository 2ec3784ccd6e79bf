//! Shared types for the Courier session bridge.
//!
//! - [`CorrelationId`] ties a live session to its durable conversation
//! - [`InputEvent`] is the envelope published for every user message
//! - [`ConversationSnapshot`] and [`Turn`] model the conversation record read back from the actor
//! - [`DisplayMessage`] is what a live session finally renders

pub mod event;
pub mod id;
pub mod message;

pub use event::{CONTENT_TYPE, EventType, InputEvent, PARTITION_KEY, Topic};
pub use id::CorrelationId;
pub use message::{
    ContentBlock, ConversationSnapshot, DisplayMessage, Role, TEXT_BLOCK, Turn, TurnContent,
    USER_NAME,
};
