//! Conversation record types as read back from the workflow actor.

use serde::{Deserialize, Serialize};

/// Block discriminator for displayable text.
pub const TEXT_BLOCK: &str = "text";

/// Author label the workflow gives to turns echoing the human's own input.
pub const USER_NAME: &str = "user";

/// Role in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
    /// Any role this bridge has no special handling for.
    #[serde(other)]
    Other,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
            Self::Other => "other",
        }
    }
}

/// One block of a multi-part message body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    /// Block discriminator (`text`, `image`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Fields of non-text blocks (image URLs and the like), kept verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ContentBlock {
    /// Create a block of the given kind with no text.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            text: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Create a text block.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new(TEXT_BLOCK)
        }
    }

    pub fn is_text(&self) -> bool {
        self.kind == TEXT_BLOCK
    }
}

/// Body of a turn: either a flat string or an ordered list of blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum TurnContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
    /// `null` or absent content (e.g. a turn that only carries tool calls).
    #[default]
    Empty,
}

impl From<&str> for TurnContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for TurnContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<ContentBlock>> for TurnContent {
    fn from(blocks: Vec<ContentBlock>) -> Self {
        Self::Blocks(blocks)
    }
}

/// One entry in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    /// Author or speaker label (`user`, `approver`, an agent name, ...).
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub content: TurnContent,
}

impl Turn {
    pub fn new(role: Role, name: impl Into<String>, content: impl Into<TurnContent>) -> Self {
        Self {
            role,
            name: name.into(),
            content: content.into(),
        }
    }

    /// A system prompt turn.
    pub fn system(content: impl Into<TurnContent>) -> Self {
        Self::new(Role::System, "system", content)
    }

    /// The human's own input, as the workflow records it.
    pub fn user(content: impl Into<TurnContent>) -> Self {
        Self::new(Role::User, USER_NAME, content)
    }

    /// A reply from a named agent.
    pub fn assistant(name: impl Into<String>, content: impl Into<TurnContent>) -> Self {
        Self::new(Role::Assistant, name, content)
    }

    /// A tool or approver response.
    pub fn tool(name: impl Into<String>, content: impl Into<TurnContent>) -> Self {
        Self::new(Role::Tool, name, content)
    }
}

/// Full point-in-time conversation record.
///
/// Turns are append-only: between two snapshots of the same conversation,
/// the earlier one is always a prefix of the later one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConversationSnapshot {
    #[serde(default)]
    pub messages: Vec<Turn>,
}

impl ConversationSnapshot {
    pub fn new(messages: Vec<Turn>) -> Self {
        Self { messages }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append a turn, returning the extended snapshot.
    pub fn with_turn(mut self, turn: Turn) -> Self {
        self.messages.push(turn);
        self
    }
}

/// A normalized turn, ready to render in a live session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayMessage {
    pub content: String,
    pub author: String,
}

impl DisplayMessage {
    pub fn new(content: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            author: author.into(),
        }
    }
}
