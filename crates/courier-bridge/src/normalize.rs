//! Turn filtering and content normalization.

use courier_types::{DisplayMessage, Role, Turn, TurnContent, USER_NAME};

use crate::error::{BridgeError, Result};

/// Pick the text to render from a turn body.
///
/// A flat string is used as-is. For a block list, only the first block
/// typed `text` counts; later text blocks are ignored.
pub fn extract_text(content: &TurnContent) -> Result<&str> {
    match content {
        TurnContent::Text(text) => Ok(text),
        TurnContent::Blocks(blocks) => blocks
            .iter()
            .find(|block| block.is_text())
            .and_then(|block| block.text.as_deref())
            .ok_or(BridgeError::NoTextContent),
        TurnContent::Empty => Err(BridgeError::NoTextContent),
    }
}

/// Whether a turn is ever shown to the user.
///
/// System prompts are hidden, and so is anything authored as `user`: the
/// human already saw their own input. The check is on the author name, not
/// the role, so approver and tool turns still come through.
pub fn is_displayable(turn: &Turn) -> bool {
    turn.role != Role::System && turn.name != USER_NAME
}

/// Normalize a turn into the message a session renders.
pub fn to_display_message(turn: &Turn) -> Result<DisplayMessage> {
    let content = extract_text(&turn.content)?;
    Ok(DisplayMessage::new(content, turn.name.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_types::ContentBlock;

    #[test]
    fn test_flat_string_used_as_is() {
        let content = TurnContent::from("hi");
        assert_eq!(extract_text(&content).unwrap(), "hi");
    }

    #[test]
    fn test_first_text_block_wins() {
        let content = TurnContent::Blocks(vec![
            ContentBlock::new("image"),
            ContentBlock::text("hi"),
            ContentBlock::text("second"),
        ]);
        assert_eq!(extract_text(&content).unwrap(), "hi");
    }

    #[test]
    fn test_no_text_block_is_an_error() {
        let content = TurnContent::Blocks(vec![ContentBlock::new("image")]);
        assert!(matches!(
            extract_text(&content),
            Err(BridgeError::NoTextContent)
        ));
    }

    #[test]
    fn test_text_block_without_text_is_an_error() {
        let content = TurnContent::Blocks(vec![ContentBlock::new("text"), ContentBlock::text("x")]);
        assert!(matches!(
            extract_text(&content),
            Err(BridgeError::NoTextContent)
        ));
    }

    #[test]
    fn test_empty_content_is_an_error() {
        assert!(extract_text(&TurnContent::Empty).is_err());
        assert!(extract_text(&TurnContent::Blocks(Vec::new())).is_err());
    }

    #[test]
    fn test_filtering() {
        assert!(!is_displayable(&Turn::new(Role::System, "x", "ignored")));
        assert!(is_displayable(&Turn::tool("approver", "approved")));
        assert!(!is_displayable(&Turn::new(Role::Assistant, "user", "echo")));
        assert!(is_displayable(&Turn::new(Role::User, "approver", "yes")));
    }

    #[test]
    fn test_display_message_carries_author() {
        let turn = Turn::assistant(
            "planner",
            vec![ContentBlock::new("image"), ContentBlock::text("plan ready")],
        );
        let message = to_display_message(&turn).unwrap();
        assert_eq!(message, DisplayMessage::new("plan ready", "planner"));
    }
}
