//! Conversation types and state management

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Floor for the requested reply length, in characters
pub const MIN_TARGET_LENGTH: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Speaker of a message. Rendered as `Human` / `AI` both in prompts and on
/// the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Human", alias = "user", alias = "human")]
    User,
    #[serde(rename = "AI", alias = "assistant", alias = "ai")]
    Assistant,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "Human",
            Role::Assistant => "AI",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Append-only message log owned by a single personality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            messages: Vec::new(),
        }
    }

    pub fn add(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push(Message {
            role,
            content: content.into(),
        });
    }

    pub fn history(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

/// Content of the most recent user message, or `""` if there is none yet
pub fn last_user_message(messages: &[Message]) -> &str {
    messages
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
        .unwrap_or("")
}

/// `max(round(chars * 1.5), 30)`, with halves rounded to the even neighbour
pub fn target_length(last_user_message: &str) -> usize {
    let chars = last_user_message.chars().count();
    let scaled = (chars as f64 * 1.5).round_ties_even() as usize;
    scaled.max(MIN_TARGET_LENGTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_length_floor() {
        assert_eq!(target_length(""), 30);
        assert_eq!(target_length(&"x".repeat(10)), 30);
    }

    #[test]
    fn test_target_length_scales() {
        assert_eq!(target_length(&"x".repeat(40)), 60);
        // 21 * 1.5 = 31.5 rounds up to the even 32
        assert_eq!(target_length(&"x".repeat(21)), 32);
    }

    #[test]
    fn test_target_length_halves_round_to_even() {
        // 34.5 and 40.5 round down
        assert_eq!(target_length(&"x".repeat(23)), 34);
        assert_eq!(target_length(&"x".repeat(27)), 40);
        assert_eq!(target_length(&"x".repeat(25)), 38);
    }

    #[test]
    fn test_target_length_counts_chars_not_bytes() {
        assert_eq!(target_length(&"é".repeat(40)), 60);
    }

    #[test]
    fn test_last_user_message() {
        let mut conversation = Conversation::new();
        assert_eq!(last_user_message(conversation.history()), "");

        conversation.add(Role::User, "first");
        conversation.add(Role::Assistant, "reply");
        conversation.add(Role::User, "second");
        conversation.add(Role::Assistant, "another reply");

        assert_eq!(last_user_message(conversation.history()), "second");
        assert_eq!(conversation.len(), 4);
    }

    #[test]
    fn test_history_keeps_insertion_order_and_duplicates() {
        let mut conversation = Conversation::new();
        conversation.add(Role::User, "hi");
        conversation.add(Role::User, "hi");
        conversation.add(Role::Assistant, "hello");

        let contents: Vec<&str> = conversation
            .history()
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, vec!["hi", "hi", "hello"]);
    }

    #[test]
    fn test_role_wire_format() {
        let json = serde_json::to_string(&Message::user("hi")).unwrap();
        assert_eq!(json, r#"{"role":"Human","content":"hi"}"#);

        let parsed: Message = serde_json::from_str(r#"{"role":"assistant","content":"yo"}"#).unwrap();
        assert_eq!(parsed, Message::assistant("yo"));

        let parsed: Message = serde_json::from_str(r#"{"role":"AI","content":"yo"}"#).unwrap();
        assert_eq!(parsed.role, Role::Assistant);
    }
}
