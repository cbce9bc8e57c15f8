//! Chat session
//!
//! Holds the personality catalog and the active selection, and drives the
//! per-personality `Idle -> AwaitingReply -> Idle` cycle. Submission and
//! completion are separate steps so a UI can run the backend call on its own
//! task and hand the result back later.

use crate::conversation::{Message, Role};
use crate::personality::{CatalogError, ChatState, Personality, PersonalityCatalog};

use super::chat::ChatError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Message is empty")]
    EmptyMessage,

    #[error("Still waiting for a reply from {0}")]
    Busy(String),

    #[error("Unknown personality: {0}")]
    UnknownPersonality(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Everything a backend needs to answer a submitted message
#[derive(Debug, Clone)]
pub struct PendingReply {
    pub key: String,
    pub instruction: String,
    pub history: Vec<Message>,
}

/// Outcome of a completed exchange, as shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Message(String),
    Error(String),
}

#[derive(Debug, Clone)]
pub struct ChatSession {
    catalog: PersonalityCatalog,
    active: usize,
}

impl ChatSession {
    /// Start with the first personality of the catalog selected
    pub fn new(catalog: PersonalityCatalog) -> Self {
        Self { catalog, active: 0 }
    }

    pub fn catalog(&self) -> &PersonalityCatalog {
        &self.catalog
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> Option<&Personality> {
        self.catalog.get(self.active)
    }

    /// History of the active personality, empty if the catalog is empty
    pub fn conversation(&self) -> &[Message] {
        self.active()
            .map(|p| p.conversation.history())
            .unwrap_or(&[])
    }

    pub fn is_awaiting(&self, key: &str) -> bool {
        self.catalog
            .by_key(key)
            .map_or(false, |p| p.state == ChatState::AwaitingReply)
    }

    /// Change which conversation is displayed and appended to next
    pub fn select(&mut self, index: usize) -> Result<&Personality, SessionError> {
        let personality = self
            .catalog
            .get(index)
            .ok_or_else(|| SessionError::UnknownPersonality(index.to_string()))?;
        self.active = index;
        Ok(personality)
    }

    pub fn add_personality(&mut self, key: &str, instruction: &str) -> Result<usize, SessionError> {
        let index = self.catalog.add(key, instruction)?;
        tracing::info!(key = key.trim(), "added personality");
        Ok(index)
    }

    /// Append a user message to the active conversation and mark it as
    /// awaiting a reply
    pub fn submit(&mut self, text: &str) -> Result<PendingReply, SessionError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SessionError::EmptyMessage);
        }

        let active = self.active;
        let personality = self
            .catalog
            .get_mut(active)
            .ok_or_else(|| SessionError::UnknownPersonality(active.to_string()))?;

        if personality.state == ChatState::AwaitingReply {
            return Err(SessionError::Busy(personality.profile.key.clone()));
        }

        personality.conversation.add(Role::User, text);
        personality.state = ChatState::AwaitingReply;
        tracing::debug!(
            key = %personality.profile.key,
            conversation = %personality.conversation.id,
            messages = personality.conversation.len(),
            "message submitted"
        );

        Ok(PendingReply {
            key: personality.profile.key.clone(),
            instruction: personality.profile.instruction.clone(),
            history: personality.conversation.history().to_vec(),
        })
    }

    /// Apply the backend outcome for a personality and return it to `Idle`.
    ///
    /// Failures are reported as reply text and are not appended to the
    /// conversation.
    pub fn complete(&mut self, key: &str, outcome: Result<String, ChatError>) -> Reply {
        let Some(personality) = self.catalog.by_key_mut(key) else {
            tracing::warn!(key, "reply for unknown personality dropped");
            return Reply::Error(SessionError::UnknownPersonality(key.to_string()).to_string());
        };
        personality.state = ChatState::Idle;

        match outcome {
            Ok(text) => {
                personality.conversation.add(Role::Assistant, text.as_str());
                Reply::Message(text)
            }
            Err(e) => {
                tracing::error!(key, "chat request failed: {}", e);
                Reply::Error(e.to_string())
            }
        }
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(PersonalityCatalog::with_builtins())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::prompts_builtin;
    use crate::core::chat::tests::FakeGateway;
    use crate::core::chat::{ChatBackend, ChatEngine};
    use crate::providers::ProviderError;
    use std::sync::Arc;

    async fn exchange(session: &mut ChatSession, backend: &dyn ChatBackend, text: &str) -> Reply {
        let pending = session.submit(text).unwrap();
        let outcome = backend.reply(&pending.instruction, &pending.history).await;
        session.complete(&pending.key, outcome)
    }

    fn select_key(session: &mut ChatSession, key: &str) {
        let index = session.catalog().position(key).unwrap();
        session.select(index).unwrap();
    }

    #[tokio::test]
    async fn test_exchange_appends_both_messages() {
        let gateway = Arc::new(FakeGateway::replying(r#"AI: {"response": "hey you"}"#));
        let engine = ChatEngine::new(gateway.clone(), 400);
        let mut session = ChatSession::default();

        let reply = exchange(&mut session, &engine, "hi").await;
        assert_eq!(reply, Reply::Message("hey you".to_string()));
        assert_eq!(
            session.conversation(),
            &[Message::user("hi"), Message::assistant("hey you")]
        );
        assert!(!session.is_awaiting("flirty"));

        let calls = gateway.calls.lock().unwrap();
        assert!(calls[0].0.starts_with(prompts_builtin::FLIRTY));
        assert!(calls[0].0.contains("Human: hi\n"));
        assert!(calls[0].0.ends_with("AI:"));
    }

    #[tokio::test]
    async fn test_gateway_failure_is_reported_not_appended() {
        let engine = ChatEngine::new(Arc::new(FakeGateway::failing("connection refused")), 400);
        let mut session = ChatSession::default();

        let reply = exchange(&mut session, &engine, "hi").await;
        match reply {
            Reply::Error(text) => assert!(text.contains("connection refused")),
            other => panic!("expected error reply, got {:?}", other),
        }
        assert_eq!(session.conversation(), &[Message::user("hi")]);
        assert!(!session.is_awaiting("flirty"));
    }

    #[test]
    fn test_submit_rejects_while_awaiting() {
        let mut session = ChatSession::default();
        let pending = session.submit("first").unwrap();
        assert_eq!(pending.key, "flirty");
        assert_eq!(pending.history, vec![Message::user("first")]);

        assert_eq!(
            session.submit("second").unwrap_err(),
            SessionError::Busy("flirty".to_string())
        );

        // Another personality is unaffected
        select_key(&mut session, "sassy");
        assert!(session.submit("hello").is_ok());
    }

    #[test]
    fn test_submit_rejects_empty() {
        let mut session = ChatSession::default();
        assert_eq!(session.submit("   ").unwrap_err(), SessionError::EmptyMessage);
        assert!(session.conversation().is_empty());
    }

    #[test]
    fn test_complete_after_switching_targets_origin() {
        let mut session = ChatSession::default();
        let pending = session.submit("hi").unwrap();
        select_key(&mut session, "romantic");

        session.complete(&pending.key, Ok("hello".to_string()));

        assert!(session.conversation().is_empty());
        let flirty = session.catalog().by_key("flirty").unwrap();
        assert_eq!(flirty.conversation.len(), 2);
    }

    #[test]
    fn test_complete_error_returns_to_idle() {
        let mut session = ChatSession::default();
        let pending = session.submit("hi").unwrap();
        let reply = session.complete(
            &pending.key,
            Err(ChatError::Provider(ProviderError::InvalidResponse("boom".into()))),
        );
        assert_eq!(
            reply,
            Reply::Error("Provider error: Invalid response: boom".to_string())
        );
        assert!(session.submit("again").is_ok());
    }

    #[test]
    fn test_add_and_switch_yields_empty_conversation() {
        let mut session = ChatSession::default();
        session.submit("hi").unwrap();

        let index = session.add_personality("poet", "Speak in verse.").unwrap();
        let selected = session.select(index).unwrap();
        assert_eq!(selected.profile.key, "poet");
        assert!(session.conversation().is_empty());

        assert!(matches!(
            session.add_personality("poet", "Again."),
            Err(SessionError::Catalog(CatalogError::Duplicate(_)))
        ));
        assert_eq!(session.catalog().len(), 11);
    }

    #[test]
    fn test_select_out_of_range() {
        let mut session = ChatSession::default();
        assert!(session.select(99).is_err());
        assert_eq!(session.active_index(), 0);
    }
}
