//! Core chat components
//!
//! Prompt formatting, reply extraction, the chat engine that wraps the
//! inference gateway, and the session that drives each personality's
//! conversation.

mod chat;
pub mod prompt;
mod session;

pub use chat::{ChatBackend, ChatEngine, ChatError};
pub use session::{ChatSession, PendingReply, Reply};
