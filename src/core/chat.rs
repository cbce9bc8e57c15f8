//! Chat engine
//!
//! The ChatEngine turns a conversation into one reply:
//! 1. Sizes the reply from the last user message
//! 2. Formats the prompt from the instruction and the recent window
//! 3. Calls the inference gateway with the configured token budget
//! 4. Extracts the reply text from the raw output

use std::sync::Arc;

use async_trait::async_trait;

use crate::conversation::{self, Message};
use crate::providers::{InferenceGateway, ProviderError};

use super::prompt::{extract_response, format_prompt};

/// Errors while producing a reply
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("No conversation provided")]
    EmptyConversation,

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Error sending request: {0}")]
    Transport(String),

    #[error("Unexpected response format from the server.")]
    UnexpectedResponse,
}

/// Anything that can produce the next reply for a conversation
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn reply(&self, instruction: &str, history: &[Message]) -> Result<String, ChatError>;
}

/// In-process backend wrapping an inference gateway
pub struct ChatEngine {
    gateway: Arc<dyn InferenceGateway>,
    max_tokens: u32,
}

impl ChatEngine {
    pub fn new(gateway: Arc<dyn InferenceGateway>, max_tokens: u32) -> Self {
        Self {
            gateway,
            max_tokens,
        }
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}

#[async_trait]
impl ChatBackend for ChatEngine {
    async fn reply(&self, instruction: &str, history: &[Message]) -> Result<String, ChatError> {
        if history.is_empty() {
            return Err(ChatError::EmptyConversation);
        }

        let target_length = conversation::target_length(conversation::last_user_message(history));
        let prompt = format_prompt(instruction, history, target_length);

        let raw = self.gateway.infer(&prompt, self.max_tokens).await?;
        let reply = extract_response(&raw);

        tracing::info!(target_length, "AI response: {}", reply);
        Ok(reply)
    }
}
