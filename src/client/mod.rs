//! HTTP client for the chat service

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::conversation::Message;
use crate::core::{ChatBackend, ChatError};
use crate::routes::ChatRequest;

/// Backend that forwards conversations to a running chat service
pub struct ChatClient {
    client: Client,
    url: String,
}

impl ChatClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ChatError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChatError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

/// Pull the reply out of a service response body
fn parse_reply(body: &serde_json::Value) -> Result<String, ChatError> {
    body.get("response")
        .and_then(|r| r.as_str())
        .map(str::to_string)
        .ok_or(ChatError::UnexpectedResponse)
}

#[async_trait]
impl ChatBackend for ChatClient {
    async fn reply(&self, instruction: &str, history: &[Message]) -> Result<String, ChatError> {
        let request = ChatRequest {
            conversation: history.to_vec(),
            personality: instruction.to_string(),
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
                .unwrap_or(body);
            return Err(ChatError::Transport(format!("{}: {}", status, detail)));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|_| ChatError::UnexpectedResponse)?;

        parse_reply(&body)
    }
}
