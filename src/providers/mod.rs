//! Inference backend integrations

mod ollama;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::Config;

pub use ollama::OllamaProvider;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Text in, text out. Implementations block until the backend has produced a
/// bounded completion.
#[async_trait]
pub trait InferenceGateway: Send + Sync {
    async fn infer(&self, prompt: &str, max_tokens: u32) -> Result<String, ProviderError>;
}

pub enum Provider {
    Ollama(OllamaProvider),
}

impl Provider {
    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        match config.provider.to_lowercase().as_str() {
            "ollama" => Ok(Provider::Ollama(OllamaProvider::new(
                config.ollama_url.clone(),
                config.model.clone(),
                config.request_timeout(),
            )?)),
            other => Err(ProviderError::UnknownProvider(other.to_string())),
        }
    }

    /// Verify the backend is reachable and the model is available
    pub async fn check(&self) -> Result<(), ProviderError> {
        match self {
            Provider::Ollama(p) => p.check().await,
        }
    }
}

#[async_trait]
impl InferenceGateway for Provider {
    async fn infer(&self, prompt: &str, max_tokens: u32) -> Result<String, ProviderError> {
        match self {
            Provider::Ollama(p) => p.generate(prompt, max_tokens).await,
        }
    }
}
