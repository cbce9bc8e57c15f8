//! Ollama provider implementation

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::ProviderError;

pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Debug, Serialize)]
struct ShowRequest<'a> {
    model: &'a str,
}

impl OllamaProvider {
    pub fn new(base_url: String, model: String, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        })
    }

    pub async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String, ProviderError> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                num_predict: max_tokens,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::InvalidResponse(format!(
                "{}: {}",
                status, body
            )));
        }

        let generated: GenerateResponse = response.json().await?;
        tracing::debug!(model = %self.model, chars = generated.response.len(), "generation finished");

        Ok(generated.response)
    }

    pub async fn check(&self) -> Result<(), ProviderError> {
        let response = self
            .client
            .post(format!("{}/api/show", self.base_url))
            .json(&ShowRequest { model: &self.model })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::InvalidResponse(format!(
                "model '{}' is not available ({})",
                self.model,
                response.status()
            )));
        }

        Ok(())
    }
}
