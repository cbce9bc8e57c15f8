//! API routes

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::config::prompts_builtin;
use crate::conversation::Message;
use crate::core::{ChatBackend, ChatError};
use crate::personality::PersonalityCatalog;

/// State shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn ChatBackend>,
    pub catalog: Arc<PersonalityCatalog>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub conversation: Vec<Message>,
    /// Personality key or a full instruction text
    #[serde(default = "default_personality")]
    pub personality: String,
}

fn default_personality() -> String {
    prompts_builtin::DEFAULT_KEY.into()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let status = match self {
            ChatError::EmptyConversation => StatusCode::BAD_REQUEST,
            _ => StatusCode::BAD_GATEWAY,
        };
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ChatError> {
    if request.conversation.is_empty() {
        return Err(ChatError::EmptyConversation);
    }

    let instruction = state.catalog.resolve_instruction(&request.personality);
    tracing::info!(
        messages = request.conversation.len(),
        "personality: {}",
        request.personality
    );

    let response = state
        .backend
        .reply(&instruction, &request.conversation)
        .await?;

    Ok(Json(ChatResponse { response }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat))
}
