// Coaching AI: prompt building, the language-model client seam, retries and
// typed parsing of the model's JSON replies.
pub mod coach;
pub mod openai;
pub mod prompts;
pub mod retry;
pub mod schema;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use coach::{Coach, CoachError};
pub use openai::OpenAiClient;
pub use retry::RetryPolicy;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// One chat completion; replies are always requested as a JSON object
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model service returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("model transport error: {0}")]
    Transport(String),

    #[error("model returned no completion")]
    Empty,

    #[error("invalid JSON from model: {0}")]
    InvalidJson(String),
}

impl ModelError {
    /// Failures the transport layer retries on its own
    pub fn is_transient(&self) -> bool {
        match self {
            ModelError::Transport(_) => true,
            ModelError::Status { status, .. } => matches!(status, 408 | 409 | 429) || *status >= 500,
            ModelError::Empty | ModelError::InvalidJson(_) => false,
        }
    }
}

impl From<reqwest::Error> for ModelError {
    fn from(err: reqwest::Error) -> Self {
        ModelError::Transport(err.to_string())
    }
}

/// Hosted language model
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Text of the first completion choice
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ModelError>;
}
