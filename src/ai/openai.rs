use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::retry::RetryPolicy;
use super::{ChatMessage, CompletionRequest, LanguageModel, ModelError};
use crate::config::AiConfig;

/// OpenAI chat-completions client.
///
/// Requests carry a fixed timeout, and transient failures (transport errors,
/// 408/409/429, 5xx) are retried here before the caller sees them.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: Client,
    endpoint: String,
    api_key: String,
    model: String,
    transport_retry: RetryPolicy,
}

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: &str,
        timeout: Duration,
        max_retries: u32,
    ) -> Result<Self, ModelError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.into(),
            model: model.into(),
            transport_retry: RetryPolicy::new(max_retries, Duration::from_millis(500)),
        })
    }

    pub fn from_config(config: &AiConfig) -> Result<Self, ModelError> {
        Self::new(
            config.api_key.clone().unwrap_or_default(),
            config.model.clone(),
            &config.base_url,
            config.timeout(),
            config.max_retries,
        )
    }

    /// Shorten the transport backoff (tests)
    pub fn with_transport_retry(mut self, policy: RetryPolicy) -> Self {
        self.transport_retry = policy;
        self
    }

    async fn send(&self, request: &CompletionRequest) -> Result<String, ModelError> {
        let body = ChatCompletionBody {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: ResponseFormat { kind: "json_object" },
        };

        let response = self
            .http
            .post(&self.endpoint)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ModelError::Status {
                status: status.as_u16(),
                message: upstream_message(&text).unwrap_or_else(|| status.to_string()),
            });
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&text)
            .map_err(|e| ModelError::Transport(format!("undecodable completion: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ModelError::Empty)
    }
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ModelError> {
        tracing::debug!(
            "chat completion: model={} messages={}",
            self.model,
            request.messages.len()
        );
        self.transport_retry
            .run_when(|| self.send(request), ModelError::is_transient)
            .await
    }
}

// {"error": {"message": "..."}}
fn upstream_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .pointer("/error/message")
        .and_then(Value::as_str)
        .map(str::to_string)
}
