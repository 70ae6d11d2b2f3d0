use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use super::prompts::{self, RoutineBrief};
use super::retry::RetryPolicy;
use super::schema::{
    parse_reply, ChatPayload, ChatReply, InsufficientData, ProgressOutcome, ProgressReport, RoutinePlan,
};
use super::{ChatMessage, CompletionRequest, LanguageModel, ModelError};
use crate::database::models::{Profile, SessionDetail};
use crate::types::Numeric;

/// Only the most recent turns are forwarded to the model
pub const CHAT_HISTORY_LIMIT: usize = 10;
pub const DEFAULT_ROUTINE_DAYS: u32 = 3;

const CHAT_TEMPERATURE: f32 = 0.7;
const CHAT_MAX_TOKENS: u32 = 2000;
const ROUTINE_TEMPERATURE: f32 = 0.7;
const ANALYSIS_TEMPERATURE: f32 = 0.5;

#[derive(Debug, Error)]
pub enum CoachError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Días insuficientes generados ({got}/{wanted})")]
    IncompletePlan { got: usize, wanted: u32 },
}

/// Builds prompts, calls the model under the retry policy and parses replies
#[derive(Clone)]
pub struct Coach {
    model: Arc<dyn LanguageModel>,
    retry: RetryPolicy,
}

impl Coach {
    pub fn new(model: Arc<dyn LanguageModel>, retry: RetryPolicy) -> Self {
        Self { model, retry }
    }

    pub async fn chat(&self, history: &[ChatMessage]) -> Result<ChatReply, CoachError> {
        let recent = &history[history.len().saturating_sub(CHAT_HISTORY_LIMIT)..];

        let mut messages = Vec::with_capacity(recent.len() + 1);
        messages.push(ChatMessage::system(prompts::CHAT_SYSTEM_PROMPT));
        messages.extend_from_slice(recent);

        let request = CompletionRequest {
            messages,
            temperature: CHAT_TEMPERATURE,
            max_tokens: Some(CHAT_MAX_TOKENS),
        };

        let payload: ChatPayload = self
            .retry
            .run(|| async {
                let text = self.model.complete(&request).await?;
                Ok::<_, CoachError>(parse_reply(&text)?)
            })
            .await?;

        tracing::info!(
            "chat reply ready (routine suggested: {})",
            payload.suggested_routine.is_some()
        );

        Ok(ChatReply {
            role: "assistant",
            content: payload.content,
            routine: payload.suggested_routine,
        })
    }

    /// Generate a routine with exactly `brief.days` days; short plans count as failures and are retried
    pub async fn generate_routine(&self, brief: &RoutineBrief) -> Result<RoutinePlan, CoachError> {
        tracing::info!(
            "generating routine: {} days, goal {}, level {}",
            brief.days,
            brief.goal,
            brief.level
        );

        let request = CompletionRequest {
            messages: vec![
                ChatMessage::system(prompts::ROUTINE_SYSTEM_PROMPT),
                ChatMessage::user(prompts::routine_prompt(brief)),
            ],
            temperature: ROUTINE_TEMPERATURE,
            max_tokens: None,
        };

        let plan = self
            .retry
            .run(|| async {
                let text = self.model.complete(&request).await?;
                let plan: RoutinePlan = parse_reply(&text)?;
                if plan.day_count() < brief.days as usize {
                    return Err(CoachError::IncompletePlan {
                        got: plan.day_count(),
                        wanted: brief.days,
                    });
                }
                Ok::<_, CoachError>(plan)
            })
            .await?;

        tracing::info!("routine generated with {} days", plan.day_count());
        Ok(plan)
    }

    /// Analyse recent sessions; with no history the model is not consulted
    pub async fn analyze_progress(
        &self,
        profile: &Profile,
        history: &[SessionDetail],
    ) -> Result<ProgressOutcome, CoachError> {
        if history.is_empty() {
            return Ok(ProgressOutcome::InsufficientData(InsufficientData::default()));
        }

        let request = CompletionRequest {
            messages: vec![ChatMessage::user(prompts::progress_prompt(profile, history))],
            temperature: ANALYSIS_TEMPERATURE,
            max_tokens: None,
        };

        let report: ProgressReport = self
            .retry
            .run(|| async {
                let text = self.model.complete(&request).await?;
                Ok::<_, CoachError>(parse_reply(&text)?)
            })
            .await?;

        tracing::info!("progress analysis complete: {:?}", report.status);
        Ok(ProgressOutcome::Report(report))
    }
}

/// Requested day count: leading integer of a number or text, else the default
pub fn requested_days(days: Option<&Value>) -> u32 {
    days.and_then(|v| serde_json::from_value::<Numeric>(v.clone()).ok())
        .and_then(|n| n.leading_integer())
        .filter(|n| *n > 0)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(DEFAULT_ROUTINE_DAYS)
}
