use axum::extract::State;
use axum::Extension;
use serde::Deserialize;

use crate::ai::schema::ChatReply;
use crate::ai::ChatMessage;
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Option<Vec<ChatMessage>>,
}

/// POST /api/ai/chat - one conversational turn with the coach
///
/// Replies `{role: "assistant", content, routine}` where `routine` is a
/// suggested plan or null.
pub async fn post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(body): ApiJson<ChatRequest>,
) -> ApiResult<ChatReply> {
    let messages = body
        .messages
        .ok_or_else(|| ApiError::bad_request("Formato de mensajes inválido"))?;

    tracing::info!("chat request from {} with {} message(s)", user.id(), messages.len());

    let reply = state.coach.chat(&messages).await?;
    Ok(ApiResponse::success(reply))
}
