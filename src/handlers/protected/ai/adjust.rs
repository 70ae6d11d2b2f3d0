use axum::extract::State;
use axum::Extension;
use serde::Deserialize;
use serde_json::Value;

use crate::ai::schema::ProgressOutcome;
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

const FAILURE: &str = "Error analizando el progreso";

/// Sessions fed to the analysis
const HISTORY_WINDOW: usize = 5;

#[derive(Debug, Default, Deserialize)]
pub struct AdjustRequest {
    #[serde(default, rename = "routineId")]
    pub routine_id: Option<Value>,
}

/// POST /api/ai/adjust - progress analysis over the most recent sessions
pub async fn post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    body: Option<ApiJson<AdjustRequest>>,
) -> ApiResult<ProgressOutcome> {
    let routine_id = body.and_then(|ApiJson(b)| b.routine_id);
    tracing::info!("analysing progress for {} (routine {:?})", user.id(), routine_id);

    let profiles = state.profiles();
    let sessions = state.sessions();
    let (profile, history) = futures::try_join!(
        profiles.get(user.id()),
        sessions.recent(user.id(), HISTORY_WINDOW)
    )
    .map_err(|e| {
        tracing::error!("could not load training data: {}", e);
        ApiError::internal_with_details(FAILURE, e)
    })?;

    let outcome = state
        .coach
        .analyze_progress(&profile, &history)
        .await
        .map_err(|e| {
            tracing::error!("progress analysis failed: {}", e);
            ApiError::internal_with_details(FAILURE, e)
        })?;

    Ok(ApiResponse::success(outcome))
}
