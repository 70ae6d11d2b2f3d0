// handlers/protected/training.rs - today's plan and per-set RPE feedback

use axum::extract::State;
use axum::Extension;
use serde::Deserialize;

use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiQuery, ApiResponse, ApiResult, AuthUser};
use crate::services::training::{FeedbackRequest, FeedbackResponse, TodayPlan};
use crate::state::AppState;
use crate::types::{is_present, is_truthy};

#[derive(Debug, Default, Deserialize)]
pub struct TodayQuery {
    #[serde(default, rename = "routineId")]
    pub routine_id: Option<String>,
}

/// GET /api/training/today[?routineId=] - day 1 of the newest (or chosen) routine
pub async fn today(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiQuery(query): ApiQuery<TodayQuery>,
) -> ApiResult<TodayPlan> {
    let routine_id = query.routine_id.as_deref().filter(|id| !id.is_empty());

    // An unreadable routine list is reported as having no routine
    let routine = match state.routines().current(user.id(), routine_id).await {
        Ok(routine) => routine,
        Err(e) => {
            tracing::warn!("could not load today's routine for {}: {}", user.id(), e);
            None
        }
    };

    Ok(ApiResponse::success(TodayPlan::from_routine(routine.as_ref())))
}

/// POST /api/training/feedback - load suggestion from a reported RPE
pub async fn feedback(
    Extension(user): Extension<AuthUser>,
    ApiJson(body): ApiJson<FeedbackRequest>,
) -> ApiResult<FeedbackResponse> {
    let rpe = match body.rpe.as_ref() {
        Some(rpe) if is_truthy(body.exercise_id.as_ref()) && is_present(Some(rpe)) => rpe.value(),
        _ => return Err(ApiError::bad_request("Faltan datos obligatorios (exercise_id, rpe)")),
    };

    tracing::debug!(
        "feedback from {}: rpe {} (session {:?}, weight {:?}, reps {:?})",
        user.id(),
        rpe,
        body.session_id,
        body.weight,
        body.reps
    );
    Ok(ApiResponse::success(FeedbackResponse::for_rpe(rpe)))
}
