// handlers/protected/sessions.rs - logged workouts

use axum::extract::{Path, State};
use axum::Extension;
use serde::Serialize;

use super::routines::Message;
use crate::database::models::{SessionDetail, WorkoutSession};
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthUser};
use crate::services::sessions::{SessionChanges, SessionDraft};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SessionSaved {
    pub message: &'static str,
    pub session: WorkoutSession,
}

/// GET /api/sessions - newest first, each with its sets and exercise names
pub async fn list(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<Vec<SessionDetail>> {
    Ok(ApiResponse::success(state.sessions().list(user.id()).await?))
}

/// POST /api/sessions - only sets marked completed are stored
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(draft): ApiJson<SessionDraft>,
) -> ApiResult<SessionSaved> {
    let session = state.sessions().create(user.id(), draft).await?;
    Ok(ApiResponse::created(SessionSaved {
        message: "Sesión guardada",
        session,
    }))
}

/// PUT /api/sessions/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(changes): ApiJson<SessionChanges>,
) -> ApiResult<SessionSaved> {
    let session = state
        .sessions()
        .update(user.id(), &id, changes.into_patch())
        .await?
        .ok_or_else(|| ApiError::not_found("Sesión no encontrada"))?;

    Ok(ApiResponse::success(SessionSaved {
        message: "Sesión actualizada correctamente",
        session,
    }))
}

/// DELETE /api/sessions/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Message> {
    state.sessions().delete(user.id(), &id).await?;
    Ok(ApiResponse::success(Message {
        message: "Sesión eliminada correctamente",
    }))
}
