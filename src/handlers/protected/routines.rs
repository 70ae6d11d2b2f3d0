// handlers/protected/routines.rs - /api/routines and /api/routines/:id

use axum::extract::{Path, State};
use axum::Extension;
use serde::Serialize;

use crate::database::models::{Routine, RoutineDetail};
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthUser};
use crate::services::routines::RoutineDraft;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RoutineCreated {
    pub message: &'static str,
    pub routine: Routine,
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub message: &'static str,
}

/// GET /api/routines - caller's routines, newest first, with days and exercises
pub async fn list(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<Vec<RoutineDetail>> {
    let routines = state.routines().list(user.id()).await?;
    Ok(ApiResponse::success(routines))
}

/// GET /api/routines/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<RoutineDetail> {
    state
        .routines()
        .get(user.id(), &id)
        .await?
        .map(ApiResponse::success)
        .ok_or_else(|| ApiError::not_found("Rutina no encontrada"))
}

/// POST /api/routines - header, days and exercise links in one request
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(draft): ApiJson<RoutineDraft>,
) -> ApiResult<RoutineCreated> {
    let routine = state.routines().create(user.id(), draft).await?;
    Ok(ApiResponse::created(RoutineCreated {
        message: "Rutina creada exitosamente",
        routine,
    }))
}

/// DELETE /api/routines/:id - succeeds whether or not the routine existed
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Message> {
    state.routines().delete(user.id(), &id).await?;
    Ok(ApiResponse::success(Message {
        message: "Rutina eliminada correctamente",
    }))
}
