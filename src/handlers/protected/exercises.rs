// handlers/protected/exercises.rs - the caller's exercise catalogue

use axum::extract::{Path, State};
use axum::Extension;
use serde::Deserialize;

use super::routines::Message;
use crate::database::models::{Exercise, ExercisePatch, NewExercise};
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateExercise {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub muscle_group: Option<String>,
    #[serde(default)]
    pub equipment: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
}

/// GET /api/exercises - ordered by name
pub async fn list(State(state): State<AppState>, Extension(user): Extension<AuthUser>) -> ApiResult<Vec<Exercise>> {
    Ok(ApiResponse::success(state.exercises().list(user.id()).await?))
}

/// POST /api/exercises - responds with the stored row
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(body): ApiJson<CreateExercise>,
) -> ApiResult<Exercise> {
    let name = body
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("El nombre del ejercicio es obligatorio"))?;

    let exercise = state
        .exercises()
        .create(NewExercise {
            user_id: user.id(),
            name,
            muscle_group: body.muscle_group,
            equipment: body.equipment,
            description: body.description,
            video_url: body.video_url,
        })
        .await?;
    Ok(ApiResponse::created(exercise))
}

/// PUT /api/exercises/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<ExercisePatch>,
) -> ApiResult<Message> {
    state.exercises().update(user.id(), &id, patch).await?;
    Ok(ApiResponse::success(Message { message: "Actualizado" }))
}

/// DELETE /api/exercises/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Message> {
    state.exercises().delete(user.id(), &id).await?;
    Ok(ApiResponse::success(Message { message: "Eliminado" }))
}
