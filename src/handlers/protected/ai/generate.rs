use axum::extract::State;
use axum::Extension;
use serde::Deserialize;
use serde_json::Value;

use crate::ai::coach::requested_days;
use crate::ai::prompts::RoutineBrief;
use crate::ai::schema::RoutinePlan;
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub goal: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    /// Number or text; only the leading integer is read
    #[serde(default)]
    pub days: Option<Value>,
    #[serde(default)]
    pub equipment: Option<String>,
}

impl GenerateRequest {
    fn brief(&self) -> RoutineBrief {
        let or = |field: &Option<String>, default: &str| {
            field
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(default)
                .to_string()
        };
        RoutineBrief {
            goal: or(&self.goal, "General"),
            level: or(&self.level, "Principiante"),
            days: requested_days(self.days.as_ref()),
            equipment: or(&self.equipment, "Gimnasio completo"),
        }
    }
}

/// POST /api/ai/generate-routine - full multi-day plan, returned as the model wrote it
pub async fn post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ApiJson(body): ApiJson<GenerateRequest>,
) -> ApiResult<RoutinePlan> {
    let brief = body.brief();
    tracing::info!("routine generation for {}: {} day(s)", user.id(), brief.days);

    let plan = state.coach.generate_routine(&brief).await.map_err(|e| {
        tracing::error!("routine generation failed: {}", e);
        ApiError::internal_with_details("No se pudo generar la rutina completa", e)
    })?;

    Ok(ApiResponse::success(plan))
}
