use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Liveness {
    pub status: &'static str,
    pub supabase_ready: bool,
    pub ia_ready: bool,
}

/// GET / - liveness probe with credential readiness flags
pub async fn get(State(state): State<AppState>) -> Json<Liveness> {
    Json(Liveness {
        status: "GymAI Coach Backend Online",
        supabase_ready: state.store_ready(),
        ia_ready: state.ai_ready(),
    })
}
