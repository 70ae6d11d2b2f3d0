// handlers/public/auth.rs - POST /api/auth/login, POST /api/auth/register
//
// Thin pass-through to the auth service. Credential problems come back with
// the service's own message; anything else is a generic 500.

use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::database::{AuthSession, GatewayError, Identity};
use crate::error::ApiError;
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::state::AppState;

const INTERNAL_ERROR: &str = "Error interno del servidor";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: Identity,
    pub session: AuthSession,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// POST /api/auth/login - exchange email and password for a session
pub async fn login(State(state): State<AppState>, ApiJson(body): ApiJson<LoginRequest>) -> ApiResult<LoginResponse> {
    match state.auth.sign_in_with_password(&body.email, &body.password).await {
        Ok(session) => Ok(ApiResponse::success(LoginResponse {
            user: session.user.clone(),
            session,
        })),
        Err(GatewayError::Rejected { message, .. }) => Err(ApiError::unauthorized(message)),
        Err(e) => {
            tracing::error!("login failed: {}", e);
            Err(ApiError::internal_server_error(INTERNAL_ERROR))
        }
    }
}

/// POST /api/auth/register - create an account; the name is stored as `full_name`
pub async fn register(State(state): State<AppState>, ApiJson(body): ApiJson<RegisterRequest>) -> ApiResult<Identity> {
    match state
        .auth
        .sign_up(&body.email, &body.password, body.name.as_deref())
        .await
    {
        Ok(user) => {
            tracing::info!("registered user {}", user.id);
            Ok(ApiResponse::created(user))
        }
        Err(GatewayError::Rejected { message, .. }) => Err(ApiError::bad_request(message)),
        Err(e) => {
            tracing::error!("registration failed: {}", e);
            Err(ApiError::internal_server_error(INTERNAL_ERROR))
        }
    }
}
