use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::database::{GatewayError, Identity};
use crate::error::ApiError;
use crate::state::AppState;

const MISSING_HEADER: &str = "Se requiere iniciar sesión para acceder a este recurso";
const MALFORMED_TOKEN: &str = "Token con formato incorrecto o no encontrado";
const INVALID_SESSION: &str = "Tu sesión ha expirado o el token es inválido";
const VERIFICATION_FAILED: &str = "Ocurrió un error al verificar la identidad del usuario";

/// Authenticated caller, as resolved by the auth service
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub identity: Identity,
}

impl AuthUser {
    pub fn id(&self) -> Uuid {
        self.identity.id
    }
}

/// Bearer-token guard: resolves the token with the auth service and injects
/// `AuthUser` into the request extensions
pub async fn auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers)?;

    let identity = match state.auth.get_user(token).await {
        Ok(Some(identity)) => identity,
        Ok(None) | Err(GatewayError::Rejected { .. }) => {
            tracing::warn!("rejected an invalid or expired access token");
            return Err(ApiError::unauthorized(INVALID_SESSION));
        }
        Err(e) => {
            tracing::error!("could not verify access token: {}", e);
            return Err(ApiError::internal_server_error(VERIFICATION_FAILED));
        }
    };

    request.extensions_mut().insert(AuthUser { identity });
    Ok(next.run(request).await)
}

/// Token from an `Authorization: Bearer <token>` header
fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers.get(header::AUTHORIZATION).ok_or_else(|| {
        tracing::warn!("request without Authorization header");
        ApiError::unauthorized(MISSING_HEADER)
    })?;

    let token = value
        .to_str()
        .ok()
        .and_then(|raw| raw.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::unauthorized(MALFORMED_TOKEN))?;

    Ok(token)
}
