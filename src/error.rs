// HTTP API Error Types
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};

use crate::ai::{CoachError, ModelError};
use crate::database::GatewayError;

/// HTTP API error with a status code and a client-facing message.
///
/// Bodies are `{"error": message, "code": ...}`, plus `details` when the
/// underlying failure is worth surfacing.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    InvalidJson(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    InternalServerError {
        message: String,
        details: Option<String>,
    },
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::InvalidJson(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::NotFound(_) => 404,
            ApiError::InternalServerError { .. } => 500,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::InvalidJson(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::InternalServerError { message, .. } => message,
        }
    }

    pub fn details(&self) -> Option<&str> {
        match self {
            ApiError::InternalServerError { details, .. } => details.as_deref(),
            _ => None,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "error": self.message(),
            "code": self.error_code()
        });
        if let Some(details) = self.details() {
            body["details"] = json!(details);
        }
        body
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InternalServerError { .. } => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError {
            message: message.into(),
            details: None,
        }
    }

    /// 500 with a fixed message and the underlying failure as `details`
    pub fn internal_with_details(message: impl Into<String>, details: impl std::fmt::Display) -> Self {
        ApiError::InternalServerError {
            message: message.into(),
            details: Some(details.to_string()),
        }
    }
}

// Store failures surface their own message, as the store reported it
impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        tracing::error!("store error: {}", err);
        ApiError::internal_server_error(err.to_string())
    }
}

impl From<ModelError> for ApiError {
    fn from(err: ModelError) -> Self {
        tracing::error!("model error: {}", err);
        ApiError::internal_with_details("Error comunicando con la IA", err)
    }
}

impl From<CoachError> for ApiError {
    fn from(err: CoachError) -> Self {
        match err {
            CoachError::Model(e) => e.into(),
            other => {
                tracing::error!("coach error: {}", other);
                ApiError::internal_with_details("Error comunicando con la IA", other)
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid_json(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.details() {
            Some(details) => write!(f, "{}: {}", self.message(), details),
            None => write!(f, "{}", self.message()),
        }
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn details_only_appear_when_present() {
        let plain = ApiError::unauthorized("Tu sesión ha expirado o el token es inválido").to_json();
        assert_eq!(plain["error"], "Tu sesión ha expirado o el token es inválido");
        assert_eq!(plain["code"], "UNAUTHORIZED");
        assert!(plain.get("details").is_none());

        let detailed = ApiError::internal_with_details("Error analizando el progreso", "timeout").to_json();
        assert_eq!(detailed["details"], "timeout");
    }

    #[test]
    fn store_errors_keep_their_message() {
        let err: ApiError = GatewayError::Rejected {
            status: 409,
            message: "duplicate key value".into(),
        }
        .into();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.message(), "duplicate key value");
    }

    #[test]
    fn model_failures_are_500_with_details() {
        let err: ApiError = CoachError::IncompletePlan { got: 1, wanted: 3 }.into();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.details(), Some("Días insuficientes generados (1/3)"));
    }
}
