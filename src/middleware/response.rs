use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;

use crate::error::ApiError;

/// JSON response with an explicit status; the body is the data itself
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self {
            data,
            status_code: None,
        }
    }

    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self {
            data,
            status_code: Some(status_code),
        }
    }

    /// Create a 201 Created response
    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        match serde_json::to_value(&self.data) {
            Ok(value) => (status, Json(value)).into_response(),
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Failed to serialize response data" })),
                )
                    .into_response()
            }
        }
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

/// `Json` extractor whose rejections use the API error body
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => {
                tracing::debug!("rejected request body: {}", rejection.body_text());
                Err(ApiError::from(rejection))
            }
        }
    }
}

/// Query-string extractor whose rejections use the API error body
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Query(value) = axum::extract::Query::<T>::from_request_parts(parts, state).await?;
        Ok(ApiQuery(value))
    }
}
