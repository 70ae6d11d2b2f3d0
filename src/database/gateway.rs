use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use super::query_builder::Query;

/// Errors from the hosted store or its auth service
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The service answered with a non-success status
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("refusing to {0} without a filter")]
    Unfiltered(&'static str),
}

impl GatewayError {
    pub fn is_rejection(&self) -> bool {
        matches!(self, GatewayError::Rejected { .. })
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Decode(err.to_string())
    }
}

/// Table access against the hosted relational store.
///
/// Rows travel as JSON objects; typed models live in `database::models`.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, GatewayError>;

    /// Insert rows, returning them as stored (ids and defaults filled in)
    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>, GatewayError>;

    /// Patch every row matching `query`, returning the updated rows
    async fn update(&self, table: &str, query: &Query, patch: Value) -> Result<Vec<Value>, GatewayError>;

    /// Delete every row matching `query`, returning the removed rows
    async fn delete(&self, table: &str, query: &Query) -> Result<Vec<Value>, GatewayError>;

    async fn select_first(&self, table: &str, query: &Query) -> Result<Option<Value>, GatewayError> {
        let rows = self.select(table, &query.clone().limit(1)).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_one(&self, table: &str, row: Value) -> Result<Value, GatewayError> {
        self.insert(table, vec![row])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::Decode(format!("insert into {} returned no rows", table)))
    }
}

/// Identity as reported by the auth service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Session issued by a password sign-in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: Identity,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession, GatewayError>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<Identity, GatewayError>;

    /// Resolve an access token; `None` when the service does not recognise it
    async fn get_user(&self, token: &str) -> Result<Option<Identity>, GatewayError>;
}
