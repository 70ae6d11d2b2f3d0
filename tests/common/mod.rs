#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use gymai_coach::ai::{CompletionRequest, LanguageModel, ModelError};
use gymai_coach::config::AppConfig;
use gymai_coach::database::{AuthProvider, AuthSession, GatewayError, Identity, MemoryStore};
use gymai_coach::{app, AppState};
use reqwest::StatusCode;
use serde_json::Value;
use uuid::Uuid;

/// Language model that replays canned replies and records every request
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, ModelError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
    calls: AtomicUsize,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, text: impl Into<String>) {
        self.replies.lock().unwrap().push_back(Ok(text.into()));
    }

    pub fn fail(&self, error: ModelError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ModelError::Empty))
    }
}

/// Auth service that is unreachable
pub struct BrokenAuth;

#[async_trait]
impl AuthProvider for BrokenAuth {
    async fn sign_in_with_password(&self, _: &str, _: &str) -> Result<AuthSession, GatewayError> {
        Err(GatewayError::Transport("connection refused".into()))
    }

    async fn sign_up(&self, _: &str, _: &str, _: Option<&str>) -> Result<Identity, GatewayError> {
        Err(GatewayError::Transport("connection refused".into()))
    }

    async fn get_user(&self, _: &str) -> Result<Option<Identity>, GatewayError> {
        Err(GatewayError::Transport("connection refused".into()))
    }
}

pub struct TestApp {
    pub base_url: String,
    pub store: Arc<MemoryStore>,
    pub model: Arc<ScriptedModel>,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        let store = Arc::new(MemoryStore::new());
        Self::spawn_with_auth(store.clone(), store).await
    }

    pub async fn spawn_with_auth(store: Arc<MemoryStore>, auth: Arc<dyn AuthProvider>) -> Result<Self> {
        let model = Arc::new(ScriptedModel::new());

        let mut config = AppConfig::development();
        config.retry.retries = 2;
        config.retry.initial_delay_ms = 1;

        let state = AppState::new(config, store.clone(), auth, model.clone());

        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        Ok(Self {
            base_url: format!("http://127.0.0.1:{}", port),
            store,
            model,
            client: reqwest::Client::new(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Register a fresh account with a profile row and return its id and token
    pub async fn sign_up(&self) -> Result<(Uuid, String)> {
        let email = format!("{}@gymai.test", Uuid::new_v4().simple());
        let (identity, token) = self.store.create_user(&email, "secret").await?;
        self.store
            .seed(
                "profiles",
                vec![serde_json::json!({
                    "id": identity.id,
                    "full_name": "Test Athlete",
                    "goal": "Hipertrofia",
                    "fitness_level": "Intermedio",
                })],
            )
            .await;
        Ok((identity.id, token))
    }

    pub async fn get(&self, path: &str, token: &str) -> Result<(StatusCode, Value)> {
        let res = self.client.get(self.url(path)).bearer_auth(token).send().await?;
        decode(res).await
    }

    pub async fn post(&self, path: &str, token: &str, body: &Value) -> Result<(StatusCode, Value)> {
        let res = self.client.post(self.url(path)).bearer_auth(token).json(body).send().await?;
        decode(res).await
    }

    pub async fn put(&self, path: &str, token: &str, body: &Value) -> Result<(StatusCode, Value)> {
        let res = self.client.put(self.url(path)).bearer_auth(token).json(body).send().await?;
        decode(res).await
    }

    pub async fn delete(&self, path: &str, token: &str) -> Result<(StatusCode, Value)> {
        let res = self.client.delete(self.url(path)).bearer_auth(token).send().await?;
        decode(res).await
    }
}

async fn decode(res: reqwest::Response) -> Result<(StatusCode, Value)> {
    let status = res.status();
    let text = res.text().await?;
    let body = if text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).with_context(|| format!("non-JSON body: {}", text))?
    };
    Ok((status, body))
}
