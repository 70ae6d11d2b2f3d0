use std::sync::Arc;

use crate::ai::{Coach, LanguageModel, OpenAiClient, RetryPolicy};
use crate::config::AppConfig;
use crate::database::{AuthProvider, Gateway, MemoryStore, SupabaseClient};
use crate::services::{ExerciseService, ProfileService, RoutineService, SessionService};

/// Shared handles injected into every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn Gateway>,
    pub auth: Arc<dyn AuthProvider>,
    pub coach: Coach,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn Gateway>,
        auth: Arc<dyn AuthProvider>,
        model: Arc<dyn LanguageModel>,
    ) -> Self {
        let retry = RetryPolicy::from(&config.retry);
        Self {
            config: Arc::new(config),
            store,
            auth,
            coach: Coach::new(model, retry),
        }
    }

    /// Supabase for tables and auth, OpenAI for coaching
    pub fn hosted(config: AppConfig) -> anyhow::Result<Self> {
        let (url, key) = config.database.credentials()?;
        let supabase = Arc::new(SupabaseClient::new(url, key)?);
        let model = Arc::new(OpenAiClient::from_config(&config.ai)?);
        Ok(Self::new(config, supabase.clone(), supabase, model))
    }

    /// In-process store for local runs; coaching still goes to OpenAI
    pub fn in_memory(config: AppConfig) -> anyhow::Result<Self> {
        let store = Arc::new(MemoryStore::new());
        let model = Arc::new(OpenAiClient::from_config(&config.ai)?);
        Ok(Self::new(config, store.clone(), store, model))
    }

    pub fn store_ready(&self) -> bool {
        self.config.database.is_configured()
    }

    pub fn ai_ready(&self) -> bool {
        self.config.ai.is_configured()
    }

    pub fn profiles(&self) -> ProfileService {
        ProfileService::new(self.store.clone())
    }

    pub fn routines(&self) -> RoutineService {
        RoutineService::new(self.store.clone())
    }

    pub fn exercises(&self) -> ExerciseService {
        ExerciseService::new(self.store.clone())
    }

    pub fn sessions(&self) -> SessionService {
        SessionService::new(self.store.clone())
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("environment", &self.config.environment)
            .finish_non_exhaustive()
    }
}
