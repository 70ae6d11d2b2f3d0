use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid configuration for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub ai: AiConfig,
    pub retry: RetryConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Supabase project endpoint and key
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    #[serde(skip_serializing)]
    pub key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    /// Transport-level retries performed by the OpenAI client itself
    pub max_retries: u32,
}

/// Application-level retry budget around every model call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub retries: u32,
    pub initial_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Empty means permissive CORS
    pub cors_origins: Vec<String>,
}

impl DatabaseConfig {
    pub fn is_configured(&self) -> bool {
        self.url.as_deref().is_some_and(|s| !s.is_empty())
            && self.key.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Endpoint and key, or the first missing piece
    pub fn credentials(&self) -> Result<(&str, &str), ConfigError> {
        let url = self
            .url
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("SUPABASE_URL"))?;
        let key = self
            .key
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("SUPABASE_ANON_KEY"))?;
        url::Url::parse(url).map_err(|e| ConfigError::Invalid {
            key: "SUPABASE_URL",
            message: e.to_string(),
        })?;
        Ok((url, key))
    }
}

impl AiConfig {
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|s| !s.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl RetryConfig {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Supabase; the VITE_ names are shared with the frontend build
        self.database.url = first_env(&["SUPABASE_URL", "VITE_SUPABASE_URL"]);
        self.database.key = first_env(&[
            "SUPABASE_ANON_KEY",
            "SUPABASE_SERVICE_ROLE_KEY",
            "VITE_SUPABASE_ANON_KEY",
        ]);

        // OpenAI
        self.ai.api_key = first_env(&["OPENAI_API_KEY"]);
        if let Ok(v) = env::var("OPENAI_BASE_URL") {
            self.ai.base_url = v;
        }
        if let Ok(v) = env::var("OPENAI_MODEL") {
            self.ai.model = v;
        }
        if let Ok(v) = env::var("OPENAI_TIMEOUT_SECS") {
            self.ai.timeout_secs = v.parse().unwrap_or(self.ai.timeout_secs);
        }
        if let Ok(v) = env::var("OPENAI_MAX_RETRIES") {
            self.ai.max_retries = v.parse().unwrap_or(self.ai.max_retries);
        }

        // Application retry
        if let Ok(v) = env::var("AI_RETRY_ATTEMPTS") {
            self.retry.retries = v.parse().unwrap_or(self.retry.retries);
        }
        if let Ok(v) = env::var("AI_RETRY_INITIAL_DELAY_MS") {
            self.retry.initial_delay_ms = v.parse().unwrap_or(self.retry.initial_delay_ms);
        }

        // Security
        if let Ok(v) = env::var("CORS_ORIGINS") {
            self.security.cors_origins = parse_origins(&v);
        }

        self
    }

    fn base(environment: Environment, port: u16) -> Self {
        Self {
            environment,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port,
            },
            database: DatabaseConfig::default(),
            ai: AiConfig {
                api_key: None,
                base_url: "https://api.openai.com/v1".to_string(),
                model: "gpt-4o-mini".to_string(),
                timeout_secs: 30,
                max_retries: 2,
            },
            retry: RetryConfig {
                retries: 2,
                initial_delay_ms: 1000,
            },
            security: SecurityConfig {
                cors_origins: Vec::new(),
            },
        }
    }

    /// Development defaults without reading the environment
    pub fn development() -> Self {
        Self::base(Environment::Development, 5000)
    }

    fn staging() -> Self {
        Self::base(Environment::Staging, 8080)
    }

    fn production() -> Self {
        Self::base(Environment::Production, 8080)
    }
}

fn first_env(keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| env::var(k).ok())
        .find(|v| !v.trim().is_empty())
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.retry.retries, 2);
        assert_eq!(config.retry.initial_delay(), Duration::from_millis(1000));
        assert_eq!(config.ai.timeout(), Duration::from_secs(30));
        assert!(!config.database.is_configured());
    }

    #[test]
    fn credentials_report_first_missing_key() {
        let mut db = DatabaseConfig::default();
        assert!(matches!(db.credentials(), Err(ConfigError::Missing("SUPABASE_URL"))));

        db.url = Some("https://project.supabase.co".into());
        assert!(matches!(db.credentials(), Err(ConfigError::Missing("SUPABASE_ANON_KEY"))));

        db.key = Some("anon".into());
        let (url, key) = db.credentials().unwrap();
        assert_eq!(url, "https://project.supabase.co");
        assert_eq!(key, "anon");
        assert!(db.is_configured());

        db.url = Some("not a url".into());
        assert!(matches!(db.credentials(), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn origins_are_trimmed_and_blank_entries_dropped() {
        assert_eq!(
            parse_origins(" https://a.app , ,https://b.app"),
            vec!["https://a.app".to_string(), "https://b.app".to_string()]
        );
    }
}
