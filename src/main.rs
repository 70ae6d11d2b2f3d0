use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gymai_coach::config::AppConfig;
use gymai_coach::{app, AppState};

#[derive(Parser, Debug)]
#[command(name = "gymai-coach")]
#[command(about = "GymAI Coach backend: Supabase data access plus OpenAI coaching")]
#[command(version)]
struct Cli {
    /// Interface to bind (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Keep tables and accounts in process memory instead of Supabase
    #[arg(long, env = "GYMAI_MEMORY_STORE")]
    memory_store: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so local runs pick up SUPABASE_URL, OPENAI_API_KEY, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gymai_coach=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::from_env();
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    tracing::info!("Starting GymAI Coach in {:?} mode", config.environment);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let state = if cli.memory_store {
        tracing::warn!("using the in-memory store; data is lost on exit");
        AppState::in_memory(config)?
    } else {
        AppState::hosted(config).context("Supabase credentials are missing or invalid")?
    };

    if !state.ai_ready() {
        tracing::warn!("OPENAI_API_KEY is not set; coaching endpoints will fail");
    }

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("GymAI Coach listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await.context("server error")?;
    Ok(())
}
