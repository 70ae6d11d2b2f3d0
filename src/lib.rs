pub mod ai;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod state;
pub mod types;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use state::AppState;

/// Full router: public routes, guarded `/api` groups, CORS and tracing
pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .merge(ai_routes())
        .merge(routine_routes())
        .merge(exercise_routes())
        .merge(session_routes())
        .merge(training_routes())
        .route_layer(from_fn_with_state(state.clone(), middleware::auth_middleware));

    Router::new()
        .merge(public_routes())
        .merge(protected)
        .layer(cors_layer(&state.config.security.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use handlers::public::{auth, root_get};

    Router::new()
        .route("/", get(root_get))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/register", post(auth::register))
}

fn ai_routes() -> Router<AppState> {
    use handlers::protected::ai;

    Router::new()
        .route("/api/ai/chat", post(ai::chat_post))
        .route("/api/ai/generate-routine", post(ai::generate_post))
        .route("/api/ai/adjust", post(ai::adjust_post))
}

fn routine_routes() -> Router<AppState> {
    use handlers::protected::routines;

    Router::new()
        .route("/api/routines", get(routines::list).post(routines::create))
        .route("/api/routines/:id", get(routines::get).delete(routines::delete))
}

fn exercise_routes() -> Router<AppState> {
    use handlers::protected::exercises;

    Router::new()
        .route("/api/exercises", get(exercises::list).post(exercises::create))
        .route("/api/exercises/:id", put(exercises::update).delete(exercises::delete))
}

fn session_routes() -> Router<AppState> {
    use handlers::protected::sessions;

    Router::new()
        .route("/api/sessions", get(sessions::list).post(sessions::create))
        .route("/api/sessions/:id", put(sessions::update).delete(sessions::delete))
}

fn training_routes() -> Router<AppState> {
    use handlers::protected::training;

    Router::new()
        .route("/api/training/today", get(training::today))
        .route("/api/training/feedback", post(training::feedback))
}

/// Permissive unless an origin list is configured
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
}
