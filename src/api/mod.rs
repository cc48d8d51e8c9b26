use axum::{
    Json, Router,
    extract::State,
    http::HeaderValue,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::clients::GitHubClient;
use crate::config::Config;
use crate::services::{FileStore, LockoutPolicy, LockoutTracker, RosterService};

mod admin;
mod auth;
mod error;
mod types;

pub use error::ApiError;
pub use types::*;

pub struct AppState {
    pub roster: Arc<RosterService>,

    pub lockouts: Arc<LockoutTracker>,

    pub start_time: std::time::Instant,

    cors_allowed_origins: Vec<String>,
}

/// Builds the application state against the production GitHub store. The
/// token comes from the environment, never from config.
pub fn create_app_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let token = Config::github_token()?;
    let client = GitHubClient::new(config.github.clone(), token)?;
    Ok(create_app_state_with_store(config, Arc::new(client)))
}

/// Same, with an injected file store. Used by tests and the CLI.
pub fn create_app_state_with_store(config: &Config, store: Arc<dyn FileStore>) -> Arc<AppState> {
    let lockouts = LockoutTracker::new(LockoutPolicy {
        max_attempts: config.security.lockout.max_attempts,
        lockout_hours: config.security.lockout.lockout_hours,
    });

    Arc::new(AppState {
        roster: Arc::new(RosterService::new(store)),
        lockouts: Arc::new(lockouts),
        start_time: std::time::Instant::now(),
        cors_allowed_origins: config.server.cors_allowed_origins.clone(),
    })
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_layer = if state.cors_allowed_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = state
            .cors_allowed_origins
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .route("/api/admin", post(admin::dispatch))
        .route("/api/auth/login", post(auth::login))
        .route("/api/health", get(health))
        .with_state(state)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

async fn health(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthDto>> {
    Json(ApiResponse::success(HealthDto {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: state.start_time.elapsed().as_secs(),
    }))
}
