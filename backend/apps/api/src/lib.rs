//! API server assembly
//!
//! Startup errors use `anyhow`; request-level errors go through
//! `kernel::error::AppError`.

pub mod config;

use std::sync::Arc;

use auth::domain::repository::{AuthSessionRepository, UserRepository};
use auth::presentation::{GateState, access_gate};
use auth::{AccessGate, auth_router_generic, users_router_generic};
use axum::Router;
use axum::http::{self, HeaderName, Method, header};
use axum::middleware::from_fn_with_state;
use ctf::ctf_router_generic;
use ctf::domain::repository::{CompletionRepository, LeaderboardRepository, SoalRepository};
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-api-key");

/// Routes that pass the gate without a handler
async fn not_found() -> AppError {
    AppError::not_found("Route not found")
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed_origins: Vec<http::HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            API_KEY_HEADER,
        ]))
        .allow_credentials(true)
}

/// Full application router: every route sits behind the access gate
pub fn build_app<A, R>(auth_repo: A, ctf_repo: R, config: &AppConfig) -> Router
where
    A: UserRepository + AuthSessionRepository + Clone + Send + Sync + 'static,
    R: SoalRepository + CompletionRepository + LeaderboardRepository + Clone + Send + Sync + 'static,
{
    let gate_state = GateState {
        repo: Arc::new(auth_repo.clone()),
        config: Arc::new(config.auth.clone()),
        gate: Arc::new(AccessGate::new(config.gate.clone())),
    };

    // fallback は layer より前に登録すること (gate を通すため)
    Router::new()
        .nest(
            "/api/auth",
            auth_router_generic(auth_repo.clone(), config.auth.clone()),
        )
        .merge(users_router_generic(auth_repo.clone(), config.auth.clone()))
        .merge(ctf_router_generic(ctf_repo, auth_repo, config.ctf.clone()))
        .fallback(not_found)
        .layer(from_fn_with_state(gate_state, access_gate::<A>))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.frontend_origins))
}
