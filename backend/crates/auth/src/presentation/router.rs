//! Auth Router

use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::repository::{AuthSessionRepository, UserRepository};
use crate::infra::postgres::PgAuthRepository;
use crate::presentation::handlers::{self, AuthAppState};

/// Create the Auth router with PostgreSQL repository
///
/// Mounted under `/api/auth`.
pub fn auth_router(repo: PgAuthRepository, config: AuthConfig) -> Router {
    auth_router_generic(repo, config)
}

/// Create a generic Auth router for any repository implementation
pub fn auth_router_generic<R>(repo: R, config: AuthConfig) -> Router
where
    R: UserRepository + AuthSessionRepository + Clone + Send + Sync + 'static,
{
    let state = AuthAppState {
        repo: Arc::new(repo),
        config: Arc::new(config),
    };

    Router::new()
        .route("/register", post(handlers::register::<R>))
        .route("/signin", post(handlers::sign_in::<R>))
        .route("/signout", post(handlers::sign_out::<R>))
        .route("/logout-all", post(handlers::logout_all::<R>))
        .route("/check-role", get(handlers::check_role::<R>))
        .with_state(state)
}

/// User administration routes with absolute paths, merged at the root
///
/// Handlers expect the access gate to have resolved a [`Caller`](crate::domain::entity::caller::Caller).
pub fn users_router_generic<R>(repo: R, config: AuthConfig) -> Router
where
    R: UserRepository + AuthSessionRepository + Clone + Send + Sync + 'static,
{
    let state = AuthAppState {
        repo: Arc::new(repo),
        config: Arc::new(config),
    };

    Router::new()
        .route("/api/users", get(handlers::list_users::<R>))
        .route("/api/users/{id}", get(handlers::get_user::<R>))
        .route("/api/users/{id}/update", put(handlers::update_user::<R>))
        .with_state(state)
}
