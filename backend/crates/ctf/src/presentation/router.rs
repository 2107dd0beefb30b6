//! CTF Router

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use std::sync::Arc;

use auth::PgAuthRepository;
use auth::domain::repository::{AuthSessionRepository, UserRepository};

use crate::application::config::CtfConfig;
use crate::domain::repository::{CompletionRepository, LeaderboardRepository, SoalRepository};
use crate::infra::postgres::PgCtfRepository;
use crate::presentation::handlers::{self, CtfAppState};

/// Create the CTF router with PostgreSQL repositories
pub fn ctf_router(repo: PgCtfRepository, auth_repo: PgAuthRepository, config: CtfConfig) -> Router {
    ctf_router_generic(repo, auth_repo, config)
}

/// Create a generic CTF router for any repository implementation
///
/// Routes carry absolute paths and are merged at the root, next to the
/// user administration routes (`/api/users/user-activity` lives here).
pub fn ctf_router_generic<R, A>(repo: R, auth_repo: A, config: CtfConfig) -> Router
where
    R: SoalRepository + CompletionRepository + LeaderboardRepository + Clone + Send + Sync + 'static,
    A: UserRepository + AuthSessionRepository + Clone + Send + Sync + 'static,
{
    let state = CtfAppState {
        repo: Arc::new(repo),
        auth_repo: Arc::new(auth_repo),
        config: Arc::new(config),
    };

    Router::new()
        // Soals
        .route("/api/soals", get(handlers::list_soals::<R, A>))
        .route("/api/soals/search", get(handlers::search_soals::<R, A>))
        .route("/api/soals/random", get(handlers::unattempted_soals::<R, A>))
        .route("/api/soals/completed", get(handlers::completed_count::<R, A>))
        .route("/api/soals/favorite", get(handlers::list_favorites::<R, A>))
        .route("/api/soals/solved-soals", get(handlers::solved_soals::<R, A>))
        .route("/api/soals/create", post(handlers::create_soal::<R, A>))
        .route("/api/soals/submit-flag", post(handlers::submit_flag::<R, A>))
        .route("/api/soals/{id}", get(handlers::get_soal::<R, A>))
        .route("/api/soals/{id}/update", put(handlers::update_soal::<R, A>))
        .route("/api/soals/{id}/delete", delete(handlers::delete_soal::<R, A>))
        .route(
            "/api/soals/{id}/favorite/create",
            post(handlers::set_favorite::<R, A>),
        )
        // Aggregation
        .route("/api/leaderboard", get(handlers::leaderboard::<R, A>))
        .route("/api/leaderboard/user", get(handlers::user_rank::<R, A>))
        .route(
            "/api/statistics/user/{user_id}",
            get(handlers::user_statistics::<R, A>),
        )
        .route("/api/users/user-activity", get(handlers::user_activity::<R, A>))
        .with_state(state)
}
