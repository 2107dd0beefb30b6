//! API Server Entry Point

use std::net::SocketAddr;
use std::sync::Arc;

use api::build_app;
use api::config::AppConfig;
use auth::PgAuthRepository;
use auth::application::BootstrapAdminUseCase;
use auth::domain::repository::AuthSessionRepository;
use ctf::PgCtfRepository;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,ctf=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Connected to database");

    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    let auth_repo = PgAuthRepository::new(pool.clone());
    let ctf_repo = PgCtfRepository::new(pool.clone());

    // Errors here should not prevent server startup
    match auth_repo.cleanup_expired().await {
        Ok(sessions) => {
            tracing::info!(sessions_deleted = sessions, "Auth session cleanup completed");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Auth session cleanup failed, continuing anyway");
        }
    }

    if let Some(seed) = config.admin.clone() {
        let use_case =
            BootstrapAdminUseCase::new(Arc::new(auth_repo.clone()), Arc::new(config.auth.clone()));
        if let Err(e) = use_case.execute(&seed.name, &seed.email, seed.password).await {
            tracing::warn!(error = %e, "Admin bootstrap failed, continuing anyway");
        }
    }

    let app = build_app(auth_repo, ctf_repo, &config);

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = TcpListener::bind(config.bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
