//! Server configuration from environment variables

use std::env;
use std::net::SocketAddr;

use anyhow::{Context, bail};
use auth::{AuthConfig, GateConfig};
use base64::Engine;
use base64::engine::general_purpose;
use ctf::CtfConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:31113";
const DEFAULT_APP_URL: &str = "http://localhost:3000";

/// Admin account provisioned at startup
#[derive(Clone)]
pub struct AdminSeed {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub bind_addr: SocketAddr,
    /// CORS allow-list
    pub frontend_origins: Vec<String>,
    pub auth: AuthConfig,
    pub gate: GateConfig,
    pub ctf: CtfConfig,
    pub admin: Option<AdminSeed>,
}

impl AppConfig {
    /// Local defaults: random session secret, insecure cookie, no database
    pub fn development() -> Self {
        Self {
            database_url: String::new(),
            max_connections: 5,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 31113)),
            frontend_origins: vec![DEFAULT_APP_URL.to_string()],
            auth: AuthConfig::development(),
            gate: GateConfig::default().with_origin(DEFAULT_APP_URL),
            ctf: CtfConfig::default(),
            admin: None,
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let max_connections = match env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(raw) => raw
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?,
            Err(_) => 5,
        };

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR must be a socket address")?;

        let app_url = env::var("APP_URL").unwrap_or_else(|_| DEFAULT_APP_URL.to_string());
        let app_origin = app_url.trim_end_matches('/').to_string();

        let frontend_origins = env::var("FRONTEND_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| vec![app_origin.clone()]);

        let gate = GateConfig::default()
            .with_origin(app_origin)
            .with_api_secret(env::var("API_SECRET_KEY").ok());

        Ok(Self {
            database_url,
            max_connections,
            bind_addr,
            frontend_origins,
            auth: auth_config()?,
            gate,
            ctf: CtfConfig::default(),
            admin: admin_seed(),
        })
    }
}

fn auth_config() -> anyhow::Result<AuthConfig> {
    let Ok(secret_b64) = env::var("SESSION_SECRET") else {
        if cfg!(debug_assertions) {
            tracing::warn!("SESSION_SECRET not set, using a random secret");
            return Ok(AuthConfig::development());
        }
        bail!("SESSION_SECRET must be set in production");
    };

    let bytes = general_purpose::STANDARD
        .decode(secret_b64.trim())
        .context("SESSION_SECRET must be base64")?;
    let session_secret: [u8; 32] = bytes
        .try_into()
        .map_err(|_| anyhow::anyhow!("SESSION_SECRET must decode to 32 bytes"))?;

    let base = if cfg!(debug_assertions) {
        AuthConfig::development()
    } else {
        AuthConfig::default()
    };

    Ok(AuthConfig {
        session_secret,
        password_pepper: env::var("PASSWORD_PEPPER").ok().map(String::into_bytes),
        ..base
    })
}

/// All of ADMIN_EMAIL / ADMIN_PASSWORD are needed; ADMIN_NAME defaults to "Admin"
fn admin_seed() -> Option<AdminSeed> {
    let email = env::var("ADMIN_EMAIL").ok()?;
    let password = env::var("ADMIN_PASSWORD").ok()?;
    Some(AdminSeed {
        name: env::var("ADMIN_NAME").unwrap_or_else(|_| "Admin".to_string()),
        email,
        password,
    })
}
