//! CTF (Capture The Flag) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Soals, completions, ranking rules, repository traits
//! - `application/` - Use cases
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers
//!
//! ## Rules
//! - A (user, soal) pair is completed at most once; the store's unique key
//!   is the final arbiter under concurrent submissions
//! - Flags are compared exactly and never leave the server
//! - A soal with completions cannot be deleted
//! - Leaderboard positions are dense ranks over non-admin users

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::CtfConfig;
pub use error::{CtfError, CtfResult};
pub use infra::postgres::PgCtfRepository;
pub use presentation::router::{ctf_router, ctf_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entities::*;
    pub use crate::domain::value_objects::*;
    pub use crate::presentation::dto::*;
}
