//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, repository traits
//! - `application/` - Use cases, access gate, configuration
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, router, gate middleware
//!
//! ## Features
//! - Registration and sign-in with email + password
//! - Server-side sessions referenced by an HMAC-signed cookie token
//! - Access gate classifying every request (API / auth page / public / protected)
//! - Two roles, `user` and `admin`, resolved once into a [`Caller`]
//!
//! ## Security Model
//! - Passwords hashed with Argon2id
//! - Session token signature checked in constant time
//! - Gate fails closed: lookup errors redirect to the login page

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::access_gate::{AccessGate, GateConfig};
pub use application::config::AuthConfig;
pub use domain::entity::caller::{Caller, CallerIdentity};
pub use error::{AuthError, AuthResult};
pub use infra::postgres::PgAuthRepository;
pub use presentation::router::{auth_router, auth_router_generic, users_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
