//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{
    auth_session::AuthSession,
    caller::{Caller, CallerIdentity},
    user::User,
};
pub use repository::{AuthSessionRepository, UserRepository};
