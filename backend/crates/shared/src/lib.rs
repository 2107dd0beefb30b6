//! Shared Kernel - Domain-crossing minimal core
//!
//! Vocabulary shared by the `auth` and `ctf` crates:
//! - Error kinds and the unified [`error::app_error::AppError`]
//! - Typed UUID identifiers for users, soals and completions
//! - The JSON success envelope returned by every handler
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all domains.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
pub mod response;
