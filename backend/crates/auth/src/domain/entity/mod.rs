//! Entities

pub mod auth_session;
pub mod caller;
pub mod user;
