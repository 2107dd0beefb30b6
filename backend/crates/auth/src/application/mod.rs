//! Application Layer
//!
//! Use cases and application services.

pub mod access_gate;
pub mod bootstrap_admin;
pub mod check_role;
pub mod check_session;
pub mod config;
pub mod register;
pub mod sign_in;
pub mod sign_out;
pub mod users;

// Re-exports
pub use access_gate::{AccessGate, GateConfig, GateDecision, PathClass, RequestFacts, SessionState};
pub use bootstrap_admin::BootstrapAdminUseCase;
pub use check_role::{CheckRoleOutput, CheckRoleUseCase};
pub use check_session::{CheckSessionUseCase, issue_session_token, parse_session_token};
pub use config::AuthConfig;
pub use register::{RegisterInput, RegisterUseCase};
pub use sign_in::{SignInInput, SignInOutput, SignInUseCase};
pub use sign_out::SignOutUseCase;
pub use users::{UpdateUserInput, UsersUseCase};
