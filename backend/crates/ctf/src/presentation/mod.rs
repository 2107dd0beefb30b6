//! Presentation Layer
//!
//! HTTP handlers, DTOs and router.

pub mod dto;
pub mod handlers;
pub mod router;

pub use handlers::CtfAppState;
pub use router::{ctf_router, ctf_router_generic};
