//! Infrastructure Layer
//!
//! Database implementations.

#[cfg(any(test, feature = "memory"))]
pub mod memory;
pub mod postgres;

#[cfg(any(test, feature = "memory"))]
pub use memory::MemoryAuthRepository;
pub use postgres::PgAuthRepository;
