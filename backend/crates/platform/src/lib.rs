//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (HMAC-SHA256 token signing, constant-time compare, Base64)
//! - Password hashing (Argon2id) and the account password policy
//! - Session cookie building and extraction

pub mod cookie;
pub mod crypto;
pub mod password;
