//! Domain Layer
//!
//! Soals, completions and ranking. No HTTP or database types.

pub mod entities;
pub mod repository;
pub mod services;
pub mod value_objects;

pub use entities::{Activity, ActivityKind, Completion, DailyCount, Soal, SoalListing, SolvedSoal, Standing};
pub use repository::{CompletionRepository, LeaderboardRepository, SoalQuery, SoalRepository};
pub use value_objects::{CategoryFilter, Flag, PageRequest, SoalField, SoalUrl};
