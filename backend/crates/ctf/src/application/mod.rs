//! Application Layer
//!
//! Use cases for the challenge workflow and the aggregation views.

pub mod activity;
pub mod browse;
pub mod config;
pub mod leaderboard;
pub mod manage;
pub mod progress;
pub mod statistics;
pub mod submit_flag;

#[cfg(test)]
pub mod tests_support;

// Re-exports
pub use activity::{UserActivity, UserActivityUseCase};
pub use browse::{BrowseSoalsUseCase, ListSoalsInput};
pub use config::CtfConfig;
pub use leaderboard::{LeaderboardPage, LeaderboardUseCase};
pub use manage::{CreateSoalInput, ManageSoalUseCase, UpdateSoalInput};
pub use progress::ProgressUseCase;
pub use statistics::{UserStatistics, UserStatisticsUseCase};
pub use submit_flag::{SubmitFlagInput, SubmitFlagUseCase};
