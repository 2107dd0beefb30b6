//! Application Configuration
//!
//! Limits used by the challenge and aggregation use cases.

use chrono::Duration;

#[derive(Debug, Clone)]
pub struct CtfConfig {
    /// Soals returned by the "random" picker
    pub unattempted_picks: i64,
    /// Completions listed in user statistics
    pub recent_completions: usize,
    /// Window for the daily completion histogram
    pub daily_stats_window: Duration,
    /// Completions mixed into the activity feed
    pub activity_completions: usize,
    /// Maximum entries of the activity feed
    pub activity_limit: usize,
}

impl Default for CtfConfig {
    fn default() -> Self {
        Self {
            unattempted_picks: 4,
            recent_completions: 3,
            daily_stats_window: Duration::days(7),
            activity_completions: 3,
            activity_limit: 10,
        }
    }
}
