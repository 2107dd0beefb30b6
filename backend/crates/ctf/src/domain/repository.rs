//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use chrono::{DateTime, Utc};
use kernel::id::{SoalId, UserId};

use crate::domain::entities::{Completion, Soal, SoalListing, SolvedSoal, Standing};
use crate::domain::value_objects::{CategoryFilter, SoalField, SoalUrl};
use crate::error::CtfResult;

/// Listing filter
#[derive(Debug, Clone)]
pub struct SoalQuery {
    /// User whose own completion annotates each row
    pub viewer: UserId,
    /// Case-insensitive substring of the soal text or of a solver's name / email
    pub search: Option<String>,
    pub categories: CategoryFilter,
    /// Drop soals the viewer already solved
    pub exclude_solved: bool,
}

/// Soal repository trait
#[trait_variant::make(SoalRepository: Send)]
pub trait LocalSoalRepository {
    /// Insert a soal
    ///
    /// A unique violation is reported as `CtfError::Duplicate`.
    async fn insert_soal(&self, soal: &Soal) -> CtfResult<()>;

    async fn find_soal(&self, soal_id: &SoalId) -> CtfResult<Option<Soal>>;

    /// Columns among soal / url / flag already used by another soal
    async fn find_duplicates(&self, soal: &str, url: &str, flag: &str) -> CtfResult<Vec<SoalField>>;

    /// Filtered listing, newest first
    async fn list_soals(&self, query: &SoalQuery) -> CtfResult<Vec<SoalListing>>;

    /// Text or url contains `q` (case-insensitive), with attempt counts
    async fn search_soals(&self, q: &str) -> CtfResult<Vec<(Soal, i64)>>;

    /// Write only the url (and `updated_at`), returning the stored row
    async fn update_url(&self, soal_id: &SoalId, url: &SoalUrl) -> CtfResult<Soal>;

    /// Write only the favorite flag (and `updated_at`), returning the stored row
    async fn set_favorite(&self, soal_id: &SoalId, is_favorite: bool) -> CtfResult<Soal>;

    /// Delete a soal
    ///
    /// Fails with `CtfError::SoalInUse` while completions reference it.
    async fn delete_soal(&self, soal_id: &SoalId) -> CtfResult<()>;

    /// Favorite soals, most recently updated first
    async fn list_favorites(&self) -> CtfResult<Vec<Soal>>;

    /// Oldest soals the user has not completed
    async fn unattempted_soals(&self, user_id: &UserId, limit: i64) -> CtfResult<Vec<Soal>>;

    async fn count_soals(&self) -> CtfResult<i64>;
}

/// Completion repository trait
#[trait_variant::make(CompletionRepository: Send)]
pub trait LocalCompletionRepository {
    async fn find_completion(
        &self,
        user_id: &UserId,
        soal_id: &SoalId,
    ) -> CtfResult<Option<Completion>>;

    /// Insert unless the (user, soal) pair exists; `false` when it did
    async fn insert_completion(&self, completion: &Completion) -> CtfResult<bool>;

    async fn count_completions_for_soal(&self, soal_id: &SoalId) -> CtfResult<i64>;

    async fn count_completions_for_user(&self, user_id: &UserId) -> CtfResult<i64>;

    /// Soals solved by the user, newest completion first
    async fn solved_by_user(&self, user_id: &UserId) -> CtfResult<Vec<SolvedSoal>>;

    /// Completion times at or after `since`
    async fn completion_times_since(
        &self,
        user_id: &UserId,
        since: DateTime<Utc>,
    ) -> CtfResult<Vec<DateTime<Utc>>>;
}

/// Leaderboard repository trait
///
/// Only non-admin users take part; ranks are dense over solved counts.
#[trait_variant::make(LeaderboardRepository: Send)]
pub trait LocalLeaderboardRepository {
    /// Ordered by solved count desc, then name, then id
    async fn standings(&self, offset: i64, limit: i64) -> CtfResult<Vec<Standing>>;

    async fn participant_count(&self) -> CtfResult<i64>;

    /// `None` for unknown and admin users
    async fn standing_of(&self, user_id: &UserId) -> CtfResult<Option<Standing>>;
}
