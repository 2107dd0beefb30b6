//! Domain Entities

use chrono::{DateTime, NaiveDate, Utc};
use kernel::id::{CompletionId, SoalId, UserId};

use crate::domain::value_objects::{Flag, SoalUrl};

/// A challenge ("soal")
#[derive(Debug, Clone)]
pub struct Soal {
    pub soal_id: SoalId,
    /// Challenge text, unique
    pub soal: String,
    pub url: Option<SoalUrl>,
    pub flag: Flag,
    /// Comma-joined free text tags
    pub category: String,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Soal {
    pub fn new(soal: &str, url: SoalUrl, flag: Flag, category: &str) -> Self {
        let now = Utc::now();
        Self {
            soal_id: SoalId::new(),
            soal: soal.trim().to_string(),
            url: Some(url),
            flag,
            category: category.trim().to_string(),
            is_favorite: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn set_url(&mut self, url: SoalUrl) {
        self.url = Some(url);
        self.updated_at = Utc::now();
    }

    pub fn set_favorite(&mut self, is_favorite: bool) {
        self.is_favorite = is_favorite;
        self.updated_at = Utc::now();
    }
}

/// A user completed a soal ("UserSoal"), at most one per pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub completion_id: CompletionId,
    pub user_id: UserId,
    pub soal_id: SoalId,
    pub taken_at: DateTime<Utc>,
}

impl Completion {
    pub fn new(user_id: UserId, soal_id: SoalId) -> Self {
        Self {
            completion_id: CompletionId::new(),
            user_id,
            soal_id,
            taken_at: Utc::now(),
        }
    }
}

/// Soal as shown in listings
#[derive(Debug, Clone)]
pub struct SoalListing {
    pub soal: Soal,
    pub attempt_count: i64,
    /// The viewing user's own completion
    pub viewer_completion: Option<Completion>,
}

/// Soal with the time the user solved it
#[derive(Debug, Clone)]
pub struct SolvedSoal {
    pub soal: Soal,
    pub taken_at: DateTime<Utc>,
}

/// Leaderboard row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    /// Dense rank, 1-based
    pub rank: i64,
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub solved_count: i64,
}

/// Completions on one UTC calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityKind {
    Login,
    QuestionSolved { title: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub kind: ActivityKind,
    pub timestamp: DateTime<Utc>,
}
