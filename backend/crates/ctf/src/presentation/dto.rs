//! API DTOs (Data Transfer Objects)
//!
//! Soal projections never carry the flag.

use chrono::{DateTime, NaiveDate, Utc};
use kernel::id::{CompletionId, SoalId, UserId};
use serde::{Deserialize, Serialize};

use crate::application::{LeaderboardPage, UserActivity, UserStatistics};
use crate::domain::entities::{
    Activity, ActivityKind, Completion, DailyCount, Soal, SoalListing, SolvedSoal, Standing,
};

// ============================================================================
// Soals
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SoalResponse {
    pub id: SoalId,
    pub soal: String,
    pub url: Option<String>,
    pub category: String,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Soal> for SoalResponse {
    fn from(soal: &Soal) -> Self {
        Self {
            id: soal.soal_id,
            soal: soal.soal.clone(),
            url: soal.url.as_ref().map(|u| u.as_str().to_string()),
            category: soal.category.clone(),
            is_favorite: soal.is_favorite,
            created_at: soal.created_at,
            updated_at: soal.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResponse {
    pub id: CompletionId,
    pub user_id: UserId,
    pub soal_id: SoalId,
    pub taken_at: DateTime<Utc>,
}

impl From<&Completion> for CompletionResponse {
    fn from(c: &Completion) -> Self {
        Self {
            id: c.completion_id,
            user_id: c.user_id,
            soal_id: c.soal_id,
            taken_at: c.taken_at,
        }
    }
}

/// Listing row of `GET /api/soals`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SoalListItem {
    #[serde(flatten)]
    pub soal: SoalResponse,
    pub attempt_count: i64,
    /// The caller's own completion
    pub user_soal: Option<CompletionResponse>,
}

impl From<&SoalListing> for SoalListItem {
    fn from(row: &SoalListing) -> Self {
        Self {
            soal: SoalResponse::from(&row.soal),
            attempt_count: row.attempt_count,
            user_soal: row.viewer_completion.as_ref().map(CompletionResponse::from),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    #[serde(flatten)]
    pub soal: SoalResponse,
    pub attempt_count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolvedSoalResponse {
    #[serde(flatten)]
    pub soal: SoalResponse,
    pub solved_at: DateTime<Utc>,
}

impl From<&SolvedSoal> for SolvedSoalResponse {
    fn from(s: &SolvedSoal) -> Self {
        Self {
            soal: SoalResponse::from(&s.soal),
            solved_at: s.taken_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedCountResponse {
    pub completed_soal_count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteResponse {
    pub id: SoalId,
    pub is_favorite: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeletedResponse {
    pub id: SoalId,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateSoalRequest {
    pub soal: Option<String>,
    pub url: Option<String>,
    pub flag: Option<String>,
    pub category: Option<String>,
}

/// Only `url` is applied; other fields are ignored
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSoalRequest {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFlagRequest {
    pub soal_id: Option<String>,
    pub flag: Option<String>,
}

/// `isFavorite` is checked by hand so a non-boolean gets its own message
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRequest {
    pub is_favorite: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSoalsQuery {
    pub search: Option<String>,
    pub categories: Option<String>,
    pub exclude_solved: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdQuery {
    pub user_id: Option<String>,
}

// ============================================================================
// Leaderboard
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub solved_count: i64,
}

impl From<&Standing> for LeaderboardEntry {
    fn from(s: &Standing) -> Self {
        Self {
            rank: s.rank,
            id: s.user_id,
            name: s.name.clone(),
            email: s.email.clone(),
            solved_count: s.solved_count,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardResponse {
    pub leaderboard: Vec<LeaderboardEntry>,
    pub pagination: Pagination,
}

impl From<&LeaderboardPage> for LeaderboardResponse {
    fn from(page: &LeaderboardPage) -> Self {
        Self {
            leaderboard: page.entries.iter().map(LeaderboardEntry::from).collect(),
            pagination: Pagination {
                page: page.page,
                limit: page.limit,
                total: page.total,
                total_pages: page.total_pages,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRankResponse {
    pub rank: i64,
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub completed_count: i64,
}

impl From<&Standing> for UserRankResponse {
    fn from(s: &Standing) -> Self {
        Self {
            rank: s.rank,
            id: s.user_id,
            name: s.name.clone(),
            email: s.email.clone(),
            completed_count: s.solved_count,
        }
    }
}

// ============================================================================
// Statistics / Activity
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentCompletion {
    pub soal_id: SoalId,
    pub soal_name: String,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteCompletion {
    pub soal_id: SoalId,
    pub soal_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyStat {
    pub date: NaiveDate,
    pub count: i64,
}

impl From<&DailyCount> for DailyStat {
    fn from(d: &DailyCount) -> Self {
        Self {
            date: d.date,
            count: d.count,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsResponse {
    pub total_challenges: i64,
    pub completed_challenges: i64,
    pub completion_percentage: String,
    pub recent_completions: Vec<RecentCompletion>,
    pub favorite_challenges_completed: Vec<FavoriteCompletion>,
    pub daily_completion_stats: Vec<DailyStat>,
}

impl From<UserStatistics> for StatisticsResponse {
    fn from(stats: UserStatistics) -> Self {
        Self {
            total_challenges: stats.total_challenges,
            completed_challenges: stats.completed_challenges,
            completion_percentage: stats.completion_percentage,
            recent_completions: stats
                .recent_completions
                .iter()
                .map(|s| RecentCompletion {
                    soal_id: s.soal.soal_id,
                    soal_name: s.soal.soal.clone(),
                    completed_at: s.taken_at,
                })
                .collect(),
            favorite_challenges_completed: stats
                .favorite_completions
                .iter()
                .map(|s| FavoriteCompletion {
                    soal_id: s.soal.soal_id,
                    soal_name: s.soal.soal.clone(),
                })
                .collect(),
            daily_completion_stats: stats.daily_completions.iter().map(DailyStat::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ActivityResponse {
    #[serde(rename = "login")]
    Login {
        details: &'static str,
        timestamp: DateTime<Utc>,
    },
    #[serde(rename = "question_solved", rename_all = "camelCase")]
    QuestionSolved {
        question_title: String,
        timestamp: DateTime<Utc>,
    },
}

impl From<Activity> for ActivityResponse {
    fn from(a: Activity) -> Self {
        match a.kind {
            ActivityKind::Login => ActivityResponse::Login {
                details: "Login session",
                timestamp: a.timestamp,
            },
            ActivityKind::QuestionSolved { title } => ActivityResponse::QuestionSolved {
                question_title: title,
                timestamp: a.timestamp,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityFeedResponse {
    pub last_login: Option<DateTime<Utc>>,
    pub total_activities: usize,
    pub recent_activities: Vec<ActivityResponse>,
}

impl From<UserActivity> for ActivityFeedResponse {
    fn from(feed: UserActivity) -> Self {
        Self {
            last_login: feed.last_login,
            total_activities: feed.total_activities,
            recent_activities: feed
                .recent_activities
                .into_iter()
                .map(ActivityResponse::from)
                .collect(),
        }
    }
}
