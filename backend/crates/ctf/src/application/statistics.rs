//! User Statistics Use Case

use std::sync::Arc;

use auth::domain::repository::UserRepository;
use chrono::Utc;
use kernel::id::UserId;

use crate::application::config::CtfConfig;
use crate::domain::entities::{DailyCount, SolvedSoal};
use crate::domain::repository::{CompletionRepository, SoalRepository};
use crate::domain::services::{completion_percentage, daily_completion_counts};
use crate::error::{CtfError, CtfResult};

#[derive(Debug, Clone)]
pub struct UserStatistics {
    pub total_challenges: i64,
    pub completed_challenges: i64,
    /// Two decimals, "100.00" for an empty catalogue
    pub completion_percentage: String,
    pub recent_completions: Vec<SolvedSoal>,
    /// Solved soals currently flagged favorite
    pub favorite_completions: Vec<SolvedSoal>,
    pub daily_completions: Vec<DailyCount>,
}

pub struct UserStatisticsUseCase<U, R, C>
where
    U: UserRepository,
    R: SoalRepository,
    C: CompletionRepository,
{
    user_repo: Arc<U>,
    soal_repo: Arc<R>,
    completion_repo: Arc<C>,
    config: Arc<CtfConfig>,
}

impl<U, R, C> UserStatisticsUseCase<U, R, C>
where
    U: UserRepository,
    R: SoalRepository,
    C: CompletionRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        soal_repo: Arc<R>,
        completion_repo: Arc<C>,
        config: Arc<CtfConfig>,
    ) -> Self {
        Self {
            user_repo,
            soal_repo,
            completion_repo,
            config,
        }
    }

    pub async fn execute(&self, user_id: &UserId) -> CtfResult<UserStatistics> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(CtfError::UserNotFound)?;

        let total = self.soal_repo.count_soals().await?;
        let completed = self
            .completion_repo
            .count_completions_for_user(&user.user_id)
            .await?;

        // newest first
        let solved = self.completion_repo.solved_by_user(&user.user_id).await?;
        let favorite_completions = solved
            .iter()
            .filter(|s| s.soal.is_favorite)
            .cloned()
            .collect();
        let recent_completions = solved
            .into_iter()
            .take(self.config.recent_completions)
            .collect();

        let since = Utc::now() - self.config.daily_stats_window;
        let times = self
            .completion_repo
            .completion_times_since(&user.user_id, since)
            .await?;

        Ok(UserStatistics {
            total_challenges: total,
            completed_challenges: completed,
            completion_percentage: completion_percentage(completed, total),
            recent_completions,
            favorite_completions,
            daily_completions: daily_completion_counts(times, since),
        })
    }
}
