//! Per-user progress queries

use std::sync::Arc;

use kernel::id::UserId;

use crate::application::config::CtfConfig;
use crate::domain::entities::{Soal, SolvedSoal};
use crate::domain::repository::{CompletionRepository, SoalRepository};
use crate::error::CtfResult;

pub struct ProgressUseCase<R, C>
where
    R: SoalRepository,
    C: CompletionRepository,
{
    soal_repo: Arc<R>,
    completion_repo: Arc<C>,
    config: Arc<CtfConfig>,
}

impl<R, C> ProgressUseCase<R, C>
where
    R: SoalRepository,
    C: CompletionRepository,
{
    pub fn new(soal_repo: Arc<R>, completion_repo: Arc<C>, config: Arc<CtfConfig>) -> Self {
        Self {
            soal_repo,
            completion_repo,
            config,
        }
    }

    /// Newest completion first
    pub async fn solved(&self, user_id: &UserId) -> CtfResult<Vec<SolvedSoal>> {
        self.completion_repo.solved_by_user(user_id).await
    }

    /// A few of the oldest soals the user has not completed yet
    pub async fn unattempted(&self, user_id: &UserId) -> CtfResult<Vec<Soal>> {
        self.soal_repo
            .unattempted_soals(user_id, self.config.unattempted_picks)
            .await
    }

    pub async fn completed_count(&self, user_id: &UserId) -> CtfResult<i64> {
        self.completion_repo.count_completions_for_user(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::tests_support::*;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_progress_views() {
        let env = TestEnv::new();
        let alice = env.user("Alice", "alice@x.com");
        let soals: Vec<_> = (0..6).map(|i| env.soal(&format!("Soal {i}"), "misc")).collect();
        env.complete(&alice, &soals[0]).await;
        env.complete(&alice, &soals[3]).await;
        env.ctf
            .set_taken_at(&alice.user_id, &soals[0].soal_id, Utc::now() - Duration::hours(1));

        let use_case = ProgressUseCase::new(env.ctf.clone(), env.ctf.clone(), env.config.clone());

        assert_eq!(use_case.completed_count(&alice.user_id).await.unwrap(), 2);

        let solved = use_case.solved(&alice.user_id).await.unwrap();
        let solved_ids: Vec<_> = solved.iter().map(|s| s.soal.soal_id).collect();
        assert_eq!(solved_ids, [soals[3].soal_id, soals[0].soal_id]);

        let picks = use_case.unattempted(&alice.user_id).await.unwrap();
        let pick_ids: Vec<_> = picks.iter().map(|s| s.soal_id).collect();
        assert_eq!(
            pick_ids,
            [soals[1].soal_id, soals[2].soal_id, soals[4].soal_id, soals[5].soal_id]
        );
    }
}
