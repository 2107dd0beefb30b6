//! Leaderboard Use Case
//!
//! Page rows and single-user lookups share the same dense rank, so a user
//! sees the same position in both.

use std::sync::Arc;

use kernel::id::UserId;

use crate::domain::entities::Standing;
use crate::domain::repository::LeaderboardRepository;
use crate::domain::value_objects::PageRequest;
use crate::error::{CtfError, CtfResult};

#[derive(Debug, Clone)]
pub struct LeaderboardPage {
    pub entries: Vec<Standing>,
    pub page: i64,
    pub limit: i64,
    /// Participants, admins excluded
    pub total: i64,
    pub total_pages: i64,
}

pub struct LeaderboardUseCase<L>
where
    L: LeaderboardRepository,
{
    leaderboard_repo: Arc<L>,
}

impl<L> LeaderboardUseCase<L>
where
    L: LeaderboardRepository,
{
    pub fn new(leaderboard_repo: Arc<L>) -> Self {
        Self { leaderboard_repo }
    }

    pub async fn page(&self, request: PageRequest) -> CtfResult<LeaderboardPage> {
        let entries = self
            .leaderboard_repo
            .standings(request.offset(), request.limit())
            .await?;
        let total = self.leaderboard_repo.participant_count().await?;

        Ok(LeaderboardPage {
            entries,
            page: request.page(),
            limit: request.limit(),
            total,
            total_pages: request.total_pages(total),
        })
    }

    /// Unknown and admin users are not ranked
    pub async fn user_rank(&self, user_id: &UserId) -> CtfResult<Standing> {
        self.leaderboard_repo
            .standing_of(user_id)
            .await?
            .ok_or(CtfError::UserNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::tests_support::*;

    #[tokio::test]
    async fn test_second_page_of_twelve() {
        let env = TestEnv::new();
        let soals: Vec<_> = (0..11).map(|i| env.soal(&format!("Soal {i}"), "misc")).collect();
        // user i solves i soals, so every count is distinct
        for i in 0..12 {
            let user = env.user(&format!("user{i:02}"), &format!("user{i:02}@x.com"));
            for soal in soals.iter().take(i) {
                env.complete(&user, soal).await;
            }
        }
        env.admin("Root", "root@x.com");

        let use_case = LeaderboardUseCase::new(env.ctf.clone());
        let page = use_case.page(PageRequest::new(2, 5)).await.unwrap();

        assert_eq!(page.total, 12);
        assert_eq!(page.total_pages, 3);
        assert_eq!((page.page, page.limit), (2, 5));
        let ranks: Vec<i64> = page.entries.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, [6, 7, 8, 9, 10]);
        assert_eq!(page.entries[0].solved_count, 6);
        assert_eq!(page.entries[0].name, "user06");
    }

    #[tokio::test]
    async fn test_user_rank_matches_page_rank() {
        let env = TestEnv::new();
        let a = env.soal("A", "misc");
        let b = env.soal("B", "misc");
        let alice = env.user("Alice", "alice@x.com");
        let bob = env.user("Bob", "bob@x.com");
        let carol = env.user("Carol", "carol@x.com");
        let admin = env.admin("Root", "root@x.com");
        env.complete(&alice, &a).await;
        env.complete(&alice, &b).await;
        env.complete(&bob, &a).await;
        env.complete(&bob, &b).await;
        env.complete(&carol, &a).await;

        let use_case = LeaderboardUseCase::new(env.ctf.clone());
        let page = use_case.page(PageRequest::default()).await.unwrap();

        for entry in &page.entries {
            let single = use_case.user_rank(&entry.user_id).await.unwrap();
            assert_eq!(single.rank, entry.rank);
        }
        assert_eq!(use_case.user_rank(&bob.user_id).await.unwrap().rank, 1);
        assert_eq!(use_case.user_rank(&carol.user_id).await.unwrap().rank, 2);

        assert!(matches!(
            use_case.user_rank(&admin.user_id).await,
            Err(CtfError::UserNotFound)
        ));
        assert!(matches!(
            use_case.user_rank(&UserId::new()).await,
            Err(CtfError::UserNotFound)
        ));
    }
}
