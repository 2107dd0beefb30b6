//! Browse Soals Use Case
//!
//! Read-only soal queries for authenticated users.

use std::sync::Arc;

use auth::Caller;
use kernel::id::SoalId;

use crate::domain::entities::{Soal, SoalListing};
use crate::domain::repository::{SoalQuery, SoalRepository};
use crate::domain::value_objects::CategoryFilter;
use crate::error::{CtfError, CtfResult};

/// Query parameters of `GET /api/soals`
#[derive(Debug, Default)]
pub struct ListSoalsInput {
    pub search: Option<String>,
    /// Comma-separated
    pub categories: Option<String>,
    pub exclude_solved: bool,
}

pub struct BrowseSoalsUseCase<R>
where
    R: SoalRepository,
{
    soal_repo: Arc<R>,
}

impl<R> BrowseSoalsUseCase<R>
where
    R: SoalRepository,
{
    pub fn new(soal_repo: Arc<R>) -> Self {
        Self { soal_repo }
    }

    pub async fn list(&self, caller: &Caller, input: ListSoalsInput) -> CtfResult<Vec<SoalListing>> {
        let search = input
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let query = SoalQuery {
            viewer: caller.user_id(),
            search,
            categories: CategoryFilter::parse(input.categories.as_deref()),
            exclude_solved: input.exclude_solved,
        };

        self.soal_repo.list_soals(&query).await
    }

    /// Quick search on text and url
    pub async fn search(&self, q: Option<&str>) -> CtfResult<Vec<(Soal, i64)>> {
        let q = q.unwrap_or_default();
        if q.is_empty() {
            return Err(CtfError::SearchQueryRequired);
        }
        self.soal_repo.search_soals(q).await
    }

    pub async fn get(&self, soal_id: &SoalId) -> CtfResult<Soal> {
        self.soal_repo
            .find_soal(soal_id)
            .await?
            .ok_or(CtfError::SoalNotFound)
    }

    pub async fn favorites(&self) -> CtfResult<Vec<Soal>> {
        self.soal_repo.list_favorites().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::tests_support::*;

    #[tokio::test]
    async fn test_list_filters_and_annotates() {
        let env = TestEnv::new();
        let alice = env.user("Alice", "alice@x.com");
        let web = env.soal("Cookie monster", "web");
        let crypto = env.soal("Broken RSA", "Crypto, math");
        env.complete(&alice, &web).await;

        let use_case = BrowseSoalsUseCase::new(env.ctf.clone());
        let caller = standard(&alice);

        let all = use_case.list(&caller, ListSoalsInput::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        let web_row = all.iter().find(|l| l.soal.soal_id == web.soal_id).unwrap();
        assert_eq!(web_row.attempt_count, 1);
        assert!(web_row.viewer_completion.is_some());

        let by_category = use_case
            .list(
                &caller,
                ListSoalsInput {
                    categories: Some("crypto".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(by_category.len(), 1);
        assert_eq!(by_category[0].soal.soal_id, crypto.soal_id);

        let unsolved = use_case
            .list(
                &caller,
                ListSoalsInput {
                    exclude_solved: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(unsolved.len(), 1);
        assert_eq!(unsolved[0].soal.soal_id, crypto.soal_id);
    }

    #[tokio::test]
    async fn test_search_matches_solver_name() {
        let env = TestEnv::new();
        let alice = env.user("Alice", "alice@x.com");
        let bob = env.user("Bob", "bob@x.com");
        let web = env.soal("Cookie monster", "web");
        env.soal("Broken RSA", "crypto");
        env.complete(&alice, &web).await;

        let use_case = BrowseSoalsUseCase::new(env.ctf.clone());
        let found = use_case
            .list(
                &standard(&bob),
                ListSoalsInput {
                    search: Some("ALICE".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].soal.soal_id, web.soal_id);
        assert!(found[0].viewer_completion.is_none());
    }

    #[tokio::test]
    async fn test_empty_listing_is_not_an_error() {
        let env = TestEnv::new();
        let alice = env.user("Alice", "alice@x.com");
        let use_case = BrowseSoalsUseCase::new(env.ctf.clone());

        let rows = use_case
            .list(
                &standard(&alice),
                ListSoalsInput {
                    search: Some("nothing".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_quick_search_requires_query() {
        let env = TestEnv::new();
        env.soal("Cookie monster", "web");
        let use_case = BrowseSoalsUseCase::new(env.ctf.clone());

        assert!(matches!(
            use_case.search(None).await,
            Err(CtfError::SearchQueryRequired)
        ));

        let hits = use_case.search(Some("cookie")).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].1, 0);
    }

    #[tokio::test]
    async fn test_get_missing_soal() {
        let env = TestEnv::new();
        let use_case = BrowseSoalsUseCase::new(env.ctf.clone());
        assert!(matches!(
            use_case.get(&SoalId::new()).await,
            Err(CtfError::SoalNotFound)
        ));
    }
}
