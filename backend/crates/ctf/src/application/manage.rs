//! Soal Management Use Cases
//!
//! Create / update / delete are admin-only; the access gate rejects other
//! callers before these run. Favorite toggling is open to every user.

use std::sync::Arc;

use kernel::id::SoalId;

use crate::domain::entities::Soal;
use crate::domain::repository::{CompletionRepository, SoalRepository};
use crate::domain::value_objects::{Flag, SoalUrl};
use crate::error::{CtfError, CtfResult};

#[derive(Debug, Default)]
pub struct CreateSoalInput {
    pub soal: Option<String>,
    pub url: Option<String>,
    pub flag: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Default)]
pub struct UpdateSoalInput {
    pub url: Option<String>,
}

/// Non-blank value of an optional body field
fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

pub struct ManageSoalUseCase<R, C>
where
    R: SoalRepository,
    C: CompletionRepository,
{
    soal_repo: Arc<R>,
    completion_repo: Arc<C>,
}

impl<R, C> ManageSoalUseCase<R, C>
where
    R: SoalRepository,
    C: CompletionRepository,
{
    pub fn new(soal_repo: Arc<R>, completion_repo: Arc<C>) -> Self {
        Self {
            soal_repo,
            completion_repo,
        }
    }

    pub async fn create(&self, input: CreateSoalInput) -> CtfResult<Soal> {
        let (Some(text), Some(url), Some(flag), Some(category)) = (
            required(&input.soal),
            required(&input.url),
            required(&input.flag),
            required(&input.category),
        ) else {
            return Err(CtfError::MissingFields(
                "Question, URL, Category and Flag are required",
            ));
        };

        let url = SoalUrl::new(url)?;
        let flag = Flag::new(flag);
        let soal = Soal::new(text, url, flag, category);

        let url = soal.url.as_ref().map(|u| u.as_str()).unwrap_or_default();
        let duplicates = self
            .soal_repo
            .find_duplicates(&soal.soal, url, soal.flag.as_str())
            .await?;
        if !duplicates.is_empty() {
            tracing::debug!(fields = ?duplicates, "Soal create rejected as duplicate");
            return Err(CtfError::Duplicate(duplicates));
        }

        self.soal_repo.insert_soal(&soal).await?;

        tracing::info!(soal_id = %soal.soal_id, category = %soal.category, "Soal created");

        Ok(soal)
    }

    /// Only the url is persisted
    pub async fn update(&self, soal_id: &SoalId, input: UpdateSoalInput) -> CtfResult<Soal> {
        let Some(raw_url) = input.url else {
            return Err(CtfError::NoUpdateData);
        };
        let url = SoalUrl::new(&raw_url)?;

        let soal = self.soal_repo.update_url(soal_id, &url).await?;

        tracing::info!(soal_id = %soal.soal_id, "Soal url updated");

        Ok(soal)
    }

    /// Refused while any completion references the soal
    pub async fn delete(&self, soal_id: &SoalId) -> CtfResult<SoalId> {
        let soal = self
            .soal_repo
            .find_soal(soal_id)
            .await?
            .ok_or(CtfError::SoalNotFound)?;

        if self
            .completion_repo
            .count_completions_for_soal(&soal.soal_id)
            .await?
            > 0
        {
            return Err(CtfError::SoalInUse);
        }

        self.soal_repo.delete_soal(&soal.soal_id).await?;

        tracing::info!(soal_id = %soal.soal_id, "Soal deleted");

        Ok(soal.soal_id)
    }

    pub async fn set_favorite(&self, soal_id: &SoalId, is_favorite: bool) -> CtfResult<Soal> {
        self.soal_repo.set_favorite(soal_id, is_favorite).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::tests_support::*;
    use crate::domain::value_objects::SoalField;

    fn input(soal: &str, url: &str, flag: &str) -> CreateSoalInput {
        CreateSoalInput {
            soal: Some(soal.into()),
            url: Some(url.into()),
            flag: Some(flag.into()),
            category: Some("web".into()),
        }
    }

    #[tokio::test]
    async fn test_create_soal() {
        let env = TestEnv::new();
        let use_case = ManageSoalUseCase::new(env.ctf.clone(), env.ctf.clone());

        let soal = use_case
            .create(input(" Find me ", " https://ctf.example/1 ", " CTF{1} "))
            .await
            .unwrap();

        assert_eq!(soal.soal, "Find me");
        assert_eq!(soal.url.as_ref().unwrap().as_str(), "https://ctf.example/1");
        assert_eq!(soal.flag.as_str(), "CTF{1}");
        assert_eq!(env.ctf.soal_count(), 1);
    }

    #[tokio::test]
    async fn test_create_validation() {
        let env = TestEnv::new();
        let use_case = ManageSoalUseCase::new(env.ctf.clone(), env.ctf.clone());

        let missing = use_case
            .create(CreateSoalInput {
                soal: Some("q".into()),
                url: Some("https://ctf.example/1".into()),
                flag: Some("  ".into()),
                category: Some("web".into()),
            })
            .await;
        assert!(matches!(missing, Err(CtfError::MissingFields(_))));

        let bad_url = use_case.create(input("q", "ctf.example", "f")).await;
        assert!(matches!(bad_url, Err(CtfError::InvalidUrl)));
        assert_eq!(env.ctf.soal_count(), 0);
    }

    #[tokio::test]
    async fn test_create_duplicate_flag() {
        let env = TestEnv::new();
        let use_case = ManageSoalUseCase::new(env.ctf.clone(), env.ctf.clone());
        use_case
            .create(input("first", "https://ctf.example/1", "CTF{same}"))
            .await
            .unwrap();

        let err = use_case
            .create(input("second", "https://ctf.example/2", "CTF{same}"))
            .await
            .unwrap_err();

        match err {
            CtfError::Duplicate(fields) => assert_eq!(fields, vec![SoalField::Flag]),
            other => panic!("expected duplicate, got {other:?}"),
        }
        assert_eq!(env.ctf.soal_count(), 1);
    }

    #[tokio::test]
    async fn test_update_url_only() {
        let env = TestEnv::new();
        let soal = env.soal("Cookie monster", "web");
        let use_case = ManageSoalUseCase::new(env.ctf.clone(), env.ctf.clone());

        assert!(matches!(
            use_case.update(&soal.soal_id, UpdateSoalInput::default()).await,
            Err(CtfError::NoUpdateData)
        ));
        assert!(matches!(
            use_case
                .update(
                    &soal.soal_id,
                    UpdateSoalInput {
                        url: Some("nope".into())
                    }
                )
                .await,
            Err(CtfError::InvalidUrl)
        ));
        assert!(matches!(
            use_case
                .update(
                    &SoalId::new(),
                    UpdateSoalInput {
                        url: Some("https://ctf.example/new".into())
                    }
                )
                .await,
            Err(CtfError::SoalNotFound)
        ));

        let updated = use_case
            .update(
                &soal.soal_id,
                UpdateSoalInput {
                    url: Some("https://ctf.example/new".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.url.unwrap().as_str(), "https://ctf.example/new");
        assert_eq!(updated.soal, soal.soal);
    }

    #[tokio::test]
    async fn test_delete_guard() {
        let env = TestEnv::new();
        let alice = env.user("Alice", "alice@x.com");
        let solved = env.soal("Solved one", "web");
        let fresh = env.soal("Fresh one", "web");
        env.complete(&alice, &solved).await;

        let use_case = ManageSoalUseCase::new(env.ctf.clone(), env.ctf.clone());

        assert!(matches!(
            use_case.delete(&solved.soal_id).await,
            Err(CtfError::SoalInUse)
        ));
        assert_eq!(env.ctf.soal_count(), 2);

        assert_eq!(use_case.delete(&fresh.soal_id).await.unwrap(), fresh.soal_id);
        assert!(matches!(
            use_case.delete(&fresh.soal_id).await,
            Err(CtfError::SoalNotFound)
        ));
        assert_eq!(env.ctf.soal_count(), 1);
    }

    #[tokio::test]
    async fn test_toggle_favorite() {
        let env = TestEnv::new();
        let soal = env.soal("Cookie monster", "web");
        let use_case = ManageSoalUseCase::new(env.ctf.clone(), env.ctf.clone());

        let favored = use_case.set_favorite(&soal.soal_id, true).await.unwrap();
        assert!(favored.is_favorite);

        assert!(matches!(
            use_case.set_favorite(&SoalId::new(), true).await,
            Err(CtfError::SoalNotFound)
        ));
    }
    #[tokio::test]
    async fn test_url_and_favorite_writes_keep_each_other() {
        let env = TestEnv::new();
        let soal = env.soal("Cookie monster", "web");
        let use_case = ManageSoalUseCase::new(env.ctf.clone(), env.ctf.clone());

        use_case.set_favorite(&soal.soal_id, true).await.unwrap();
        let updated = use_case
            .update(
                &soal.soal_id,
                UpdateSoalInput {
                    url: Some("https://ctf.example/moved".into()),
                },
            )
            .await
            .unwrap();
        assert!(updated.is_favorite);

        let unfavored = use_case.set_favorite(&soal.soal_id, false).await.unwrap();
        assert_eq!(unfavored.url.unwrap().as_str(), "https://ctf.example/moved");

        let stored = env.ctf.find_soal(&soal.soal_id).await.unwrap().unwrap();
        assert!(!stored.is_favorite);
        assert_eq!(stored.url.unwrap().as_str(), "https://ctf.example/moved");
        assert_eq!(stored.flag, soal.flag);
    }
}
