//! Submit Flag Use Case
//!
//! Moves a (user, soal) pair from unattempted to solved, at most once. The
//! final guard is the store's uniqueness on the pair, so two concurrent
//! correct submissions still leave a single completion.

use std::sync::Arc;

use auth::Caller;
use auth::domain::repository::UserRepository;

use crate::domain::entities::Completion;
use crate::domain::repository::{CompletionRepository, SoalRepository};
use crate::domain::value_objects::parse_id;
use crate::error::{CtfError, CtfResult};

#[derive(Debug, Default)]
pub struct SubmitFlagInput {
    pub soal_id: Option<String>,
    pub flag: Option<String>,
}

pub struct SubmitFlagUseCase<U, R, C>
where
    U: UserRepository,
    R: SoalRepository,
    C: CompletionRepository,
{
    user_repo: Arc<U>,
    soal_repo: Arc<R>,
    completion_repo: Arc<C>,
}

impl<U, R, C> SubmitFlagUseCase<U, R, C>
where
    U: UserRepository,
    R: SoalRepository,
    C: CompletionRepository,
{
    pub fn new(user_repo: Arc<U>, soal_repo: Arc<R>, completion_repo: Arc<C>) -> Self {
        Self {
            user_repo,
            soal_repo,
            completion_repo,
        }
    }

    pub async fn execute(&self, caller: &Caller, input: SubmitFlagInput) -> CtfResult<Completion> {
        let (Some(raw_id), Some(candidate)) = (
            input.soal_id.filter(|id| !id.is_empty()),
            input.flag.filter(|flag| !flag.is_empty()),
        ) else {
            return Err(CtfError::MissingFields("Soal ID and flag are required"));
        };
        let soal_id = parse_id(&raw_id)?;

        let user = self
            .user_repo
            .find_by_id(&caller.user_id())
            .await?
            .ok_or(CtfError::UserNotFound)?;

        let soal = self
            .soal_repo
            .find_soal(&soal_id)
            .await?
            .ok_or(CtfError::SoalNotFound)?;

        // 既に解いていればフラグは比較しない
        if self
            .completion_repo
            .find_completion(&user.user_id, &soal.soal_id)
            .await?
            .is_some()
        {
            return Err(CtfError::AlreadySolved);
        }

        if !soal.flag.matches(&candidate) {
            tracing::warn!(user_id = %user.user_id, soal_id = %soal.soal_id, "Incorrect flag submitted");
            return Err(CtfError::IncorrectFlag);
        }

        let completion = Completion::new(user.user_id, soal.soal_id);
        if !self.completion_repo.insert_completion(&completion).await? {
            tracing::debug!(user_id = %user.user_id, soal_id = %soal.soal_id, "Lost completion race");
            return Err(CtfError::AlreadySolved);
        }

        tracing::info!(user_id = %user.user_id, soal_id = %soal.soal_id, "Soal solved");

        Ok(completion)
    }
}
