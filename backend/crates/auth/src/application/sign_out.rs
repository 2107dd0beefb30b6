//! Sign Out Use Case
//!
//! Invalidates one session or every session of a user.

use std::sync::Arc;

use crate::application::check_session::{CheckSessionUseCase, parse_session_token};
use crate::application::config::AuthConfig;
use crate::domain::repository::AuthSessionRepository;
use crate::error::AuthResult;

/// Sign out use case
pub struct SignOutUseCase<S>
where
    S: AuthSessionRepository,
{
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<S> SignOutUseCase<S>
where
    S: AuthSessionRepository,
{
    pub fn new(session_repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            session_repo,
            config,
        }
    }

    /// Sign out from current session
    pub async fn execute(&self, session_token: &str) -> AuthResult<()> {
        let session_id = parse_session_token(&self.config, session_token)?;
        self.session_repo.delete(session_id).await?;

        tracing::info!(session_id = %session_id, "User signed out");
        Ok(())
    }

    /// Sign out from every device, current session included
    pub async fn execute_all(&self, session_token: &str) -> AuthResult<u64> {
        let session = CheckSessionUseCase::new(self.session_repo.clone(), self.config.clone())
            .execute(session_token)
            .await?;

        let deleted = self
            .session_repo
            .delete_all_for_user(&session.user_id)
            .await?;

        tracing::info!(
            user_id = %session.user_id,
            deleted = deleted,
            "User signed out from all devices"
        );

        Ok(deleted)
    }
}
