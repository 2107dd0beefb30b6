//! Check Role Use Case
//!
//! Resolves the account and role behind a session token.

use std::sync::Arc;

use crate::application::check_session::CheckSessionUseCase;
use crate::application::config::AuthConfig;
use crate::domain::entity::user::User;
use crate::domain::repository::{AuthSessionRepository, UserRepository};
use crate::domain::value_object::user_role::UserRole;
use crate::error::{AuthError, AuthResult};

pub struct CheckRoleOutput {
    pub user: User,
    pub role: UserRole,
}

pub struct CheckRoleUseCase<U, S>
where
    U: UserRepository,
    S: AuthSessionRepository,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<U, S> CheckRoleUseCase<U, S>
where
    U: UserRepository,
    S: AuthSessionRepository,
{
    pub fn new(user_repo: Arc<U>, session_repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            session_repo,
            config,
        }
    }

    pub async fn execute(&self, session_token: &str) -> AuthResult<CheckRoleOutput> {
        let session = CheckSessionUseCase::new(self.session_repo.clone(), self.config.clone())
            .execute(session_token)
            .await?;

        let user = self
            .user_repo
            .find_by_id(&session.user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let role = user.role().ok_or(AuthError::RoleNotFound)?;

        Ok(CheckRoleOutput { user, role })
    }
}
