//! Check Session Use Case
//!
//! Verifies a signed session token and resolves the stored session.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::entity::{auth_session::AuthSession, caller::Caller};
use crate::domain::repository::AuthSessionRepository;
use crate::error::{AuthError, AuthResult};
use uuid::Uuid;

/// Check session use case
pub struct CheckSessionUseCase<S>
where
    S: AuthSessionRepository,
{
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<S> CheckSessionUseCase<S>
where
    S: AuthSessionRepository,
{
    pub fn new(session_repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            session_repo,
            config,
        }
    }

    /// Return the live session behind `session_token`
    ///
    /// Expired sessions are deleted and reported as invalid.
    pub async fn execute(&self, session_token: &str) -> AuthResult<AuthSession> {
        let session_id = parse_session_token(&self.config, session_token)?;

        let session = self
            .session_repo
            .find_by_id(session_id)
            .await?
            .ok_or(AuthError::SessionInvalid)?;

        if session.is_expired() {
            self.session_repo.delete(session_id).await?;
            tracing::debug!(session_id = %session_id, "Expired session removed");
            return Err(AuthError::SessionInvalid);
        }

        Ok(session)
    }

    /// Resolve the caller, `Ok(None)` when the stored role is unknown
    pub async fn caller(&self, session_token: &str) -> AuthResult<Option<Caller>> {
        let session = self.execute(session_token).await?;
        Ok(Caller::from_session(&session))
    }
}

/// `"<session uuid>.<base64url hmac>"`
pub fn issue_session_token(config: &AuthConfig, session: &AuthSession) -> String {
    platform::crypto::sign_token(&config.session_secret, &session.session_id.to_string())
}

/// Verify the signature and extract the session id
pub fn parse_session_token(config: &AuthConfig, token: &str) -> AuthResult<Uuid> {
    let session_id = platform::crypto::verify_token(&config.session_secret, token)
        .ok_or(AuthError::SessionInvalid)?;

    session_id.parse().map_err(|_| AuthError::SessionInvalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::{user_id::UserId, user_role::UserRole};
    use crate::infra::memory::MemoryAuthRepository;
    use chrono::Duration;

    fn setup() -> (Arc<MemoryAuthRepository>, Arc<AuthConfig>) {
        (
            Arc::new(MemoryAuthRepository::new()),
            Arc::new(AuthConfig::development()),
        )
    }

    #[test]
    fn test_token_roundtrip() {
        let config = AuthConfig::development();
        let session = AuthSession::new(UserId::new(), UserRole::User.id(), Duration::days(1));

        let token = issue_session_token(&config, &session);
        assert_eq!(parse_session_token(&config, &token).unwrap(), session.session_id);

        let other = AuthConfig::development();
        tokio_test::assert_err!(parse_session_token(&other, &token));
        tokio_test::assert_err!(parse_session_token(&config, "garbage"));
    }

    #[tokio::test]
    async fn test_valid_session() {
        let (repo, config) = setup();
        let session = AuthSession::new(UserId::new(), UserRole::Admin.id(), Duration::days(1));
        repo.create(&session).await.unwrap();

        let use_case = CheckSessionUseCase::new(repo, config.clone());
        let token = issue_session_token(&config, &session);

        let found = use_case.execute(&token).await.unwrap();
        assert_eq!(found.session_id, session.session_id);

        let caller = use_case.caller(&token).await.unwrap().unwrap();
        assert!(caller.is_admin());
    }

    #[tokio::test]
    async fn test_expired_session_is_removed() {
        let (repo, config) = setup();
        let session = AuthSession::new(UserId::new(), UserRole::User.id(), Duration::seconds(-5));
        repo.create(&session).await.unwrap();

        let use_case = CheckSessionUseCase::new(repo.clone(), config.clone());
        let token = issue_session_token(&config, &session);

        assert!(matches!(
            use_case.execute(&token).await,
            Err(AuthError::SessionInvalid)
        ));
        assert!(repo.find_by_id(session.session_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_role_yields_no_caller() {
        let (repo, config) = setup();
        let session = AuthSession::new(UserId::new(), 9, Duration::days(1));
        repo.create(&session).await.unwrap();

        let use_case = CheckSessionUseCase::new(repo, config.clone());
        let token = issue_session_token(&config, &session);
        assert!(use_case.caller(&token).await.unwrap().is_none());
    }
}
