//! Sign In Use Case
//!
//! Authenticates a user by email and password and creates a session.

use std::sync::Arc;

use crate::application::check_session::issue_session_token;
use crate::application::config::AuthConfig;
use crate::domain::entity::{auth_session::AuthSession, user::User};
use crate::domain::repository::{AuthSessionRepository, UserRepository};
use crate::domain::value_object::{email::Email, user_password::RawPassword};
use crate::error::{AuthError, AuthResult};

/// Sign in input
#[derive(Debug, Default)]
pub struct SignInInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Sign in output
pub struct SignInOutput {
    /// Session token for cookie
    pub session_token: String,
    pub user: User,
}

/// Sign in use case
pub struct SignInUseCase<U, S>
where
    U: UserRepository,
    S: AuthSessionRepository,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<U, S> SignInUseCase<U, S>
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

    pub async fn execute(&self, input: SignInInput) -> AuthResult<SignInOutput> {
        let (Some(email), Some(password)) = (
            input.email.filter(|e| !e.trim().is_empty()),
            input.password.filter(|p| !p.is_empty()),
        ) else {
            return Err(AuthError::Validation(
                "Email and password are required".to_string(),
            ));
        };

        // 形式不正は存在しないアカウントと同じ扱い
        let email = Email::new(&email).map_err(|_| AuthError::InvalidCredentials)?;

        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let raw_password = RawPassword::for_verification(password);
        if !user.password_hash.verify(&raw_password, self.config.pepper()) {
            tracing::warn!(user_id = %user.user_id, "Password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let session = AuthSession::new(user.user_id, user.user_role, self.config.session_ttl_chrono());
        self.session_repo.create(&session).await?;

        let session_token = issue_session_token(&self.config, &session);

        tracing::info!(
            user_id = %user.user_id,
            session_id = %session.session_id,
            "User signed in"
        );

        Ok(SignInOutput {
            session_token,
            user,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::check_session::parse_session_token;
    use crate::application::register::{RegisterInput, RegisterUseCase};
    use crate::infra::memory::MemoryAuthRepository;

    async fn setup() -> (Arc<MemoryAuthRepository>, Arc<AuthConfig>) {
        let repo = Arc::new(MemoryAuthRepository::new());
        let config = Arc::new(AuthConfig::development());
        RegisterUseCase::new(repo.clone(), config.clone())
            .execute(RegisterInput {
                name: Some("Alice".into()),
                email: Some("alice@x.com".into()),
                password: Some("Passw0rd".into()),
            })
            .await
            .unwrap();
        (repo, config)
    }

    fn credentials(email: &str, password: &str) -> SignInInput {
        SignInInput {
            email: Some(email.into()),
            password: Some(password.into()),
        }
    }

    #[tokio::test]
    async fn test_sign_in_creates_one_session() {
        let (repo, config) = setup().await;
        let use_case = SignInUseCase::new(repo.clone(), repo.clone(), config.clone());

        let output = use_case
            .execute(credentials("Alice@X.com", "Passw0rd"))
            .await
            .unwrap();

        let session_id = parse_session_token(&config, &output.session_token).unwrap();
        assert!(repo.has_session(session_id));
        assert_eq!(repo.session_count(), 1);
    }

    #[tokio::test]
    async fn test_sign_in_wrong_password() {
        let (repo, config) = setup().await;
        let use_case = SignInUseCase::new(repo.clone(), repo.clone(), config);

        assert!(matches!(
            use_case.execute(credentials("alice@x.com", "passw0rd")).await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            use_case.execute(credentials("nobody@x.com", "Passw0rd")).await,
            Err(AuthError::InvalidCredentials)
        ));
        assert_eq!(repo.session_count(), 0);
    }

    #[tokio::test]
    async fn test_sign_in_missing_fields() {
        let (repo, config) = setup().await;
        let use_case = SignInUseCase::new(repo.clone(), repo, config);

        assert!(matches!(
            use_case.execute(SignInInput::default()).await,
            Err(AuthError::Validation(_))
        ));
    }
}
