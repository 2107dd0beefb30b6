//! Register Use Case
//!
//! Creates a new account with the `user` role.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email,
    user_name::UserName,
    user_password::{RawPassword, UserPassword},
    user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

/// Register input, fields are optional so that every missing one is reported
#[derive(Debug, Default)]
pub struct RegisterInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Register use case
pub struct RegisterUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> RegisterUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { user_repo, config }
    }

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<User> {
        let name = input.name.unwrap_or_default();
        let email = input.email.unwrap_or_default();
        let password = input.password.unwrap_or_default();

        let mut missing = Vec::new();
        if name.trim().is_empty() {
            missing.push("Name is required");
        }
        if email.trim().is_empty() {
            missing.push("Email is required");
        }
        if password.is_empty() {
            missing.push("Password is required");
        }
        if !missing.is_empty() {
            return Err(AuthError::Validation(missing.join(", ")));
        }

        let email = Email::new(&email)?;
        let raw_password = RawPassword::new(password)?;
        let name = UserName::new(&name)?;

        if self.user_repo.exists_by_email(&email).await? {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = UserPassword::from_raw(&raw_password, self.config.pepper())?;
        let user = User::new(name, email, password_hash, UserRole::User);

        // 同時登録はユニーク制約で EmailTaken になる
        self.user_repo.create(&user).await?;

        tracing::info!(
            user_id = %user.user_id,
            email = %user.email,
            "User registered"
        );

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::memory::MemoryAuthRepository;

    fn use_case() -> RegisterUseCase<MemoryAuthRepository> {
        RegisterUseCase::new(
            Arc::new(MemoryAuthRepository::new()),
            Arc::new(AuthConfig::development()),
        )
    }

    fn input(name: &str, email: &str, password: &str) -> RegisterInput {
        RegisterInput {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    #[tokio::test]
    async fn test_register_lowercases_email() {
        let use_case = use_case();
        let user = use_case
            .execute(input("Alice", "ALICE@x.com", "Passw0rd"))
            .await
            .unwrap();

        assert_eq!(user.email.as_str(), "alice@x.com");
        assert_eq!(user.role(), Some(UserRole::User));
        assert_eq!(user.name.as_str(), "Alice");
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let use_case = use_case();
        use_case
            .execute(input("Alice", "alice@x.com", "Passw0rd"))
            .await
            .unwrap();

        let err = use_case
            .execute(input("Other", "ALICE@X.COM", "Passw0rd"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
    }

    #[tokio::test]
    async fn test_register_missing_fields() {
        let err = use_case()
            .execute(RegisterInput {
                name: Some("  ".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();

        match err {
            AuthError::Validation(msg) => assert_eq!(
                msg,
                "Name is required, Email is required, Password is required"
            ),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_register_rejects_bad_input() {
        let use_case = use_case();
        assert!(matches!(
            use_case.execute(input("Bob", "bob-at-x", "Passw0rd")).await,
            Err(AuthError::InvalidEmail)
        ));
        assert!(matches!(
            use_case.execute(input("Bob", "bob@x.com", "password")).await,
            Err(AuthError::WeakPassword(_))
        ));
    }
}
