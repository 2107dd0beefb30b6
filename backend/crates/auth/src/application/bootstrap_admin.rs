//! Bootstrap Admin Use Case
//!
//! Registration only ever creates `user` accounts and roles never change, so
//! the first admin is provisioned from configuration at startup.

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
use crate::error::AuthResult;

pub struct BootstrapAdminUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> BootstrapAdminUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { user_repo, config }
    }

    /// Create the admin account unless the email is already registered
    ///
    /// Returns `true` when a new account was created. An existing account is
    /// left untouched, whatever its role.
    pub async fn execute(&self, name: &str, email: &str, password: String) -> AuthResult<bool> {
        let email = Email::new(email)?;
        if self.user_repo.exists_by_email(&email).await? {
            tracing::debug!(email = %email, "Admin account already present");
            return Ok(false);
        }

        let raw = RawPassword::new(password)?;
        let user = User::new(
            UserName::new(name)?,
            email,
            UserPassword::from_raw(&raw, self.config.pepper())?,
            UserRole::Admin,
        );
        self.user_repo.create(&user).await?;

        tracing::info!(user_id = %user.user_id, email = %user.email, "Admin account created");
        Ok(true)
    }
}
