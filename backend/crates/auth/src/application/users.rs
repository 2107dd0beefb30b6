//! User Administration Use Cases
//!
//! Listing is admin-only and enforced by the access gate. Reading and
//! updating a single account is open to the owner and to admins.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::entity::{caller::Caller, user::User};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email,
    user_id::UserId,
    user_name::UserName,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

/// Partial profile update, absent or blank fields keep their current value
#[derive(Debug, Default)]
pub struct UpdateUserInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl UpdateUserInput {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password.is_none()
    }
}

pub struct UsersUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> UsersUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { user_repo, config }
    }

    /// All users, newest first
    pub async fn list(&self) -> AuthResult<Vec<User>> {
        self.user_repo.list_all().await
    }

    pub async fn get(&self, caller: &Caller, user_id: &UserId) -> AuthResult<User> {
        if !caller.can_access(user_id) {
            return Err(AuthError::AccessDenied);
        }

        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    pub async fn update(
        &self,
        caller: &Caller,
        user_id: &UserId,
        input: UpdateUserInput,
    ) -> AuthResult<User> {
        if !caller.can_access(user_id) {
            return Err(AuthError::AccessDenied);
        }
        if input.is_empty() {
            return Err(AuthError::NoUpdateData);
        }

        let email = match input.email.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(Email::new(raw)?),
            _ => None,
        };

        let mut user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if let Some(name) = input.name.filter(|n| !n.trim().is_empty()) {
            user.set_name(UserName::new(&name)?);
        }

        if let Some(email) = email {
            if email != user.email {
                if self.user_repo.exists_by_email(&email).await? {
                    return Err(AuthError::EmailTaken);
                }
                user.set_email(email);
            }
        }

        if let Some(password) = input.password.filter(|p| !p.is_empty()) {
            let raw = RawPassword::new(password)?;
            user.set_password(UserPassword::from_raw(&raw, self.config.pepper())?);
        }

        self.user_repo.update(&user).await?;

        tracing::info!(user_id = %user.user_id, by = %caller.user_id(), "User updated");

        Ok(user)
    }
}
