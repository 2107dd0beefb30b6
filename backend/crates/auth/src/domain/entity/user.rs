//! User Entity

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    email::Email, user_id::UserId, user_name::UserName, user_password::UserPassword,
    user_role::UserRole,
};

/// Registered account
///
/// The role is fixed at creation time.
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    pub name: UserName,
    /// Lowercased, unique
    pub email: Email,
    pub password_hash: UserPassword,
    /// Raw stored role id; see [`User::role`]
    pub user_role: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: UserName, email: Email, password_hash: UserPassword, role: UserRole) -> Self {
        let now = Utc::now();

        Self {
            user_id: UserId::new(),
            name,
            email,
            password_hash,
            user_role: role.id(),
            created_at: now,
            updated_at: now,
        }
    }

    /// `None` when the stored id is not a known role
    pub fn role(&self) -> Option<UserRole> {
        UserRole::from_id(self.user_role)
    }

    pub fn is_admin(&self) -> bool {
        self.role().is_some_and(|r| r.is_admin())
    }

    pub fn set_name(&mut self, name: UserName) {
        self.name = name;
        self.updated_at = Utc::now();
    }

    pub fn set_email(&mut self, email: Email) {
        self.email = email;
        self.updated_at = Utc::now();
    }

    pub fn set_password(&mut self, password_hash: UserPassword) {
        self.password_hash = password_hash;
        self.updated_at = Utc::now();
    }
}
