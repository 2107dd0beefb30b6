//! Auth Session Entity
//!
//! Server-side session referenced by the signed session cookie.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::value_object::{user_id::UserId, user_role::UserRole};

#[derive(Debug, Clone)]
pub struct AuthSession {
    pub session_id: Uuid,
    pub user_id: UserId,
    /// Role id copied from the user at sign-in
    pub user_role: i16,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl AuthSession {
    /// TTL is provided by the application layer (config)
    pub fn new(user_id: UserId, user_role: i16, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            session_id: Uuid::new_v4(),
            user_id,
            user_role,
            expires_at: now + ttl,
            created_at: now,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    pub fn role(&self) -> Option<UserRole> {
        UserRole::from_id(self.user_role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_not_expired() {
        let session = AuthSession::new(UserId::new(), UserRole::User.id(), Duration::days(30));
        assert!(!session.is_expired());
        assert_eq!(session.role(), Some(UserRole::User));
    }

    #[test]
    fn test_expired_session() {
        let session = AuthSession::new(UserId::new(), UserRole::Admin.id(), Duration::seconds(-1));
        assert!(session.is_expired());
    }

    #[test]
    fn test_unknown_role() {
        let session = AuthSession::new(UserId::new(), 7, Duration::days(1));
        assert_eq!(session.role(), None);
    }
}
