//! Caller
//!
//! Identity resolved by the access gate and handed to handlers. Capability is
//! carried in the variant, so handlers never compare role strings.

use uuid::Uuid;

use crate::domain::entity::auth_session::AuthSession;
use crate::domain::value_object::{user_id::UserId, user_role::UserRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerIdentity {
    pub user_id: UserId,
    pub session_id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
    Admin(CallerIdentity),
    Standard(CallerIdentity),
}

impl Caller {
    /// `None` when the session carries an unknown role
    pub fn from_session(session: &AuthSession) -> Option<Self> {
        let identity = CallerIdentity {
            user_id: session.user_id,
            session_id: session.session_id,
        };
        match session.role()? {
            UserRole::Admin => Some(Caller::Admin(identity)),
            UserRole::User => Some(Caller::Standard(identity)),
        }
    }

    pub fn identity(&self) -> &CallerIdentity {
        match self {
            Caller::Admin(identity) | Caller::Standard(identity) => identity,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.identity().user_id
    }

    pub fn session_id(&self) -> Uuid {
        self.identity().session_id
    }

    pub fn role(&self) -> UserRole {
        match self {
            Caller::Admin(_) => UserRole::Admin,
            Caller::Standard(_) => UserRole::User,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Caller::Admin(_))
    }

    /// Admins may act on any account, everyone else only on their own
    pub fn can_access(&self, user_id: &UserId) -> bool {
        self.is_admin() || self.user_id() == *user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_caller_from_session() {
        let admin = AuthSession::new(UserId::new(), UserRole::Admin.id(), Duration::days(1));
        let caller = Caller::from_session(&admin).unwrap();
        assert!(caller.is_admin());
        assert_eq!(caller.user_id(), admin.user_id);
        assert_eq!(caller.session_id(), admin.session_id);

        let bogus = AuthSession::new(UserId::new(), 42, Duration::days(1));
        assert!(Caller::from_session(&bogus).is_none());
    }

    #[test]
    fn test_can_access() {
        let me = UserId::new();
        let other = UserId::new();
        let standard = Caller::Standard(CallerIdentity {
            user_id: me,
            session_id: Uuid::new_v4(),
        });
        assert!(standard.can_access(&me));
        assert!(!standard.can_access(&other));

        let admin = Caller::Admin(CallerIdentity {
            user_id: me,
            session_id: Uuid::new_v4(),
        });
        assert!(admin.can_access(&other));
    }
}
