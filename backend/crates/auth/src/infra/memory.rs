//! In-Memory Repository
//!
//! Same uniqueness rules as the PostgreSQL schema. Used by tests of this
//! crate and of crates depending on it (`memory` feature).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use uuid::Uuid;

use crate::domain::entity::{auth_session::AuthSession, user::User};
use crate::domain::repository::{AuthSessionRepository, UserRepository};
use crate::domain::value_object::{email::Email, user_id::UserId};
use crate::error::{AuthError, AuthResult};

#[derive(Default)]
struct Store {
    users: HashMap<UserId, User>,
    sessions: HashMap<Uuid, AuthSession>,
}

#[derive(Clone, Default)]
pub struct MemoryAuthRepository {
    store: Arc<Mutex<Store>>,
}

impl MemoryAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert a user as-is, bypassing validation (fixtures)
    pub fn insert_user(&self, user: User) {
        self.lock().users.insert(user.user_id, user);
    }

    pub fn session_count(&self) -> usize {
        self.lock().sessions.len()
    }

    pub fn has_session(&self, session_id: Uuid) -> bool {
        self.lock().sessions.contains_key(&session_id)
    }

    /// Snapshot of every user (used by aggregation fakes)
    pub fn users(&self) -> Vec<User> {
        self.lock().users.values().cloned().collect()
    }
}

impl UserRepository for MemoryAuthRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        let mut store = self.lock();
        if store.users.values().any(|u| u.email == user.email) {
            return Err(AuthError::EmailTaken);
        }
        store.users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        Ok(self.lock().users.get(user_id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|u| u.email == *email)
            .cloned())
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        Ok(self.lock().users.values().any(|u| u.email == *email))
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        let mut store = self.lock();
        if store
            .users
            .values()
            .any(|u| u.email == user.email && u.user_id != user.user_id)
        {
            return Err(AuthError::EmailTaken);
        }
        match store.users.get_mut(&user.user_id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(())
            }
            None => Err(AuthError::UserNotFound),
        }
    }

    async fn list_all(&self) -> AuthResult<Vec<User>> {
        let mut users = self.users();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }
}

impl AuthSessionRepository for MemoryAuthRepository {
    async fn create(&self, session: &AuthSession) -> AuthResult<()> {
        self.lock()
            .sessions
            .insert(session.session_id, session.clone());
        Ok(())
    }

    async fn find_by_id(&self, session_id: Uuid) -> AuthResult<Option<AuthSession>> {
        Ok(self.lock().sessions.get(&session_id).cloned())
    }

    async fn delete(&self, session_id: Uuid) -> AuthResult<()> {
        self.lock().sessions.remove(&session_id);
        Ok(())
    }

    async fn delete_all_for_user(&self, user_id: &UserId) -> AuthResult<u64> {
        let mut store = self.lock();
        let before = store.sessions.len();
        store.sessions.retain(|_, s| s.user_id != *user_id);
        Ok((before - store.sessions.len()) as u64)
    }

    async fn latest_for_user(&self, user_id: &UserId) -> AuthResult<Option<AuthSession>> {
        Ok(self
            .lock()
            .sessions
            .values()
            .filter(|s| s.user_id == *user_id)
            .max_by_key(|s| s.created_at)
            .cloned())
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let now = Utc::now();
        let mut store = self.lock();
        let before = store.sessions.len();
        store.sessions.retain(|_, s| s.expires_at > now);
        Ok((before - store.sessions.len()) as u64)
    }
}
