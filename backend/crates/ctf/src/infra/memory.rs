//! In-Memory Repository
//!
//! Mirrors the PostgreSQL constraints: unique soal text / url / flag, one
//! completion per (user, soal), and no deletion of a soal with completions.
//! User names and roles come from the shared [`MemoryAuthRepository`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use auth::infra::memory::MemoryAuthRepository;
use chrono::{DateTime, Utc};
use kernel::id::{SoalId, UserId};

use crate::domain::entities::{Completion, Soal, SoalListing, SolvedSoal, Standing};
use crate::domain::repository::{
    CompletionRepository, LeaderboardRepository, SoalQuery, SoalRepository,
};
use crate::domain::services::{Participant, dense_rank};
use crate::domain::value_objects::{SoalField, SoalUrl};
use crate::error::{CtfError, CtfResult};

#[derive(Default)]
struct Store {
    soals: HashMap<SoalId, Soal>,
    completions: Vec<Completion>,
}

impl Store {
    fn completion(&self, user_id: &UserId, soal_id: &SoalId) -> Option<&Completion> {
        self.completions
            .iter()
            .find(|c| c.user_id == *user_id && c.soal_id == *soal_id)
    }

    fn attempts(&self, soal_id: &SoalId) -> i64 {
        self.completions
            .iter()
            .filter(|c| c.soal_id == *soal_id)
            .count() as i64
    }

    fn duplicates(&self, soal: &str, url: &str, flag: &str) -> Vec<SoalField> {
        let soals = || self.soals.values();
        let mut fields = Vec::new();
        if soals().any(|s| s.soal == soal) {
            fields.push(SoalField::Soal);
        }
        if soals().any(|s| s.url.as_ref().is_some_and(|u| u.as_str() == url)) {
            fields.push(SoalField::Url);
        }
        if soals().any(|s| s.flag.as_str() == flag) {
            fields.push(SoalField::Flag);
        }
        fields
    }
}

#[derive(Clone, Default)]
pub struct MemoryCtfRepository {
    store: Arc<Mutex<Store>>,
    users: MemoryAuthRepository,
}

impl MemoryCtfRepository {
    pub fn new(users: MemoryAuthRepository) -> Self {
        Self {
            store: Arc::default(),
            users,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert a soal as-is, bypassing uniqueness checks (fixtures)
    pub fn put_soal(&self, soal: Soal) {
        self.lock().soals.insert(soal.soal_id, soal);
    }

    pub fn soal_count(&self) -> usize {
        self.lock().soals.len()
    }

    pub fn completion_count(&self) -> usize {
        self.lock().completions.len()
    }

    /// Move a completion in time (fixtures)
    pub fn set_taken_at(&self, user_id: &UserId, soal_id: &SoalId, taken_at: DateTime<Utc>) {
        let mut store = self.lock();
        if let Some(c) = store
            .completions
            .iter_mut()
            .find(|c| c.user_id == *user_id && c.soal_id == *soal_id)
        {
            c.taken_at = taken_at;
        }
    }

    fn participants(&self) -> Vec<Participant> {
        let users = self.users.users();
        let store = self.lock();
        users
            .into_iter()
            .filter(|u| !u.is_admin())
            .map(|u| Participant {
                solved_count: store
                    .completions
                    .iter()
                    .filter(|c| c.user_id == u.user_id)
                    .count() as i64,
                user_id: u.user_id,
                name: u.name.as_str().to_string(),
                email: u.email.as_str().to_string(),
            })
            .collect()
    }
}

impl SoalRepository for MemoryCtfRepository {
    async fn insert_soal(&self, soal: &Soal) -> CtfResult<()> {
        let mut store = self.lock();
        let url = soal.url.as_ref().map(|u| u.as_str()).unwrap_or_default();
        let duplicates = store.duplicates(&soal.soal, url, soal.flag.as_str());
        if !duplicates.is_empty() {
            return Err(CtfError::Duplicate(duplicates));
        }
        store.soals.insert(soal.soal_id, soal.clone());
        Ok(())
    }

    async fn find_soal(&self, soal_id: &SoalId) -> CtfResult<Option<Soal>> {
        Ok(self.lock().soals.get(soal_id).cloned())
    }

    async fn find_duplicates(&self, soal: &str, url: &str, flag: &str) -> CtfResult<Vec<SoalField>> {
        Ok(self.lock().duplicates(soal, url, flag))
    }

    async fn list_soals(&self, query: &SoalQuery) -> CtfResult<Vec<SoalListing>> {
        let users: HashMap<UserId, _> = self
            .users
            .users()
            .into_iter()
            .map(|u| (u.user_id, u))
            .collect();
        let needle = query.search.as_deref().map(str::to_lowercase);

        let store = self.lock();
        let solver_matches = |soal: &Soal, needle: &str| {
            store
                .completions
                .iter()
                .filter(|c| c.soal_id == soal.soal_id)
                .filter_map(|c| users.get(&c.user_id))
                .any(|u| {
                    u.name.as_str().to_lowercase().contains(needle)
                        || u.email.as_str().contains(needle)
                })
        };

        let mut rows: Vec<SoalListing> = store
            .soals
            .values()
            .filter(|soal| query.categories.matches(&soal.category))
            .filter(|soal| match needle.as_deref() {
                None => true,
                Some(n) => soal.soal.to_lowercase().contains(n) || solver_matches(soal, n),
            })
            .map(|soal| SoalListing {
                soal: soal.clone(),
                attempt_count: store.attempts(&soal.soal_id),
                viewer_completion: store.completion(&query.viewer, &soal.soal_id).cloned(),
            })
            .filter(|row| !(query.exclude_solved && row.viewer_completion.is_some()))
            .collect();

        rows.sort_by(|a, b| b.soal.created_at.cmp(&a.soal.created_at));
        Ok(rows)
    }

    async fn search_soals(&self, q: &str) -> CtfResult<Vec<(Soal, i64)>> {
        let needle = q.to_lowercase();
        let store = self.lock();
        Ok(store
            .soals
            .values()
            .filter(|s| {
                s.soal.to_lowercase().contains(&needle)
                    || s.url
                        .as_ref()
                        .is_some_and(|u| u.as_str().to_lowercase().contains(&needle))
            })
            .map(|s| (s.clone(), store.attempts(&s.soal_id)))
            .collect())
    }

    async fn update_url(&self, soal_id: &SoalId, url: &SoalUrl) -> CtfResult<Soal> {
        let mut store = self.lock();
        if store.soals.values().any(|s| {
            s.soal_id != *soal_id && s.url.as_ref().map(|u| u.as_str()) == Some(url.as_str())
        }) {
            return Err(CtfError::Duplicate(vec![SoalField::Url]));
        }
        let soal = store
            .soals
            .get_mut(soal_id)
            .ok_or(CtfError::SoalNotFound)?;
        soal.set_url(url.clone());
        Ok(soal.clone())
    }

    async fn set_favorite(&self, soal_id: &SoalId, is_favorite: bool) -> CtfResult<Soal> {
        let mut store = self.lock();
        let soal = store
            .soals
            .get_mut(soal_id)
            .ok_or(CtfError::SoalNotFound)?;
        soal.set_favorite(is_favorite);
        Ok(soal.clone())
    }

    async fn delete_soal(&self, soal_id: &SoalId) -> CtfResult<()> {
        let mut store = self.lock();
        if store.attempts(soal_id) > 0 {
            return Err(CtfError::SoalInUse);
        }
        store.soals.remove(soal_id);
        Ok(())
    }

    async fn list_favorites(&self) -> CtfResult<Vec<Soal>> {
        let mut favorites: Vec<Soal> = self
            .lock()
            .soals
            .values()
            .filter(|s| s.is_favorite)
            .cloned()
            .collect();
        favorites.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(favorites)
    }

    async fn unattempted_soals(&self, user_id: &UserId, limit: i64) -> CtfResult<Vec<Soal>> {
        let store = self.lock();
        let mut soals: Vec<Soal> = store
            .soals
            .values()
            .filter(|s| store.completion(user_id, &s.soal_id).is_none())
            .cloned()
            .collect();
        soals.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        soals.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(soals)
    }

    async fn count_soals(&self) -> CtfResult<i64> {
        Ok(self.lock().soals.len() as i64)
    }
}

impl CompletionRepository for MemoryCtfRepository {
    async fn find_completion(
        &self,
        user_id: &UserId,
        soal_id: &SoalId,
    ) -> CtfResult<Option<Completion>> {
        Ok(self.lock().completion(user_id, soal_id).cloned())
    }

    async fn insert_completion(&self, completion: &Completion) -> CtfResult<bool> {
        let mut store = self.lock();
        if store
            .completion(&completion.user_id, &completion.soal_id)
            .is_some()
        {
            return Ok(false);
        }
        store.completions.push(completion.clone());
        Ok(true)
    }

    async fn count_completions_for_soal(&self, soal_id: &SoalId) -> CtfResult<i64> {
        Ok(self.lock().attempts(soal_id))
    }

    async fn count_completions_for_user(&self, user_id: &UserId) -> CtfResult<i64> {
        Ok(self
            .lock()
            .completions
            .iter()
            .filter(|c| c.user_id == *user_id)
            .count() as i64)
    }

    async fn solved_by_user(&self, user_id: &UserId) -> CtfResult<Vec<SolvedSoal>> {
        let store = self.lock();
        let mut solved: Vec<SolvedSoal> = store
            .completions
            .iter()
            .filter(|c| c.user_id == *user_id)
            .filter_map(|c| {
                store.soals.get(&c.soal_id).map(|soal| SolvedSoal {
                    soal: soal.clone(),
                    taken_at: c.taken_at,
                })
            })
            .collect();
        solved.sort_by(|a, b| b.taken_at.cmp(&a.taken_at));
        Ok(solved)
    }

    async fn completion_times_since(
        &self,
        user_id: &UserId,
        since: DateTime<Utc>,
    ) -> CtfResult<Vec<DateTime<Utc>>> {
        Ok(self
            .lock()
            .completions
            .iter()
            .filter(|c| c.user_id == *user_id && c.taken_at >= since)
            .map(|c| c.taken_at)
            .collect())
    }
}

impl LeaderboardRepository for MemoryCtfRepository {
    async fn standings(&self, offset: i64, limit: i64) -> CtfResult<Vec<Standing>> {
        let offset = usize::try_from(offset).unwrap_or(0);
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(dense_rank(self.participants())
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect())
    }

    async fn participant_count(&self) -> CtfResult<i64> {
        Ok(self.participants().len() as i64)
    }

    async fn standing_of(&self, user_id: &UserId) -> CtfResult<Option<Standing>> {
        Ok(dense_rank(self.participants())
            .into_iter()
            .find(|s| s.user_id == *user_id))
    }
}
