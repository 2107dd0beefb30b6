//! Fixtures shared by the use case tests

use std::cell::Cell;
use std::sync::{Arc, OnceLock};

use auth::domain::entity::user::User;
use auth::domain::value_object::{
    email::Email,
    user_name::UserName,
    user_password::{RawPassword, UserPassword},
    user_role::UserRole,
};
use auth::infra::memory::MemoryAuthRepository;
use auth::{Caller, CallerIdentity};
use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use crate::application::config::CtfConfig;
use crate::domain::entities::{Completion, Soal};
use crate::domain::repository::CompletionRepository;
use crate::domain::value_objects::{Flag, SoalUrl};
use crate::infra::memory::MemoryCtfRepository;

/// Argon2 is slow; every fixture user shares one hash
fn shared_password() -> UserPassword {
    static HASH: OnceLock<UserPassword> = OnceLock::new();
    HASH.get_or_init(|| {
        let raw = RawPassword::new("Fixture123".to_string()).unwrap();
        UserPassword::from_raw(&raw, None).unwrap()
    })
    .clone()
}

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub struct TestEnv {
    pub auth: Arc<MemoryAuthRepository>,
    pub ctf: Arc<MemoryCtfRepository>,
    pub config: Arc<CtfConfig>,
    /// Fixture soals are created one minute apart, in call order
    created: Cell<i64>,
}

impl TestEnv {
    pub fn new() -> Self {
        let auth = MemoryAuthRepository::new();
        Self {
            ctf: Arc::new(MemoryCtfRepository::new(auth.clone())),
            auth: Arc::new(auth),
            config: Arc::new(CtfConfig::default()),
            created: Cell::new(0),
        }
    }

    fn insert(&self, name: &str, email: &str, role: UserRole) -> User {
        let user = User::new(
            UserName::new(name).unwrap(),
            Email::new(email).unwrap(),
            shared_password(),
            role,
        );
        self.auth.insert_user(user.clone());
        user
    }

    pub fn user(&self, name: &str, email: &str) -> User {
        self.insert(name, email, UserRole::User)
    }

    pub fn admin(&self, name: &str, email: &str) -> User {
        self.insert(name, email, UserRole::Admin)
    }

    pub fn soal(&self, text: &str, category: &str) -> Soal {
        let n = self.created.get();
        self.created.set(n + 1);

        let mut soal = Soal::new(
            text,
            SoalUrl::new(&format!("https://ctf.example/{}", Uuid::new_v4())).unwrap(),
            Flag::new(&format!("CTF{{{}}}", Uuid::new_v4().simple())),
            category,
        );
        soal.created_at = epoch() + Duration::minutes(n);
        soal.updated_at = soal.created_at;
        self.ctf.put_soal(soal.clone());
        soal
    }

    pub async fn complete(&self, user: &User, soal: &Soal) -> Completion {
        let completion = Completion::new(user.user_id, soal.soal_id);
        assert!(self.ctf.insert_completion(&completion).await.unwrap());
        completion
    }
}

fn identity(user: &User) -> CallerIdentity {
    CallerIdentity {
        user_id: user.user_id,
        session_id: Uuid::new_v4(),
    }
}

pub fn standard(user: &User) -> Caller {
    Caller::Standard(identity(user))
}
