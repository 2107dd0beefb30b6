//! User Activity Use Case
//!
//! Feed of the caller's latest sign-in and most recent completions.

use std::sync::Arc;

use auth::Caller;
use auth::domain::repository::AuthSessionRepository;
use chrono::{DateTime, Utc};

use crate::application::config::CtfConfig;
use crate::domain::entities::{Activity, ActivityKind};
use crate::domain::repository::CompletionRepository;
use crate::error::CtfResult;

#[derive(Debug, Clone)]
pub struct UserActivity {
    pub last_login: Option<DateTime<Utc>>,
    /// Entries collected before truncation
    pub total_activities: usize,
    /// Newest first
    pub recent_activities: Vec<Activity>,
}

pub struct UserActivityUseCase<S, C>
where
    S: AuthSessionRepository,
    C: CompletionRepository,
{
    session_repo: Arc<S>,
    completion_repo: Arc<C>,
    config: Arc<CtfConfig>,
}

impl<S, C> UserActivityUseCase<S, C>
where
    S: AuthSessionRepository,
    C: CompletionRepository,
{
    pub fn new(session_repo: Arc<S>, completion_repo: Arc<C>, config: Arc<CtfConfig>) -> Self {
        Self {
            session_repo,
            completion_repo,
            config,
        }
    }

    pub async fn execute(&self, caller: &Caller) -> CtfResult<UserActivity> {
        let user_id = caller.user_id();

        let latest = self.session_repo.latest_for_user(&user_id).await?;
        let solved = self.completion_repo.solved_by_user(&user_id).await?;

        let mut activities: Vec<Activity> = latest
            .iter()
            .map(|session| Activity {
                kind: ActivityKind::Login,
                timestamp: session.created_at,
            })
            .chain(
                solved
                    .into_iter()
                    .take(self.config.activity_completions)
                    .map(|s| Activity {
                        kind: ActivityKind::QuestionSolved { title: s.soal.soal },
                        timestamp: s.taken_at,
                    }),
            )
            .collect();

        activities.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        let total_activities = activities.len();
        activities.truncate(self.config.activity_limit);

        Ok(UserActivity {
            last_login: latest.map(|s| s.created_at),
            total_activities,
            recent_activities: activities,
        })
    }
}
