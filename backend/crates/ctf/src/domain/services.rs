//! Domain Services
//!
//! Pure aggregation logic shared by the use cases and the in-memory store.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use kernel::id::UserId;

use crate::domain::entities::{DailyCount, Standing};

/// `completed / total * 100` with two decimals
///
/// A catalogue without soals counts as fully completed.
pub fn completion_percentage(completed: i64, total: i64) -> String {
    if total <= 0 {
        return "100.00".to_string();
    }
    format!("{:.2}", completed as f64 / total as f64 * 100.0)
}

/// Group completion times by UTC day, keeping those at or after `since`
pub fn daily_completion_counts<I>(taken_at: I, since: DateTime<Utc>) -> Vec<DailyCount>
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let mut days: BTreeMap<_, i64> = BTreeMap::new();
    for at in taken_at.into_iter().filter(|at| *at >= since) {
        *days.entry(at.date_naive()).or_default() += 1;
    }
    days.into_iter()
        .map(|(date, count)| DailyCount { date, count })
        .collect()
}

/// Participant before ranking
#[derive(Debug, Clone)]
pub struct Participant {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub solved_count: i64,
}

/// Order by solved count (desc), name, id and assign dense ranks
pub fn dense_rank(mut participants: Vec<Participant>) -> Vec<Standing> {
    participants.sort_by(|a, b| {
        b.solved_count
            .cmp(&a.solved_count)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.user_id.cmp(&b.user_id))
    });

    let mut rank = 0;
    let mut previous = None;
    participants
        .into_iter()
        .map(|p| {
            if previous != Some(p.solved_count) {
                rank += 1;
                previous = Some(p.solved_count);
            }
            Standing {
                rank,
                user_id: p.user_id,
                name: p.name,
                email: p.email,
                solved_count: p.solved_count,
            }
        })
        .collect()
}
