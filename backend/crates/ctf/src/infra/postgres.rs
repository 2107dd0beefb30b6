//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::error::conversions::{is_foreign_key_violation, unique_violation_constraint};
use kernel::id::{CompletionId, SoalId, UserId};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::entities::{Completion, Soal, SoalListing, SolvedSoal, Standing};
use crate::domain::repository::{
    CompletionRepository, LeaderboardRepository, SoalQuery, SoalRepository,
};
use crate::domain::value_objects::{Flag, SoalField, SoalUrl};
use crate::error::{CtfError, CtfResult};

/// PostgreSQL-backed soal / completion / leaderboard repository
#[derive(Clone)]
pub struct PgCtfRepository {
    pool: PgPool,
}

impl PgCtfRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// soals の一意制約違反を衝突カラムに変換
fn map_soal_write_error(err: sqlx::Error) -> CtfError {
    match unique_violation_constraint(&err) {
        Some(constraint) => {
            let fields = SoalField::from_constraint(&constraint).into_iter().collect();
            CtfError::Duplicate(fields)
        }
        None => CtfError::Database(err),
    }
}

/// Escape LIKE wildcards so user input matches literally
fn like_pattern(raw: &str) -> String {
    let escaped = raw
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

const SOAL_COLUMNS: &str = r#"
    s.soal_id,
    s.soal,
    s.url,
    s.flag,
    s.category,
    s.is_favorite,
    s.created_at,
    s.updated_at
"#;

/// Non-admin users with their solved counts and dense rank
const STANDINGS_CTE: &str = r#"
    WITH counts AS (
        SELECT u.user_id, u.name, u.email, COUNT(us.soal_id) AS solved_count
        FROM users u
        LEFT JOIN user_soals us ON us.user_id = u.user_id
        WHERE u.user_role <> 2
        GROUP BY u.user_id, u.name, u.email
    ),
    ranked AS (
        SELECT
            DENSE_RANK() OVER (ORDER BY solved_count DESC) AS rank,
            user_id,
            name,
            email,
            solved_count
        FROM counts
    )
"#;

// ============================================================================
// Soal Repository Implementation
// ============================================================================

impl SoalRepository for PgCtfRepository {
    async fn insert_soal(&self, soal: &Soal) -> CtfResult<()> {
        sqlx::query(
            r#"
            INSERT INTO soals (
                soal_id,
                soal,
                url,
                flag,
                category,
                is_favorite,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(soal.soal_id.as_uuid())
        .bind(&soal.soal)
        .bind(soal.url.as_ref().map(|u| u.as_str()))
        .bind(soal.flag.as_str())
        .bind(&soal.category)
        .bind(soal.is_favorite)
        .bind(soal.created_at)
        .bind(soal.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_soal_write_error)?;

        Ok(())
    }

    async fn find_soal(&self, soal_id: &SoalId) -> CtfResult<Option<Soal>> {
        let row = sqlx::query_as::<_, SoalRow>(&format!(
            "SELECT {SOAL_COLUMNS} FROM soals s WHERE s.soal_id = $1"
        ))
        .bind(soal_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SoalRow::into_soal))
    }

    async fn find_duplicates(&self, soal: &str, url: &str, flag: &str) -> CtfResult<Vec<SoalField>> {
        let (soal_taken, url_taken, flag_taken) = sqlx::query_as::<_, (bool, bool, bool)>(
            r#"
            SELECT
                COALESCE(bool_or(soal = $1), FALSE),
                COALESCE(bool_or(url = $2), FALSE),
                COALESCE(bool_or(flag = $3), FALSE)
            FROM soals
            WHERE soal = $1 OR url = $2 OR flag = $3
            "#,
        )
        .bind(soal)
        .bind(url)
        .bind(flag)
        .fetch_one(&self.pool)
        .await?;

        let fields = [
            (soal_taken, SoalField::Soal),
            (url_taken, SoalField::Url),
            (flag_taken, SoalField::Flag),
        ];
        Ok(fields
            .into_iter()
            .filter_map(|(taken, field)| taken.then_some(field))
            .collect())
    }

    async fn list_soals(&self, query: &SoalQuery) -> CtfResult<Vec<SoalListing>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            r#"
            SELECT
                {SOAL_COLUMNS},
                (SELECT COUNT(*) FROM user_soals a WHERE a.soal_id = s.soal_id) AS attempt_count,
                v.completion_id AS viewer_completion_id,
                v.taken_at AS viewer_taken_at
            FROM soals s
            LEFT JOIN user_soals v ON v.soal_id = s.soal_id AND v.user_id = "#
        ));
        qb.push_bind(*query.viewer.as_uuid());
        qb.push(" WHERE TRUE");

        if let Some(search) = &query.search {
            let pattern = like_pattern(search);
            qb.push(" AND (s.soal ILIKE ")
                .push_bind(pattern.clone())
                .push(
                    " OR EXISTS (SELECT 1 FROM user_soals x JOIN users u ON u.user_id = x.user_id \
                     WHERE x.soal_id = s.soal_id AND (u.name ILIKE ",
                )
                .push_bind(pattern.clone())
                .push(" OR u.email ILIKE ")
                .push_bind(pattern)
                .push(")))");
        }

        if !query.categories.is_empty() {
            qb.push(
                " AND EXISTS (SELECT 1 FROM unnest(string_to_array(s.category, ',')) AS tag \
                 WHERE lower(btrim(tag)) = ANY(",
            )
            .push_bind(query.categories.tags().to_vec())
            .push("))");
        }

        if query.exclude_solved {
            qb.push(" AND v.completion_id IS NULL");
        }

        qb.push(" ORDER BY s.created_at DESC");

        let rows = qb
            .build_query_as::<SoalListingRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| row.into_listing(query.viewer))
            .collect())
    }

    async fn search_soals(&self, q: &str) -> CtfResult<Vec<(Soal, i64)>> {
        let rows = sqlx::query_as::<_, SoalCountRow>(&format!(
            r#"
            SELECT
                {SOAL_COLUMNS},
                (SELECT COUNT(*) FROM user_soals a WHERE a.soal_id = s.soal_id) AS attempt_count
            FROM soals s
            WHERE s.soal ILIKE $1 OR s.url ILIKE $1
            ORDER BY s.created_at DESC
            "#
        ))
        .bind(like_pattern(q))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.soal.into_soal(), row.attempt_count))
            .collect())
    }

    async fn update_url(&self, soal_id: &SoalId, url: &SoalUrl) -> CtfResult<Soal> {
        let row = sqlx::query_as::<_, SoalRow>(&format!(
            r#"
            UPDATE soals AS s SET
                url = $2,
                updated_at = NOW()
            WHERE s.soal_id = $1
            RETURNING {SOAL_COLUMNS}
            "#
        ))
        .bind(soal_id.as_uuid())
        .bind(url.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_soal_write_error)?;

        row.map(SoalRow::into_soal).ok_or(CtfError::SoalNotFound)
    }

    async fn set_favorite(&self, soal_id: &SoalId, is_favorite: bool) -> CtfResult<Soal> {
        let row = sqlx::query_as::<_, SoalRow>(&format!(
            r#"
            UPDATE soals AS s SET
                is_favorite = $2,
                updated_at = NOW()
            WHERE s.soal_id = $1
            RETURNING {SOAL_COLUMNS}
            "#
        ))
        .bind(soal_id.as_uuid())
        .bind(is_favorite)
        .fetch_optional(&self.pool)
        .await?;

        row.map(SoalRow::into_soal).ok_or(CtfError::SoalNotFound)
    }

    async fn delete_soal(&self, soal_id: &SoalId) -> CtfResult<()> {
        sqlx::query("DELETE FROM soals WHERE soal_id = $1")
            .bind(soal_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                // ON DELETE RESTRICT
                if is_foreign_key_violation(&e) {
                    CtfError::SoalInUse
                } else {
                    CtfError::Database(e)
                }
            })?;

        Ok(())
    }

    async fn list_favorites(&self) -> CtfResult<Vec<Soal>> {
        let rows = sqlx::query_as::<_, SoalRow>(&format!(
            "SELECT {SOAL_COLUMNS} FROM soals s WHERE s.is_favorite ORDER BY s.updated_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SoalRow::into_soal).collect())
    }

    async fn unattempted_soals(&self, user_id: &UserId, limit: i64) -> CtfResult<Vec<Soal>> {
        let rows = sqlx::query_as::<_, SoalRow>(&format!(
            r#"
            SELECT {SOAL_COLUMNS}
            FROM soals s
            WHERE NOT EXISTS (
                SELECT 1 FROM user_soals us
                WHERE us.soal_id = s.soal_id AND us.user_id = $1
            )
            ORDER BY s.created_at ASC
            LIMIT $2
            "#
        ))
        .bind(user_id.as_uuid())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SoalRow::into_soal).collect())
    }

    async fn count_soals(&self) -> CtfResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM soals")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// ============================================================================
// Completion Repository Implementation
// ============================================================================

impl CompletionRepository for PgCtfRepository {
    async fn find_completion(
        &self,
        user_id: &UserId,
        soal_id: &SoalId,
    ) -> CtfResult<Option<Completion>> {
        let row = sqlx::query_as::<_, CompletionRow>(
            r#"
            SELECT completion_id, user_id, soal_id, taken_at
            FROM user_soals
            WHERE user_id = $1 AND soal_id = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(soal_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CompletionRow::into_completion))
    }

    async fn insert_completion(&self, completion: &Completion) -> CtfResult<bool> {
        // 同時提出の敗者は 0 行になる
        let inserted = sqlx::query(
            r#"
            INSERT INTO user_soals (completion_id, user_id, soal_id, taken_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, soal_id) DO NOTHING
            "#,
        )
        .bind(completion.completion_id.as_uuid())
        .bind(completion.user_id.as_uuid())
        .bind(completion.soal_id.as_uuid())
        .bind(completion.taken_at)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(inserted == 1)
    }

    async fn count_completions_for_soal(&self, soal_id: &SoalId) -> CtfResult<i64> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM user_soals WHERE soal_id = $1")
                .bind(soal_id.as_uuid())
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    async fn count_completions_for_user(&self, user_id: &UserId) -> CtfResult<i64> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM user_soals WHERE user_id = $1")
                .bind(user_id.as_uuid())
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    async fn solved_by_user(&self, user_id: &UserId) -> CtfResult<Vec<SolvedSoal>> {
        let rows = sqlx::query_as::<_, SolvedSoalRow>(&format!(
            r#"
            SELECT {SOAL_COLUMNS}, us.taken_at
            FROM user_soals us
            JOIN soals s ON s.soal_id = us.soal_id
            WHERE us.user_id = $1
            ORDER BY us.taken_at DESC
            "#
        ))
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| SolvedSoal {
                soal: row.soal.into_soal(),
                taken_at: row.taken_at,
            })
            .collect())
    }

    async fn completion_times_since(
        &self,
        user_id: &UserId,
        since: DateTime<Utc>,
    ) -> CtfResult<Vec<DateTime<Utc>>> {
        let times = sqlx::query_scalar::<_, DateTime<Utc>>(
            "SELECT taken_at FROM user_soals WHERE user_id = $1 AND taken_at >= $2",
        )
        .bind(user_id.as_uuid())
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(times)
    }
}

// ============================================================================
// Leaderboard Repository Implementation
// ============================================================================

impl LeaderboardRepository for PgCtfRepository {
    async fn standings(&self, offset: i64, limit: i64) -> CtfResult<Vec<Standing>> {
        let rows = sqlx::query_as::<_, StandingRow>(&format!(
            r#"
            {STANDINGS_CTE}
            SELECT rank, user_id, name, email, solved_count
            FROM ranked
            ORDER BY solved_count DESC, name ASC, user_id ASC
            OFFSET $1
            LIMIT $2
            "#
        ))
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(StandingRow::into_standing).collect())
    }

    async fn participant_count(&self) -> CtfResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE user_role <> 2")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn standing_of(&self, user_id: &UserId) -> CtfResult<Option<Standing>> {
        let row = sqlx::query_as::<_, StandingRow>(&format!(
            r#"
            {STANDINGS_CTE}
            SELECT rank, user_id, name, email, solved_count
            FROM ranked
            WHERE user_id = $1
            "#
        ))
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(StandingRow::into_standing))
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct SoalRow {
    soal_id: Uuid,
    soal: String,
    url: Option<String>,
    flag: String,
    category: String,
    is_favorite: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SoalRow {
    fn into_soal(self) -> Soal {
        Soal {
            soal_id: SoalId::from_uuid(self.soal_id),
            soal: self.soal,
            url: self.url.map(SoalUrl::from_db),
            flag: Flag::from_db(self.flag),
            category: self.category,
            is_favorite: self.is_favorite,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SoalCountRow {
    #[sqlx(flatten)]
    soal: SoalRow,
    attempt_count: i64,
}

#[derive(sqlx::FromRow)]
struct SoalListingRow {
    #[sqlx(flatten)]
    soal: SoalRow,
    attempt_count: i64,
    viewer_completion_id: Option<Uuid>,
    viewer_taken_at: Option<DateTime<Utc>>,
}

impl SoalListingRow {
    fn into_listing(self, viewer: UserId) -> SoalListing {
        let soal = self.soal.into_soal();
        let viewer_completion = match (self.viewer_completion_id, self.viewer_taken_at) {
            (Some(id), Some(taken_at)) => Some(Completion {
                completion_id: CompletionId::from_uuid(id),
                user_id: viewer,
                soal_id: soal.soal_id,
                taken_at,
            }),
            _ => None,
        };
        SoalListing {
            soal,
            attempt_count: self.attempt_count,
            viewer_completion,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SolvedSoalRow {
    #[sqlx(flatten)]
    soal: SoalRow,
    taken_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct CompletionRow {
    completion_id: Uuid,
    user_id: Uuid,
    soal_id: Uuid,
    taken_at: DateTime<Utc>,
}

impl CompletionRow {
    fn into_completion(self) -> Completion {
        Completion {
            completion_id: CompletionId::from_uuid(self.completion_id),
            user_id: UserId::from_uuid(self.user_id),
            soal_id: SoalId::from_uuid(self.soal_id),
            taken_at: self.taken_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct StandingRow {
    rank: i64,
    user_id: Uuid,
    name: String,
    email: String,
    solved_count: i64,
}

impl StandingRow {
    fn into_standing(self) -> Standing {
        Standing {
            rank: self.rank,
            user_id: UserId::from_uuid(self.user_id),
            name: self.name,
            email: self.email,
            solved_count: self.solved_count,
        }
    }
}
