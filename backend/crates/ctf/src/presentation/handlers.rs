//! HTTP Handlers
//!
//! Every handler runs behind the access gate, which resolves the [`Caller`]
//! and enforces the admin-only routes.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use kernel::error::app_error::AppError;
use kernel::id::{SoalId, UserId};
use kernel::response::ApiResponse;
use std::sync::Arc;

use auth::Caller;
use auth::domain::repository::{AuthSessionRepository, UserRepository};

use crate::application::config::CtfConfig;
use crate::application::{
    BrowseSoalsUseCase, CreateSoalInput, LeaderboardUseCase, ListSoalsInput, ManageSoalUseCase,
    ProgressUseCase, SubmitFlagInput, SubmitFlagUseCase, UpdateSoalInput, UserActivityUseCase,
    UserStatisticsUseCase,
};
use crate::domain::repository::{CompletionRepository, LeaderboardRepository, SoalRepository};
use crate::domain::value_objects::{PageRequest, parse_id};
use crate::error::{CtfError, CtfResult};
use crate::presentation::dto::{
    ActivityFeedResponse, CompletedCountResponse, CreateSoalRequest, DeletedResponse,
    FavoriteRequest, FavoriteResponse, LeaderboardResponse, ListSoalsQuery, PageQuery,
    SearchHit, SearchQuery, SoalListItem, SoalResponse, SolvedSoalResponse, StatisticsResponse,
    SubmitFlagRequest, UpdateSoalRequest, UserIdQuery, UserRankResponse,
};

/// Shared state for challenge handlers
///
/// `R` stores soals and completions, `A` is the account store.
#[derive(Clone)]
pub struct CtfAppState<R, A>
where
    R: SoalRepository + CompletionRepository + LeaderboardRepository + Clone + Send + Sync + 'static,
    A: UserRepository + AuthSessionRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub auth_repo: Arc<A>,
    pub config: Arc<CtfConfig>,
}

/// `?userId=` is mandatory on the per-user soal views
fn required_user_id(query: UserIdQuery) -> CtfResult<UserId> {
    let raw = query
        .user_id
        .filter(|id| !id.trim().is_empty())
        .ok_or(CtfError::UserIdRequired)?;
    parse_id(&raw)
}

// ============================================================================
// Browse
// ============================================================================

/// GET /api/soals
pub async fn list_soals<R, A>(
    State(state): State<CtfAppState<R, A>>,
    caller: Caller,
    Query(query): Query<ListSoalsQuery>,
) -> CtfResult<impl IntoResponse>
where
    R: SoalRepository + CompletionRepository + LeaderboardRepository + Clone + Send + Sync + 'static,
    A: UserRepository + AuthSessionRepository + Clone + Send + Sync + 'static,
{
    let rows = BrowseSoalsUseCase::new(state.repo.clone())
        .list(
            &caller,
            ListSoalsInput {
                search: query.search,
                categories: query.categories,
                exclude_solved: query.exclude_solved.as_deref() == Some("true"),
            },
        )
        .await?;

    let message = if rows.is_empty() {
        "No soals found"
    } else {
        "Soals retrieved successfully"
    };
    let items: Vec<SoalListItem> = rows.iter().map(SoalListItem::from).collect();

    Ok(ApiResponse::ok(message, items))
}

/// GET /api/soals/search?q=
pub async fn search_soals<R, A>(
    State(state): State<CtfAppState<R, A>>,
    Query(query): Query<SearchQuery>,
) -> CtfResult<impl IntoResponse>
where
    R: SoalRepository + CompletionRepository + LeaderboardRepository + Clone + Send + Sync + 'static,
    A: UserRepository + AuthSessionRepository + Clone + Send + Sync + 'static,
{
    let hits = BrowseSoalsUseCase::new(state.repo.clone())
        .search(query.q.as_deref())
        .await?;

    let message = if hits.is_empty() {
        "No soals found"
    } else {
        "Soals retrieved successfully"
    };
    let hits: Vec<SearchHit> = hits
        .iter()
        .map(|(soal, attempts)| SearchHit {
            soal: SoalResponse::from(soal),
            attempt_count: *attempts,
        })
        .collect();

    Ok(ApiResponse::ok(message, hits))
}

/// GET /api/soals/{id}
pub async fn get_soal<R, A>(
    State(state): State<CtfAppState<R, A>>,
    Path(id): Path<String>,
) -> CtfResult<impl IntoResponse>
where
    R: SoalRepository + CompletionRepository + LeaderboardRepository + Clone + Send + Sync + 'static,
    A: UserRepository + AuthSessionRepository + Clone + Send + Sync + 'static,
{
    let soal_id: SoalId = parse_id(&id)?;

    let soal = BrowseSoalsUseCase::new(state.repo.clone())
        .get(&soal_id)
        .await?;

    Ok(ApiResponse::ok("Soal is found successfully", SoalResponse::from(&soal)))
}

/// GET /api/soals/favorite
pub async fn list_favorites<R, A>(
    State(state): State<CtfAppState<R, A>>,
) -> CtfResult<impl IntoResponse>
where
    R: SoalRepository + CompletionRepository + LeaderboardRepository + Clone + Send + Sync + 'static,
    A: UserRepository + AuthSessionRepository + Clone + Send + Sync + 'static,
{
    let soals = BrowseSoalsUseCase::new(state.repo.clone())
        .favorites()
        .await?;

    let message = if soals.is_empty() {
        "No soals found"
    } else {
        "Favorite soals retrieved successfully"
    };
    let soals: Vec<SoalResponse> = soals.iter().map(SoalResponse::from).collect();

    Ok(ApiResponse::ok(message, soals))
}

// ============================================================================
// Progress
// ============================================================================

/// GET /api/soals/random?userId=
pub async fn unattempted_soals<R, A>(
    State(state): State<CtfAppState<R, A>>,
    Query(query): Query<UserIdQuery>,
) -> CtfResult<impl IntoResponse>
where
    R: SoalRepository + CompletionRepository + LeaderboardRepository + Clone + Send + Sync + 'static,
    A: UserRepository + AuthSessionRepository + Clone + Send + Sync + 'static,
{
    let user_id = required_user_id(query)?;

    let soals = ProgressUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone())
        .unattempted(&user_id)
        .await?;

    let message = if soals.is_empty() {
        "No soals found"
    } else {
        "Unattempted soals retrieved successfully"
    };
    let soals: Vec<SoalResponse> = soals.iter().map(SoalResponse::from).collect();

    Ok(ApiResponse::ok(message, soals))
}

/// GET /api/soals/completed?userId=
pub async fn completed_count<R, A>(
    State(state): State<CtfAppState<R, A>>,
    Query(query): Query<UserIdQuery>,
) -> CtfResult<impl IntoResponse>
where
    R: SoalRepository + CompletionRepository + LeaderboardRepository + Clone + Send + Sync + 'static,
    A: UserRepository + AuthSessionRepository + Clone + Send + Sync + 'static,
{
    let user_id = required_user_id(query)?;

    let count = ProgressUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone())
        .completed_count(&user_id)
        .await?;

    Ok(ApiResponse::ok(
        "Completed soal count retrieved successfully",
        CompletedCountResponse {
            completed_soal_count: count,
        },
    ))
}

/// GET /api/soals/solved-soals?userId=
pub async fn solved_soals<R, A>(
    State(state): State<CtfAppState<R, A>>,
    Query(query): Query<UserIdQuery>,
) -> CtfResult<impl IntoResponse>
where
    R: SoalRepository + CompletionRepository + LeaderboardRepository + Clone + Send + Sync + 'static,
    A: UserRepository + AuthSessionRepository + Clone + Send + Sync + 'static,
{
    let user_id = required_user_id(query)?;

    let solved = ProgressUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone())
        .solved(&user_id)
        .await?;

    let message = if solved.is_empty() {
        "No soals found"
    } else {
        "Solved soals retrieved successfully"
    };
    let solved: Vec<SolvedSoalResponse> = solved.iter().map(SolvedSoalResponse::from).collect();

    Ok(ApiResponse::ok(message, solved))
}

// ============================================================================
// Manage (admin routes enforced by the gate)
// ============================================================================

/// POST /api/soals/create
pub async fn create_soal<R, A>(
    State(state): State<CtfAppState<R, A>>,
    payload: Result<Json<CreateSoalRequest>, JsonRejection>,
) -> CtfResult<impl IntoResponse>
where
    R: SoalRepository + CompletionRepository + LeaderboardRepository + Clone + Send + Sync + 'static,
    A: UserRepository + AuthSessionRepository + Clone + Send + Sync + 'static,
{
    let Json(req) = payload.map_err(AppError::from)?;

    let soal = ManageSoalUseCase::new(state.repo.clone(), state.repo.clone())
        .create(CreateSoalInput {
            soal: req.soal,
            url: req.url,
            flag: req.flag,
            category: req.category,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("Soal created successfully", SoalResponse::from(&soal)),
    ))
}

/// PUT /api/soals/{id}/update
pub async fn update_soal<R, A>(
    State(state): State<CtfAppState<R, A>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateSoalRequest>, JsonRejection>,
) -> CtfResult<impl IntoResponse>
where
    R: SoalRepository + CompletionRepository + LeaderboardRepository + Clone + Send + Sync + 'static,
    A: UserRepository + AuthSessionRepository + Clone + Send + Sync + 'static,
{
    let soal_id: SoalId = parse_id(&id)?;
    // 空ボディも「データなし」として扱う
    let req = match payload {
        Ok(Json(req)) => req,
        Err(JsonRejection::JsonDataError(_)) | Err(JsonRejection::JsonSyntaxError(_)) => {
            return Err(CtfError::NoUpdateData);
        }
        Err(rejection) => return Err(AppError::from(rejection).into()),
    };

    let soal = ManageSoalUseCase::new(state.repo.clone(), state.repo.clone())
        .update(&soal_id, UpdateSoalInput { url: req.url })
        .await?;

    Ok(ApiResponse::ok("Soal updated successfully", SoalResponse::from(&soal)))
}

/// DELETE /api/soals/{id}/delete
pub async fn delete_soal<R, A>(
    State(state): State<CtfAppState<R, A>>,
    Path(id): Path<String>,
) -> CtfResult<impl IntoResponse>
where
    R: SoalRepository + CompletionRepository + LeaderboardRepository + Clone + Send + Sync + 'static,
    A: UserRepository + AuthSessionRepository + Clone + Send + Sync + 'static,
{
    let soal_id: SoalId = parse_id(&id)?;

    let id = ManageSoalUseCase::new(state.repo.clone(), state.repo.clone())
        .delete(&soal_id)
        .await?;

    Ok(ApiResponse::ok("Soal deleted successfully", DeletedResponse { id }))
}

/// POST /api/soals/{id}/favorite/create
pub async fn set_favorite<R, A>(
    State(state): State<CtfAppState<R, A>>,
    Path(id): Path<String>,
    payload: Result<Json<FavoriteRequest>, JsonRejection>,
) -> CtfResult<impl IntoResponse>
where
    R: SoalRepository + CompletionRepository + LeaderboardRepository + Clone + Send + Sync + 'static,
    A: UserRepository + AuthSessionRepository + Clone + Send + Sync + 'static,
{
    let soal_id: SoalId = parse_id(&id)?;
    let Json(req) = payload.map_err(AppError::from)?;
    let is_favorite = req
        .is_favorite
        .and_then(|v| v.as_bool())
        .ok_or(CtfError::InvalidFavorite)?;

    let soal = ManageSoalUseCase::new(state.repo.clone(), state.repo.clone())
        .set_favorite(&soal_id, is_favorite)
        .await?;

    Ok(ApiResponse::ok(
        "Favorite status updated successfully",
        FavoriteResponse {
            id: soal.soal_id,
            is_favorite: soal.is_favorite,
        },
    ))
}

// ============================================================================
// Submit Flag
// ============================================================================

/// POST /api/soals/submit-flag
pub async fn submit_flag<R, A>(
    State(state): State<CtfAppState<R, A>>,
    caller: Caller,
    payload: Result<Json<SubmitFlagRequest>, JsonRejection>,
) -> CtfResult<impl IntoResponse>
where
    R: SoalRepository + CompletionRepository + LeaderboardRepository + Clone + Send + Sync + 'static,
    A: UserRepository + AuthSessionRepository + Clone + Send + Sync + 'static,
{
    let Json(req) = payload.map_err(AppError::from)?;

    SubmitFlagUseCase::new(state.auth_repo.clone(), state.repo.clone(), state.repo.clone())
        .execute(
            &caller,
            SubmitFlagInput {
                soal_id: req.soal_id,
                flag: req.flag,
            },
        )
        .await?;

    Ok(ApiResponse::message("Flag correct! Challenge completed."))
}

// ============================================================================
// Aggregation
// ============================================================================

/// GET /api/leaderboard?page=&limit=
pub async fn leaderboard<R, A>(
    State(state): State<CtfAppState<R, A>>,
    Query(query): Query<PageQuery>,
) -> CtfResult<impl IntoResponse>
where
    R: SoalRepository + CompletionRepository + LeaderboardRepository + Clone + Send + Sync + 'static,
    A: UserRepository + AuthSessionRepository + Clone + Send + Sync + 'static,
{
    let request = PageRequest::from_query(query.page.as_deref(), query.limit.as_deref());

    let page = LeaderboardUseCase::new(state.repo.clone())
        .page(request)
        .await?;

    Ok(ApiResponse::ok(
        "Leaderboard retrieved successfully",
        LeaderboardResponse::from(&page),
    ))
}

/// GET /api/leaderboard/user?userId=
pub async fn user_rank<R, A>(
    State(state): State<CtfAppState<R, A>>,
    Query(query): Query<UserIdQuery>,
) -> CtfResult<impl IntoResponse>
where
    R: SoalRepository + CompletionRepository + LeaderboardRepository + Clone + Send + Sync + 'static,
    A: UserRepository + AuthSessionRepository + Clone + Send + Sync + 'static,
{
    let user_id = required_user_id(query)?;

    let standing = LeaderboardUseCase::new(state.repo.clone())
        .user_rank(&user_id)
        .await?;

    Ok(ApiResponse::ok(
        "User rank retrieved successfully",
        UserRankResponse::from(&standing),
    ))
}

/// GET /api/statistics/user/{user_id}
pub async fn user_statistics<R, A>(
    State(state): State<CtfAppState<R, A>>,
    Path(id): Path<String>,
) -> CtfResult<impl IntoResponse>
where
    R: SoalRepository + CompletionRepository + LeaderboardRepository + Clone + Send + Sync + 'static,
    A: UserRepository + AuthSessionRepository + Clone + Send + Sync + 'static,
{
    let user_id: UserId = parse_id(&id)?;

    let stats = UserStatisticsUseCase::new(
        state.auth_repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.config.clone(),
    )
    .execute(&user_id)
    .await?;

    Ok(ApiResponse::ok(
        "User statistics retrieved successfully",
        StatisticsResponse::from(stats),
    ))
}

/// GET /api/users/user-activity
pub async fn user_activity<R, A>(
    State(state): State<CtfAppState<R, A>>,
    caller: Caller,
) -> CtfResult<impl IntoResponse>
where
    R: SoalRepository + CompletionRepository + LeaderboardRepository + Clone + Send + Sync + 'static,
    A: UserRepository + AuthSessionRepository + Clone + Send + Sync + 'static,
{
    let feed = UserActivityUseCase::new(state.auth_repo.clone(), state.repo.clone(), state.config.clone())
        .execute(&caller)
        .await?;

    Ok(ApiResponse::ok(
        "User activity retrieved successfully",
        ActivityFeedResponse::from(feed),
    ))
}
