//! HTTP Handlers

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use kernel::error::app_error::AppError;
use kernel::response::ApiResponse;
use std::sync::Arc;

use platform::cookie::extract_session_token;

use crate::application::config::AuthConfig;
use crate::application::{
    CheckRoleUseCase, RegisterInput, RegisterUseCase, SignInInput, SignInUseCase,
    SignOutUseCase, UpdateUserInput, UsersUseCase,
};
use crate::domain::entity::caller::Caller;
use crate::domain::repository::{AuthSessionRepository, UserRepository};
use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    CheckRoleResponse, LogoutAllResponse, RegisterRequest, SignInRequest, UpdateUserRequest,
    UserListResponse, UserResponse,
};

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R>
where
    R: UserRepository + AuthSessionRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

// ============================================================================
// Register
// ============================================================================

/// POST /api/auth/register
pub async fn register<R>(
    State(state): State<AuthAppState<R>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + AuthSessionRepository + Clone + Send + Sync + 'static,
{
    let Json(req) = payload.map_err(AppError::from)?;

    let user = RegisterUseCase::new(state.repo.clone(), state.config.clone())
        .execute(RegisterInput {
            name: req.name,
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("User registered successfully", UserResponse::from(&user)),
    ))
}

// ============================================================================
// Sign In / Sign Out
// ============================================================================

/// POST /api/auth/signin
pub async fn sign_in<R>(
    State(state): State<AuthAppState<R>>,
    payload: Result<Json<SignInRequest>, JsonRejection>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + AuthSessionRepository + Clone + Send + Sync + 'static,
{
    let Json(req) = payload.map_err(AppError::from)?;

    let output = SignInUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone())
        .execute(SignInInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    let cookie = state
        .config
        .cookie_config()
        .build_set_cookie(&output.session_token);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        ApiResponse::ok("Signed in successfully", UserResponse::from(&output.user)),
    ))
}

/// POST /api/auth/signout
///
/// Always clears the cookie, even when no session was found.
pub async fn sign_out<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> impl IntoResponse
where
    R: UserRepository + AuthSessionRepository + Clone + Send + Sync + 'static,
{
    if let Some(token) = extract_session_token(&headers, &state.config.session_cookie_name) {
        let use_case = SignOutUseCase::new(state.repo.clone(), state.config.clone());
        if let Err(e) = use_case.execute(&token).await {
            tracing::debug!(error = %e, "Sign out without a valid session");
        }
    }

    let cookie = state.config.cookie_config().build_delete_cookie();

    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        ApiResponse::message("Signed out successfully"),
    )
}

/// POST /api/auth/logout-all
pub async fn logout_all<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + AuthSessionRepository + Clone + Send + Sync + 'static,
{
    let token = extract_session_token(&headers, &state.config.session_cookie_name)
        .ok_or(AuthError::SessionInvalid)?;

    let removed = SignOutUseCase::new(state.repo.clone(), state.config.clone())
        .execute_all(&token)
        .await?;

    let cookie = state.config.cookie_config().build_delete_cookie();

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        ApiResponse::ok(
            "Logged out from all devices",
            LogoutAllResponse {
                sessions_removed: removed,
            },
        ),
    ))
}

// ============================================================================
// Check Role
// ============================================================================

/// GET /api/auth/check-role
pub async fn check_role<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + AuthSessionRepository + Clone + Send + Sync + 'static,
{
    let token = extract_session_token(&headers, &state.config.session_cookie_name)
        .ok_or(AuthError::SessionInvalid)?;

    let output = CheckRoleUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone())
        .execute(&token)
        .await?;

    Ok(ApiResponse::ok(
        "User role retrieved successfully",
        CheckRoleResponse {
            user_id: output.user.user_id,
            role: output.role.code(),
            name: output.user.name.as_str().to_string(),
            email: output.user.email.as_str().to_string(),
        },
    ))
}

// ============================================================================
// Users
// ============================================================================

/// GET /api/users (admin only, enforced by the access gate)
pub async fn list_users<R>(State(state): State<AuthAppState<R>>) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + AuthSessionRepository + Clone + Send + Sync + 'static,
{
    let users = UsersUseCase::new(state.repo.clone(), state.config.clone())
        .list()
        .await?;

    let users: Vec<UserResponse> = users.iter().map(UserResponse::from).collect();
    Ok(ApiResponse::ok(
        "Users retrieved successfully",
        UserListResponse {
            count: users.len(),
            users,
        },
    ))
}

/// GET /api/users/{id}
pub async fn get_user<R>(
    State(state): State<AuthAppState<R>>,
    caller: Caller,
    Path(id): Path<String>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + AuthSessionRepository + Clone + Send + Sync + 'static,
{
    let user_id: UserId = id.parse().map_err(|_| AuthError::InvalidId)?;

    let user = UsersUseCase::new(state.repo.clone(), state.config.clone())
        .get(&caller, &user_id)
        .await?;

    Ok(ApiResponse::ok(
        "User retrieved successfully",
        UserResponse::from(&user),
    ))
}

/// PUT /api/users/{id}/update
pub async fn update_user<R>(
    State(state): State<AuthAppState<R>>,
    caller: Caller,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + AuthSessionRepository + Clone + Send + Sync + 'static,
{
    let user_id: UserId = id.parse().map_err(|_| AuthError::InvalidId)?;
    let Json(req) = payload.map_err(AppError::from)?;

    let user = UsersUseCase::new(state.repo.clone(), state.config.clone())
        .update(
            &caller,
            &user_id,
            UpdateUserInput {
                name: req.name,
                email: req.email,
                password: req.password,
            },
        )
        .await?;

    Ok(ApiResponse::ok(
        "User updated successfully",
        UserResponse::from(&user),
    ))
}
