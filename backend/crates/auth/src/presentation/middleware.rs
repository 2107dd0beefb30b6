//! Access Gate Middleware
//!
//! Runs [`AccessGate`] in front of every route. The resolved [`Caller`] is
//! stored in request extensions for the [`Caller`] extractor.

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use kernel::error::app_error::AppError;
use platform::cookie::extract_session_token;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{AccessGate, CheckSessionUseCase, GateDecision, RequestFacts, SessionState};
use crate::domain::entity::caller::Caller;
use crate::domain::repository::AuthSessionRepository;
use crate::error::{AuthError, AuthResult};

/// Header carrying the shared API secret
pub const API_KEY_HEADER: &str = "x-api-key";

/// Middleware state
#[derive(Clone)]
pub struct GateState<R>
where
    R: AuthSessionRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
    pub gate: Arc<AccessGate>,
}

/// Access gate, use with `axum::middleware::from_fn_with_state`
pub async fn access_gate<R>(
    State(state): State<GateState<R>>,
    mut req: Request,
    next: Next,
) -> Response
where
    R: AuthSessionRepository + Clone + Send + Sync + 'static,
{
    let headers = req.headers();
    let facts = RequestFacts {
        method: req.method(),
        path: req.uri().path(),
        referer: headers.get(header::REFERER).and_then(|v| v.to_str().ok()),
        origin: headers.get(header::ORIGIN).and_then(|v| v.to_str().ok()),
        api_key: headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()),
    };

    let session = if state.gate.needs_session(&facts) {
        let token = extract_session_token(headers, &state.config.session_cookie_name);
        match resolve_session(&state, token.as_deref()).await {
            Ok(session) => session,
            Err(e) => {
                // fail closed
                tracing::error!(error = %e, path = %facts.path, "Access gate session lookup failed");
                return Redirect::temporary(state.gate.login_path()).into_response();
            }
        }
    } else {
        SessionState::Anonymous
    };

    match state.gate.decide(&facts, session) {
        GateDecision::Pass(caller) => {
            if let Some(caller) = caller {
                req.extensions_mut().insert(caller);
            }
            next.run(req).await
        }
        GateDecision::Reject { kind, message } => {
            tracing::warn!(
                method = %req.method(),
                path = %req.uri().path(),
                reason = message,
                "Request rejected by access gate"
            );
            AppError::new(kind, message).into_response()
        }
        GateDecision::Redirect(location) => Redirect::temporary(&location).into_response(),
    }
}

async fn resolve_session<R>(state: &GateState<R>, token: Option<&str>) -> AuthResult<SessionState>
where
    R: AuthSessionRepository + Clone + Send + Sync + 'static,
{
    let Some(token) = token else {
        return Ok(SessionState::Anonymous);
    };

    let use_case = CheckSessionUseCase::new(state.repo.clone(), state.config.clone());
    match use_case.caller(token).await {
        Ok(Some(caller)) => Ok(SessionState::Authenticated(caller)),
        Ok(None) => Ok(SessionState::UnknownRole),
        Err(AuthError::SessionInvalid) => Ok(SessionState::Anonymous),
        Err(e) => Err(e),
    }
}

/// Caller resolved by the access gate
///
/// Rejects with 401 when the route was reached without a session.
impl<S> axum::extract::FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Caller>()
            .copied()
            .ok_or(AuthError::SessionInvalid)
    }
}
