//! Cross-module tests for the auth crate

#[cfg(test)]
mod config_tests {
    use crate::application::config::*;
    use std::time::Duration;

    #[test]
    fn test_default_config() {
        let config = AuthConfig::default();

        assert_eq!(config.session_cookie_name, "ctf_session");
        assert_eq!(config.session_ttl, Duration::from_secs(30 * 24 * 3600));
        assert!(config.cookie_secure);
        assert_eq!(config.cookie_same_site, SameSite::Lax);
        assert!(config.pepper().is_none());
    }

    #[test]
    fn test_development_config() {
        let a = AuthConfig::development();
        let b = AuthConfig::development();

        assert!(!a.cookie_secure);
        assert_ne!(a.session_secret, b.session_secret);
        assert!(a.session_secret.iter().any(|&b| b != 0));
    }

    #[test]
    fn test_cookie_config_follows_ttl() {
        let cookie = AuthConfig::development().cookie_config();
        assert_eq!(cookie.name, "ctf_session");
        assert_eq!(cookie.max_age_secs, Some(2_592_000));
        assert!(cookie.http_only);
        assert!(!cookie.secure);
    }
}

#[cfg(test)]
mod models_tests {
    use crate::domain::entity::user::User;
    use crate::domain::value_object::{
        email::Email,
        user_name::UserName,
        user_password::{RawPassword, UserPassword},
        user_role::UserRole,
    };
    use crate::presentation::dto::*;

    #[test]
    fn test_user_response_hides_password() {
        let raw = RawPassword::new("Passw0rd".to_string()).unwrap();
        let user = User::new(
            UserName::new("Alice").unwrap(),
            Email::new("alice@x.com").unwrap(),
            UserPassword::from_raw(&raw, None).unwrap(),
            UserRole::User,
        );

        let json = serde_json::to_value(UserResponse::from(&user)).unwrap();
        assert_eq!(json["email"], "alice@x.com");
        assert_eq!(json["role"], "user");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("password").is_none());
        assert!(json.get("passwordHash").is_none());
    }

    #[test]
    fn test_register_request_tolerates_missing_fields() {
        let req: RegisterRequest = serde_json::from_str(r#"{"name":"Alice"}"#).unwrap();
        assert_eq!(req.name.as_deref(), Some("Alice"));
        assert!(req.email.is_none());
        assert!(req.password.is_none());
    }
}

#[cfg(test)]
mod error_tests {
    use crate::error::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn test_error_into_response_status_codes() {
        let test_cases: Vec<(AuthError, StatusCode)> = vec![
            (AuthError::Validation("Name is required".into()), StatusCode::BAD_REQUEST),
            (AuthError::InvalidEmail, StatusCode::BAD_REQUEST),
            (AuthError::WeakPassword("short".into()), StatusCode::BAD_REQUEST),
            (AuthError::EmailTaken, StatusCode::BAD_REQUEST),
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AuthError::SessionInvalid, StatusCode::UNAUTHORIZED),
            (AuthError::RoleNotFound, StatusCode::BAD_REQUEST),
            (AuthError::AccessDenied, StatusCode::FORBIDDEN),
            (AuthError::UserNotFound, StatusCode::NOT_FOUND),
            (
                AuthError::Internal("test".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected_status) in test_cases {
            let response = error.into_response();
            assert_eq!(response.status(), expected_status);
        }
    }
}

#[cfg(test)]
mod router_tests {
    use std::sync::Arc;

    use axum::Router;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use axum::middleware::from_fn_with_state;
    use axum::response::Response;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::application::{AccessGate, AuthConfig, GateConfig};
    use crate::infra::memory::MemoryAuthRepository;
    use crate::presentation::{GateState, access_gate, auth_router_generic, users_router_generic};

    const REFERER: &str = "http://localhost:3000/login";

    fn app() -> Router {
        let repo = MemoryAuthRepository::new();
        let config = AuthConfig::development();
        let state = GateState {
            repo: Arc::new(repo.clone()),
            config: Arc::new(config.clone()),
            gate: Arc::new(AccessGate::new(GateConfig::default())),
        };

        Router::new()
            .nest("/api/auth", auth_router_generic(repo.clone(), config.clone()))
            .merge(users_router_generic(repo, config))
            .fallback(|| async { StatusCode::NOT_FOUND })
            .layer(from_fn_with_state(
                state,
                access_gate::<MemoryAuthRepository>,
            ))
    }

    fn post_json(uri: &str, body: Value, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::REFERER, REFERER)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .uri(uri)
            .header(header::REFERER, REFERER);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn session_cookie(response: &Response) -> String {
        response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .unwrap()
            .to_string()
    }

    async fn register_and_sign_in(app: &Router, email: &str) -> String {
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/auth/register",
                json!({"name": "Alice", "email": email, "password": "Passw0rd"}),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/auth/signin",
                json!({"email": email, "password": "Passw0rd"}),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        session_cookie(&response)
    }

    #[tokio::test]
    async fn test_register_scenario() {
        let app = app();

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/auth/register",
                json!({"name": "Alice", "email": "ALICE@x.com", "password": "Passw0rd"}),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["email"], "alice@x.com");
        assert!(body["data"].get("password").is_none());

        let response = app
            .oneshot(post_json(
                "/api/auth/register",
                json!({"name": "Alice", "email": "alice@x.com", "password": "Passw0rd"}),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "Email is already registered");
    }

    #[tokio::test]
    async fn test_direct_api_access_rejected() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/register")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Direct API access is not allowed");
    }

    #[tokio::test]
    async fn test_check_role_and_admin_rules() {
        let app = app();
        let cookie = register_and_sign_in(&app, "alice@x.com").await;

        let response = app
            .clone()
            .oneshot(get("/api/auth/check-role", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"]["role"], "user");
        assert_eq!(body["data"]["email"], "alice@x.com");

        let response = app
            .clone()
            .oneshot(get("/api/users", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(response).await["message"], "Admin access required");

        let mut head = get("/api/users", Some(&cookie));
        *head.method_mut() = Method::HEAD;
        let response = app.clone().oneshot(head).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app.oneshot(get("/api/users", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["message"], "Authentication required");
    }

    #[tokio::test]
    async fn test_page_redirects() {
        let app = app();
        let cookie = register_and_sign_in(&app, "alice@x.com").await;

        let response = app
            .clone()
            .oneshot(get("/admin/dashboard?tab=1", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(response.headers()[header::LOCATION], "/unauthorized");

        let response = app
            .clone()
            .oneshot(get("/login", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.headers()[header::LOCATION], "/user/dashboard");

        let response = app.oneshot(get("/user/soals", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/login?callbackUrl=%2Fuser%2Fsoals"
        );
    }

    #[tokio::test]
    async fn test_user_self_access() {
        let app = app();
        let cookie = register_and_sign_in(&app, "alice@x.com").await;

        let response = app
            .clone()
            .oneshot(get("/api/auth/check-role", Some(&cookie)))
            .await
            .unwrap();
        let user_id = body_json(response).await["data"]["userId"]
            .as_str()
            .unwrap()
            .to_string();

        let response = app
            .clone()
            .oneshot(get(&format!("/api/users/{user_id}"), Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(get(&format!("/api/users/{}", uuid::Uuid::new_v4()), Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .oneshot(get("/api/users/not-a-uuid", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_logout_all_invalidates_session() {
        let app = app();
        let cookie = register_and_sign_in(&app, "alice@x.com").await;

        let response = app
            .clone()
            .oneshot(post_json("/api/auth/logout-all", json!({}), Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["data"]["sessionsRemoved"], 1);

        let response = app
            .oneshot(get("/api/auth/check-role", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
