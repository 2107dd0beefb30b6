//! Access Gate
//!
//! Path classification and the allow / reject / redirect decision taken for
//! every inbound request. The decision is a pure function of the request
//! facts and the resolved session; the session lookup itself lives in the
//! presentation middleware.
//!
//! Evaluation order:
//! 1. static assets skip the gate
//! 2. API paths: trusted origin, then `/api/auth/*` bypass, then token, then
//!    role whitelist, then admin-only rules
//! 3. auth pages redirect signed-in callers to their dashboard
//! 4. public pages pass
//! 5. every other page needs a session and the prefix role checks

use http::Method;
use kernel::error::kind::ErrorKind;
use url::form_urlencoded;

use crate::domain::entity::caller::Caller;
use crate::domain::value_object::user_role::UserRole;

// ============================================================================
// Configuration
// ============================================================================

/// Admin-only API endpoint, `*` matches exactly one path segment
#[derive(Debug, Clone)]
pub struct AdminApiRule {
    pub method: Method,
    pub pattern: String,
}

impl AdminApiRule {
    pub fn new(method: Method, pattern: impl Into<String>) -> Self {
        Self {
            method,
            pattern: pattern.into(),
        }
    }

    fn matches(&self, method: &Method, path: &str) -> bool {
        // axum の get() は HEAD にも応答する
        let method = if *method == Method::HEAD {
            &Method::GET
        } else {
            method
        };
        if self.method != *method {
            return false;
        }

        let mut pattern = self.pattern.split('/');
        let mut segments = trim_trailing_slash(path).split('/');
        loop {
            match (pattern.next(), segments.next()) {
                (None, None) => return true,
                (Some("*"), Some(seg)) if !seg.is_empty() => continue,
                (Some(p), Some(seg)) if p == seg => continue,
                _ => return false,
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Deployed application origin, e.g. `https://ctf.example.com`
    pub app_origin: String,
    /// Shared secret accepted in `X-API-Key`; `None` disables key access
    pub api_secret: Option<String>,
    pub api_prefix: String,
    pub public_api_prefix: String,
    pub admin_pages: Vec<String>,
    pub user_pages: Vec<String>,
    /// Matched exactly
    pub public_pages: Vec<String>,
    pub auth_pages: Vec<String>,
    pub static_prefixes: Vec<String>,
    pub admin_api_rules: Vec<AdminApiRule>,
    pub login_path: String,
    pub admin_dashboard: String,
    pub user_dashboard: String,
    pub unauthorized_path: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        Self {
            app_origin: "http://localhost:3000".to_string(),
            api_secret: None,
            api_prefix: "/api".to_string(),
            public_api_prefix: "/api/auth".to_string(),
            admin_pages: strings(&["/admin", "/dashboard/admin"]),
            user_pages: strings(&["/user", "/dashboard", "/profile"]),
            public_pages: strings(&["/"]),
            auth_pages: strings(&["/login", "/register"]),
            static_prefixes: strings(&["/_next/static", "/_next/image", "/favicon.ico", "/public"]),
            admin_api_rules: vec![
                AdminApiRule::new(Method::POST, "/api/soals/create"),
                AdminApiRule::new(Method::PUT, "/api/soals/*/update"),
                AdminApiRule::new(Method::DELETE, "/api/soals/*/delete"),
                AdminApiRule::new(Method::GET, "/api/users"),
            ],
            login_path: "/login".to_string(),
            admin_dashboard: "/admin/dashboard".to_string(),
            user_dashboard: "/user/dashboard".to_string(),
            unauthorized_path: "/unauthorized".to_string(),
        }
    }
}

impl GateConfig {
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.app_origin = origin.into();
        self
    }

    /// Empty secrets are treated as absent
    pub fn with_api_secret(mut self, secret: Option<String>) -> Self {
        self.api_secret = secret.filter(|s| !s.is_empty());
        self
    }
}

// ============================================================================
// Decision types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    Static,
    PublicApi,
    ProtectedApi,
    AuthPage,
    PublicPage,
    ProtectedPage,
}

/// Header values the gate looks at
#[derive(Debug, Clone, Copy)]
pub struct RequestFacts<'a> {
    pub method: &'a Method,
    pub path: &'a str,
    pub referer: Option<&'a str>,
    pub origin: Option<&'a str>,
    pub api_key: Option<&'a str>,
}

/// Outcome of the session lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No token, bad signature, or no live session
    Anonymous,
    Authenticated(Caller),
    /// Live session whose role is neither admin nor user
    UnknownRole,
}

impl SessionState {
    fn caller(&self) -> Option<Caller> {
        match self {
            SessionState::Authenticated(caller) => Some(*caller),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Continue to the handler, with the caller when one was resolved
    Pass(Option<Caller>),
    /// JSON error response
    Reject {
        kind: ErrorKind,
        message: &'static str,
    },
    /// 307 to the given location
    Redirect(String),
}

// ============================================================================
// Gate
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct AccessGate {
    config: GateConfig,
}

impl AccessGate {
    pub fn new(config: GateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn classify(&self, path: &str) -> PathClass {
        let c = &self.config;

        if matches_any(path, &c.static_prefixes) {
            PathClass::Static
        } else if matches_prefix(path, &c.api_prefix) {
            if matches_prefix(path, &c.public_api_prefix) {
                PathClass::PublicApi
            } else {
                PathClass::ProtectedApi
            }
        } else if matches_any(path, &c.auth_pages) {
            PathClass::AuthPage
        } else if c.public_pages.iter().any(|p| p == path) {
            PathClass::PublicPage
        } else {
            PathClass::ProtectedPage
        }
    }

    /// Whether [`decide`](Self::decide) can depend on the session
    ///
    /// API requests from an untrusted origin are rejected before any lookup.
    pub fn needs_session(&self, facts: &RequestFacts<'_>) -> bool {
        match self.classify(facts.path) {
            PathClass::ProtectedApi => self.is_trusted(facts),
            PathClass::AuthPage | PathClass::ProtectedPage => true,
            PathClass::Static | PathClass::PublicApi | PathClass::PublicPage => false,
        }
    }

    pub fn decide(&self, facts: &RequestFacts<'_>, session: SessionState) -> GateDecision {
        match self.classify(facts.path) {
            PathClass::Static => GateDecision::Pass(None),
            class @ (PathClass::PublicApi | PathClass::ProtectedApi) => {
                self.decide_api(class, facts, session)
            }
            PathClass::AuthPage => match session {
                SessionState::Authenticated(caller) => GateDecision::Redirect(self.dashboard(&caller)),
                _ => GateDecision::Pass(None),
            },
            PathClass::PublicPage => GateDecision::Pass(None),
            PathClass::ProtectedPage => self.decide_page(facts.path, session),
        }
    }

    /// Login page, used when the gate itself fails
    pub fn login_path(&self) -> &str {
        &self.config.login_path
    }

    fn decide_api(
        &self,
        class: PathClass,
        facts: &RequestFacts<'_>,
        session: SessionState,
    ) -> GateDecision {
        if !self.is_trusted(facts) {
            return GateDecision::Reject {
                kind: ErrorKind::Forbidden,
                message: "Direct API access is not allowed",
            };
        }

        if class == PathClass::PublicApi {
            return GateDecision::Pass(session.caller());
        }

        let caller = match session {
            SessionState::Anonymous => {
                return GateDecision::Reject {
                    kind: ErrorKind::Unauthorized,
                    message: "Authentication required",
                };
            }
            SessionState::UnknownRole => {
                return GateDecision::Reject {
                    kind: ErrorKind::Forbidden,
                    message: "Unauthorized access",
                };
            }
            SessionState::Authenticated(caller) => caller,
        };

        let admin_only = self
            .config
            .admin_api_rules
            .iter()
            .any(|rule| rule.matches(facts.method, facts.path));
        if admin_only && !caller.is_admin() {
            return GateDecision::Reject {
                kind: ErrorKind::Forbidden,
                message: "Admin access required",
            };
        }

        GateDecision::Pass(Some(caller))
    }

    fn decide_page(&self, path: &str, session: SessionState) -> GateDecision {
        let c = &self.config;

        let caller = match session {
            SessionState::Anonymous => return GateDecision::Redirect(self.login_with_callback(path)),
            SessionState::UnknownRole => return GateDecision::Redirect(c.unauthorized_path.clone()),
            SessionState::Authenticated(caller) => caller,
        };

        // admin は user ページも閲覧できる
        let allowed = if matches_any(path, &c.admin_pages) {
            caller.is_admin()
        } else if matches_any(path, &c.user_pages) {
            matches!(caller.role(), UserRole::User | UserRole::Admin)
        } else {
            true
        };

        if allowed {
            GateDecision::Pass(Some(caller))
        } else {
            GateDecision::Redirect(c.unauthorized_path.clone())
        }
    }

    fn is_trusted(&self, facts: &RequestFacts<'_>) -> bool {
        let origin = self.config.app_origin.trim_end_matches('/');

        let from_referer = facts.referer.is_some_and(|referer| {
            referer == origin
                || referer
                    .strip_prefix(origin)
                    .is_some_and(|rest| rest.starts_with('/') || rest.starts_with('?'))
        });
        let from_origin = facts
            .origin
            .is_some_and(|o| !origin.is_empty() && o.trim_end_matches('/') == origin);
        let has_key = match (self.config.api_secret.as_deref(), facts.api_key) {
            (Some(secret), Some(key)) => {
                platform::crypto::constant_time_eq(secret.as_bytes(), key.as_bytes())
            }
            _ => false,
        };

        (!origin.is_empty() && from_referer) || from_origin || has_key
    }

    fn dashboard(&self, caller: &Caller) -> String {
        if caller.is_admin() {
            self.config.admin_dashboard.clone()
        } else {
            self.config.user_dashboard.clone()
        }
    }

    fn login_with_callback(&self, path: &str) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("callbackUrl", path)
            .finish();
        format!("{}?{}", self.config.login_path, query)
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// `/admin` matches `/admin` and `/admin/x`, never `/administrator`
fn matches_prefix(path: &str, prefix: &str) -> bool {
    let prefix = trim_trailing_slash(prefix);
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || prefix.ends_with('/'),
        None => false,
    }
}

fn matches_any(path: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|prefix| matches_prefix(path, prefix))
}

fn trim_trailing_slash(path: &str) -> &str {
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}
