//! Domain Value Objects
//!
//! Immutable value types for the challenge domain.

use std::fmt;

use kernel::id::Id;
use uuid::Uuid;

use crate::error::{CtfError, CtfResult};

/// Soal columns with a unique constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoalField {
    Soal,
    Url,
    Flag,
}

impl SoalField {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SoalField::Soal => "soal",
            SoalField::Url => "url",
            SoalField::Flag => "flag",
        }
    }

    /// Map a PostgreSQL unique constraint name back to its column
    pub fn from_constraint(name: &str) -> Option<Self> {
        match name {
            "soals_soal_key" => Some(SoalField::Soal),
            "soals_url_key" => Some(SoalField::Url),
            "soals_flag_key" => Some(SoalField::Flag),
            _ => None,
        }
    }
}

/// Absolute http(s) URL attached to a soal, stored as entered (trimmed)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoalUrl(String);

impl SoalUrl {
    pub fn new(raw: &str) -> CtfResult<Self> {
        let trimmed = raw.trim();
        let parsed = url::Url::parse(trimmed).map_err(|_| CtfError::InvalidUrl)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CtfError::InvalidUrl);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn from_db(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Secret flag of a soal
///
/// Never serialized and redacted from `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Flag(String);

impl Flag {
    /// Trimmed at creation time only
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_string())
    }

    pub fn from_db(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Exact comparison, no case folding or trimming of the candidate
    pub fn matches(&self, candidate: &str) -> bool {
        platform::crypto::constant_time_eq(self.0.as_bytes(), candidate.as_bytes())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Flag(<redacted>)")
    }
}

/// Requested categories from `?categories=a,b`
///
/// Lowercased and trimmed; an empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryFilter(Vec<String>);

impl CategoryFilter {
    pub fn parse(raw: Option<&str>) -> Self {
        let tags = raw
            .unwrap_or_default()
            .split(',')
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .collect();
        Self(tags)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn tags(&self) -> &[String] {
        &self.0
    }

    /// Whether any comma-separated tag of `category` is requested
    pub fn matches(&self, category: &str) -> bool {
        self.is_empty()
            || category
                .split(',')
                .map(|tag| tag.trim().to_lowercase())
                .any(|tag| self.0.contains(&tag))
    }
}

/// Leaderboard page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    limit: i64,
}

impl PageRequest {
    pub const DEFAULT_LIMIT: i64 = 10;
    pub const MAX_LIMIT: i64 = 100;

    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, Self::MAX_LIMIT),
        }
    }

    /// Unparseable values fall back to the defaults
    pub fn from_query(page: Option<&str>, limit: Option<&str>) -> Self {
        let page = page.and_then(|p| p.trim().parse().ok()).unwrap_or(1);
        let limit = limit
            .and_then(|l| l.trim().parse().ok())
            .unwrap_or(Self::DEFAULT_LIMIT);
        Self::new(page, limit)
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        (total + self.limit - 1) / self.limit
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, Self::DEFAULT_LIMIT)
    }
}

/// Parse a path or query id in canonical hyphenated UUID form
pub fn parse_id<T>(raw: &str) -> CtfResult<Id<T>> {
    let raw = raw.trim();
    if raw.len() != 36 {
        return Err(CtfError::InvalidId);
    }
    Uuid::parse_str(raw)
        .map(Id::from_uuid)
        .map_err(|_| CtfError::InvalidId)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::id::SoalId;

    #[test]
    fn test_soal_url() {
        assert_eq!(
            SoalUrl::new("  https://ctf.example/web/1 ").unwrap().as_str(),
            "https://ctf.example/web/1"
        );
        assert!(matches!(SoalUrl::new("not a url"), Err(CtfError::InvalidUrl)));
        assert!(matches!(SoalUrl::new("/relative"), Err(CtfError::InvalidUrl)));
        for scheme in ["javascript:alert(1)", "mailto:admin@x.com", "data:text/html,hi"] {
            assert!(matches!(SoalUrl::new(scheme), Err(CtfError::InvalidUrl)));
        }
        assert!(SoalUrl::new("http://ctf.example/1").is_ok());
    }

    #[test]
    fn test_flag_exact_match() {
        let flag = Flag::new("  CTF{abc}  ");
        assert!(flag.matches("CTF{abc}"));
        assert!(!flag.matches("ctf{abc}"));
        assert!(!flag.matches(" CTF{abc}"));
        assert!(!flag.matches("CTF{abc} "));
        assert_eq!(format!("{flag:?}"), "Flag(<redacted>)");
    }

    #[test]
    fn test_category_filter() {
        let filter = CategoryFilter::parse(Some(" Web, crypto ,,"));
        assert_eq!(filter.tags(), ["web", "crypto"]);
        assert!(filter.matches("web"));
        assert!(filter.matches("Forensics, Crypto"));
        assert!(!filter.matches("pwn"));
        assert!(!filter.matches("webapp"));

        assert!(CategoryFilter::parse(None).matches("anything"));
    }

    #[test]
    fn test_page_request() {
        let page = PageRequest::from_query(Some("2"), Some("5"));
        assert_eq!(page.offset(), 5);
        assert_eq!(page.total_pages(12), 3);
        assert_eq!(page.total_pages(0), 0);

        let fallback = PageRequest::from_query(Some("abc"), None);
        assert_eq!((fallback.page(), fallback.limit()), (1, 10));

        let clamped = PageRequest::new(-3, 1000);
        assert_eq!((clamped.page(), clamped.limit()), (1, 100));
    }

    #[test]
    fn test_parse_id() {
        let uuid = Uuid::new_v4();
        let id: SoalId = parse_id(&uuid.to_string()).unwrap();
        assert_eq!(id.into_uuid(), uuid);

        tokio_test::assert_err!(parse_id::<kernel::id::markers::Soal>(&uuid.simple().to_string()));
        tokio_test::assert_err!(parse_id::<kernel::id::markers::Soal>("soal-1"));
    }
}
