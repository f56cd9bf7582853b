//! Cached Provider Services
//!
//! Async adapters over the external news, fact-check, and classifier
//! providers. Each service memoizes its results through the cache layer
//! and degrades provider failures into empty or neutral results so the
//! route above never has to surface them.

pub mod classifier;
pub mod factcheck;
pub mod news;
pub mod verdict;

pub use classifier::ClassifierService;
pub use factcheck::FactCheckService;
pub use news::NewsService;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

/// Lowercases and collapses whitespace so query phrasing differences
/// land on one cache key.
pub(crate) fn normalize_query(query: &str) -> String {
    query
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parses a provider timestamp into RFC 3339 UTC.
///
/// Providers disagree on formats: RFC 3339 with or without `Z`, naive
/// ISO datetimes, and space-separated datetimes all appear in the wild.
/// Naive values are assumed UTC; anything unparseable becomes `None`.
pub(crate) fn normalize_timestamp(value: Option<&str>) -> Option<String> {
    let raw = value?.trim();
    if raw.is_empty() {
        return None;
    }
    let utc: DateTime<Utc> = if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        parsed.with_timezone(&Utc)
    } else if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        naive.and_utc()
    } else if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        naive.and_utc()
    } else {
        return None;
    };
    Some(utc.to_rfc3339_opts(SecondsFormat::Secs, true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_query_collapses_whitespace_and_case() {
        assert_eq!(normalize_query("  Moon   Landing  HOAX "), "moon landing hoax");
        assert_eq!(normalize_query("plain"), "plain");
    }

    #[test]
    fn test_normalize_timestamp_rfc3339() {
        assert_eq!(
            normalize_timestamp(Some("2026-01-02T03:04:05Z")),
            Some("2026-01-02T03:04:05Z".to_string())
        );
        assert_eq!(
            normalize_timestamp(Some("2026-01-02T03:04:05+02:00")),
            Some("2026-01-02T01:04:05Z".to_string())
        );
    }

    #[test]
    fn test_normalize_timestamp_naive_assumed_utc() {
        assert_eq!(
            normalize_timestamp(Some("2026-01-02T03:04:05")),
            Some("2026-01-02T03:04:05Z".to_string())
        );
        assert_eq!(
            normalize_timestamp(Some("2026-01-02 03:04:05")),
            Some("2026-01-02T03:04:05Z".to_string())
        );
    }

    #[test]
    fn test_normalize_timestamp_rejects_garbage() {
        assert_eq!(normalize_timestamp(None), None);
        assert_eq!(normalize_timestamp(Some("")), None);
        assert_eq!(normalize_timestamp(Some("yesterday-ish")), None);
    }
}
