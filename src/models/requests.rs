//! Request DTOs for the verification API
//!
//! Defines the structure of incoming HTTP request bodies and query
//! parameters.

use serde::Deserialize;

/// Request body for the analysis endpoint (POST /check-news)
#[derive(Debug, Clone, Deserialize)]
pub struct CheckNewsRequest {
    /// News article, snippet, or headline to analyze
    pub text: String,
}

impl CheckNewsRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.text.trim().is_empty() {
            return Some("text must not be empty".to_string());
        }
        None
    }
}

/// Query parameters accepted by the analysis endpoint.
///
/// `refresh=true` forwards a force-refresh through every cached
/// downstream service, bypassing lookups and overwriting entries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefreshQuery {
    /// Force refresh of cached downstream results
    #[serde(default)]
    pub refresh: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_news_request_deserialize() {
        let json = r#"{"text": "Breaking story"}"#;
        let req: CheckNewsRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.text, "Breaking story");
    }

    #[test]
    fn test_validate_empty_text() {
        let req = CheckNewsRequest {
            text: "   ".to_string(),
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_validate_valid_request() {
        let req = CheckNewsRequest {
            text: "Scientists publish new study".to_string(),
        };
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_refresh_query_defaults_to_false() {
        let query: RefreshQuery = serde_json::from_str("{}").unwrap();
        assert!(!query.refresh);

        let query: RefreshQuery = serde_json::from_str(r#"{"refresh": true}"#).unwrap();
        assert!(query.refresh);
    }
}
