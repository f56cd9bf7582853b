//! Response DTOs for the verification API
//!
//! Defines the structure of outgoing HTTP response bodies and the
//! normalized provider records embedded in them. The provider records
//! also round-trip through the cache backends, so they derive both
//! `Serialize` and `Deserialize`.

use serde::{Deserialize, Serialize};

// == Verdict ==
/// Final call on a piece of news content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Likely fabricated or misleading
    Fake,
    /// Likely accurate
    Real,
    /// Signals are too weak or conflicting to decide
    Unsure,
}

// == Source Article ==
/// Normalized article preview returned by the news providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceArticle {
    /// Headline of the matched article
    pub title: String,
    /// Publisher name, `Unknown` when the provider omits it
    pub source: String,
    /// Canonical link to the article
    pub url: String,
    /// Publication time as RFC 3339 UTC, when the provider supplied one
    #[serde(rename = "publishedAt")]
    pub published_at: Option<String>,
    /// Short description or content excerpt
    pub snippet: Option<String>,
}

// == Claim Review ==
/// Structured ClaimReview metadata flattened from fact-check providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimReviewItem {
    /// The claim text under review
    pub claim: Option<String>,
    /// Who made the claim
    pub claimant: Option<String>,
    /// Name of the reviewing organization
    pub author: Option<String>,
    /// Site or name of the publisher hosting the review
    pub publisher: Option<String>,
    /// Link to the full review
    pub url: String,
    /// Review publication time as RFC 3339 UTC
    pub review_date: Option<String>,
    /// The reviewer's textual rating (e.g. `False`, `Mixture`)
    pub truth_rating: Option<String>,
    /// Short excerpt from the review body
    pub excerpts: Option<String>,
}

// == Classifier Result ==
/// Outcome of one classifier scoring pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierResult {
    /// Which classifier produced the score (`local` or `rapidapi`)
    pub provider: String,
    /// Fake-news likelihood in [0, 1]; 0 reads real, 1 reads fake
    pub score: f64,
    /// Human-readable reasoning, truncated for transport
    pub explanation: Option<String>,
}

impl ClassifierResult {
    /// A neutral result used when no classifier can run.
    pub fn neutral(explanation: impl Into<String>) -> Self {
        Self {
            provider: "local".to_string(),
            score: 0.5,
            explanation: Some(explanation.into()),
        }
    }
}

// == Check News Response ==
/// Response body for the analysis endpoint (POST /check-news)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckNewsResponse {
    /// Final verdict after promotion or blending
    pub verdict: Verdict,
    /// Confidence in the verdict, in [0, 1]
    pub confidence: f64,
    /// Supporting evidence statements
    pub evidence: Vec<String>,
    /// Related articles from the news provider
    pub sources: Vec<SourceArticle>,
    /// Matched fact-check reviews
    pub claim_reviews: Vec<ClaimReviewItem>,
    /// Classifier outcome feeding the blended verdict
    pub classifier: ClassifierResult,
    /// Narration of which signals shaped the verdict
    pub notes: String,
}

// == Health Response ==
/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Health status (`ok`)
    pub status: String,
    /// Current timestamp in RFC 3339 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a healthy response stamped with the current time.
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

// == Readiness Response ==
/// Response body for the readiness endpoint (GET /ready)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyResponse {
    /// Overall readiness: `ok`, `degraded`, or `fail`
    pub status: String,
    /// Individual dependency probes
    pub checks: ReadyChecks,
}

/// Dependency probes reported by the readiness endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyChecks {
    /// In-process cache round-trip probe
    pub cache: CacheCheck,
    /// Distributed backend expectations vs. reality
    pub redis: RedisCheck,
}

/// Result of the throwaway cache round-trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheCheck {
    /// `pass` or `fail`
    pub status: String,
}

/// Distributed backend availability as seen by the selector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisCheck {
    /// Whether configuration asks for the distributed backend
    pub configured: bool,
    /// Whether a live client handle exists
    pub available: bool,
}
