//! Fact-Check Service
//!
//! ClaimReview lookups against the Google Fact Check Tools API, flattened
//! into normalized review records and cached per query.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::cache::{make_key, Cached};
use crate::config::Config;
use crate::error::ServiceError;
use crate::models::ClaimReviewItem;
use crate::services::{normalize_query, normalize_timestamp};

/// Hard page-size cap imposed by the upstream API.
const MAX_PAGE_SIZE: usize = 20;

// == Query Arguments ==
/// Argument bundle keying one cached lookup.
#[derive(Debug, Serialize)]
struct FactCheckQuery {
    query: String,
    per_page: usize,
}

// == Fact-Check Service ==
/// Queries ClaimReview entries for a piece of text.
///
/// A disabled provider, missing credentials, rate limiting, and upstream
/// failures all degrade to an empty list with a warning; the route layer
/// treats "no reviews" and "provider unavailable" identically.
pub struct FactCheckService {
    provider: String,
    timeout: Duration,
    http: Client,
    config: Config,
    cache: Cached<FactCheckQuery>,
}

impl FactCheckService {
    // == Constructor ==
    /// Builds the service from process configuration and a shared HTTP
    /// client.
    pub fn new(config: &Config, http: Client) -> Self {
        let provider = config.factcheck_provider.clone();
        let cache = Cached::new("factcheck.query")
            .ttl(config.factcheck_cache_ttl_seconds)
            .max_items(config.factcheck_cache_max_items)
            .key_fn({
                let provider = provider.clone();
                move |args: &FactCheckQuery| {
                    make_key(
                        "factcheck",
                        &[
                            provider.clone(),
                            args.per_page.to_string(),
                            normalize_query(&args.query),
                        ],
                    )
                }
            });
        Self {
            provider,
            timeout: Duration::from_secs_f64(config.factcheck_http_timeout_seconds),
            http,
            config: config.clone(),
            cache,
        }
    }

    // == Query ==
    /// Looks up ClaimReview entries for `query`, at most `limit` of them
    /// (clamped to the upstream page-size cap).
    pub async fn query_claimreview(
        &self,
        query: &str,
        limit: usize,
        force_refresh: bool,
    ) -> Result<Vec<ClaimReviewItem>, ServiceError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }
        let args = FactCheckQuery {
            query: trimmed.to_string(),
            per_page: limit.clamp(1, MAX_PAGE_SIZE),
        };
        self.cache
            .call(&args, force_refresh, || self.fetch(&args))
            .await
    }

    async fn fetch(&self, args: &FactCheckQuery) -> Result<Vec<ClaimReviewItem>, ServiceError> {
        if self.provider != "google" {
            return Ok(Vec::new());
        }
        let api_key = match &self.config.google_factcheck_key {
            Some(key) => key.clone(),
            None => {
                warn!("fact-check provider configured but GOOGLE_FACTCHECK_KEY missing");
                return Ok(Vec::new());
            }
        };

        let page_size = args.per_page.to_string();
        let response = self
            .http
            .get(&self.config.google_factcheck_endpoint)
            .timeout(self.timeout)
            .query(&[
                ("query", args.query.as_str()),
                ("pageSize", page_size.as_str()),
                ("languageCode", "en"),
                ("key", api_key.as_str()),
            ])
            .send()
            .await;
        let response = match response {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "fact-check API network error");
                return Ok(Vec::new());
            }
        };
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            warn!("fact-check API rate limit encountered; returning empty result");
            return Ok(Vec::new());
        }
        let data: Value = match response.error_for_status() {
            Ok(response) => match response.json().await {
                Ok(data) => data,
                Err(err) => {
                    warn!(error = %err, "fact-check API returned an unreadable body");
                    return Ok(Vec::new());
                }
            },
            Err(err) => {
                warn!(error = %err, "fact-check API HTTP error");
                return Ok(Vec::new());
            }
        };

        Ok(parse_claims(&data, args.per_page))
    }
}

// == Payload Parsing ==

/// Flattens the claims payload into review records, stopping at `limit`.
fn parse_claims(data: &Value, limit: usize) -> Vec<ClaimReviewItem> {
    let mut normalized = Vec::new();
    let claims = data["claims"].as_array().map(Vec::as_slice).unwrap_or_default();
    for claim in claims {
        let claim_text = claim["text"].as_str().map(str::trim).filter(|t| !t.is_empty());
        let claimant = claim["claimant"]
            .as_str()
            .map(str::trim)
            .filter(|c| !c.is_empty());
        let reviews = claim["claimReview"]
            .as_array()
            .map(Vec::as_slice)
            .unwrap_or_default();
        for review in reviews {
            if let Some(item) = normalize_review(claim_text, claimant, review) {
                normalized.push(item);
            }
            if normalized.len() >= limit {
                return normalized;
            }
        }
    }
    normalized
}

/// Builds one review record; reviews without a URL are dropped.
fn normalize_review(
    claim_text: Option<&str>,
    claimant: Option<&str>,
    review: &Value,
) -> Option<ClaimReviewItem> {
    let url = review["url"].as_str().map(str::trim).filter(|u| !u.is_empty())?;

    let publisher_name = review["publisher"]["name"]
        .as_str()
        .map(str::trim)
        .filter(|n| !n.is_empty());
    let publisher_site = review["publisher"]["site"]
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    Some(ClaimReviewItem {
        claim: claim_text.map(str::to_string),
        claimant: claimant.map(str::to_string),
        author: publisher_name.map(str::to_string),
        publisher: publisher_site.or(publisher_name).map(str::to_string),
        url: url.to_string(),
        review_date: normalize_timestamp(review["reviewDate"].as_str()),
        truth_rating: extract_truth_rating(review),
        excerpts: extract_excerpt(review),
    })
}

/// First non-empty textual rating, in decreasing order of specificity.
fn extract_truth_rating(review: &Value) -> Option<String> {
    [
        &review["reviewRating"]["textualRating"],
        &review["reviewRating"]["alternateName"],
        &review["reviewRating"]["ratingValue"],
        &review["title"],
    ]
    .into_iter()
    .find_map(|candidate| {
        candidate
            .as_str()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
    })
}

fn extract_excerpt(review: &Value) -> Option<String> {
    ["text", "summaryText", "title"].into_iter().find_map(|key| {
        review[key]
            .as_str()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
    })
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn service_with(config: Config) -> FactCheckService {
        FactCheckService::new(&config, Client::new())
    }

    fn review_payload() -> Value {
        json!({
            "claims": [
                {
                    "text": "The moon is made of cheese",
                    "claimant": "Anonymous blog",
                    "claimReview": [
                        {
                            "url": "https://factcheckers.example/moon",
                            "publisher": {"name": "FactCheckers", "site": "factcheckers.example"},
                            "reviewRating": {"textualRating": "False"},
                            "reviewDate": "2026-01-02T00:00:00Z",
                            "text": "The moon is rock."
                        },
                        {
                            "publisher": {"name": "NoUrl"},
                            "reviewRating": {"textualRating": "True"}
                        }
                    ]
                }
            ]
        })
    }

    #[test]
    fn test_parse_claims_flattens_reviews() {
        let items = parse_claims(&review_payload(), 5);

        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.claim.as_deref(), Some("The moon is made of cheese"));
        assert_eq!(item.claimant.as_deref(), Some("Anonymous blog"));
        assert_eq!(item.author.as_deref(), Some("FactCheckers"));
        assert_eq!(item.publisher.as_deref(), Some("factcheckers.example"));
        assert_eq!(item.truth_rating.as_deref(), Some("False"));
        assert_eq!(item.review_date.as_deref(), Some("2026-01-02T00:00:00Z"));
        assert_eq!(item.excerpts.as_deref(), Some("The moon is rock."));
    }

    #[test]
    fn test_parse_claims_respects_limit() {
        let reviews: Vec<Value> = (0..4)
            .map(|i| json!({"url": format!("https://example.com/{}", i)}))
            .collect();
        let data = json!({"claims": [{"text": "claim", "claimReview": reviews}]});

        assert_eq!(parse_claims(&data, 2).len(), 2);
    }

    #[test]
    fn test_truth_rating_fallback_chain() {
        let review = json!({
            "url": "https://example.com/r",
            "reviewRating": {"alternateName": "Pants on Fire"},
        });
        let item = normalize_review(None, None, &review).unwrap();
        assert_eq!(item.truth_rating.as_deref(), Some("Pants on Fire"));

        let review = json!({
            "url": "https://example.com/r",
            "title": "Misleading claim about vaccines",
        });
        let item = normalize_review(None, None, &review).unwrap();
        assert_eq!(
            item.truth_rating.as_deref(),
            Some("Misleading claim about vaccines")
        );
    }

    #[test]
    fn test_numeric_rating_value_is_ignored() {
        // Only textual ratings are meaningful to the verdict promotion.
        let review = json!({
            "url": "https://example.com/r",
            "reviewRating": {"ratingValue": 2},
        });
        let item = normalize_review(None, None, &review).unwrap();
        assert_eq!(item.truth_rating, None);
    }

    #[tokio::test]
    async fn test_blank_query_returns_empty() {
        let service = service_with(Config::default());
        let items = service.query_claimreview("  ", 5, false).await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_missing_key_degrades_to_empty() {
        // Default config selects the google provider with no key set.
        let service = service_with(Config::default());
        let items = service
            .query_claimreview("moon cheese", 5, false)
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_disabled_provider_returns_empty() {
        let config = Config {
            factcheck_provider: "none".to_string(),
            google_factcheck_key: Some("key".to_string()),
            ..Config::default()
        };
        let service = service_with(config);
        let items = service
            .query_claimreview("moon cheese", 5, false)
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_cache_key_clamps_page_size() {
        let service = service_with(Config::default());

        let capped = FactCheckQuery {
            query: "q".to_string(),
            per_page: 50.clamp(1, MAX_PAGE_SIZE),
        };
        assert_eq!(capped.per_page, MAX_PAGE_SIZE);
        assert!(service
            .cache
            .derive_key(&capped)
            .unwrap()
            .starts_with("factcheck:"));
    }
}
