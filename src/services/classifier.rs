//! Classifier Service
//!
//! Sources a fake-news likelihood score from the RapidAPI classifier when
//! configured, with a deterministic local heuristic fallback. Scores are
//! cached per input text.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::cache::{make_key, Cached};
use crate::config::Config;
use crate::error::ServiceError;
use crate::models::ClassifierResult;

/// Maximum explanation length forwarded to callers.
const MAX_EXPLANATION_CHARS: usize = 200;

/// Vocabulary cues nudging the local heuristic toward "fake".
const SENSATIONAL_TERMS: [&str; 10] = [
    "shocking",
    "breaking",
    "exposed",
    "hoax",
    "cover-up",
    "outrage",
    "collapse",
    "apocalypse",
    "secret",
    "reveal",
];

/// Vocabulary cues nudging the local heuristic toward "real".
const REPUTABLE_TERMS: [&str; 10] = [
    "according",
    "research",
    "study",
    "reported",
    "analysis",
    "verified",
    "official",
    "evidence",
    "journal",
    "investigation",
];

// == Query Arguments ==
/// Argument bundle keying one cached classification.
#[derive(Debug, Serialize)]
struct ClassifierQuery {
    text: String,
}

// == Classifier Service ==
/// Scores text for fake-news likelihood in [0, 1].
///
/// The cache key is the provider plus a SHA-256 digest of the
/// whitespace-collapsed text, so arbitrarily long inputs key compactly.
/// Any RapidAPI failure degrades to the local heuristic; the service
/// itself only errors on cache transport problems.
pub struct ClassifierService {
    provider: String,
    timeout: Duration,
    http: Client,
    config: Config,
    cache: Cached<ClassifierQuery>,
}

impl ClassifierService {
    // == Constructor ==
    /// Builds the service from process configuration and a shared HTTP
    /// client.
    pub fn new(config: &Config, http: Client) -> Self {
        let provider = config.classifier_provider.clone();
        let cache = Cached::new("classifier.score")
            .ttl(config.classifier_cache_ttl_seconds)
            .max_items(config.classifier_cache_max_items)
            .key_fn({
                let provider = provider.clone();
                move |args: &ClassifierQuery| {
                    let collapsed = args.text.split_whitespace().collect::<Vec<_>>().join(" ");
                    make_key("classifier", &[provider.clone(), hash_text(&collapsed)])
                }
            });
        Self {
            provider,
            timeout: Duration::from_secs_f64(config.classifier_http_timeout_seconds),
            http,
            config: config.clone(),
            cache,
        }
    }

    // == Classify ==
    /// Returns a classifier score for `text`: 0 reads real, 1 reads fake.
    pub async fn classify_text(
        &self,
        text: &str,
        force_refresh: bool,
    ) -> Result<ClassifierResult, ServiceError> {
        let args = ClassifierQuery {
            text: text.to_string(),
        };
        self.cache
            .call(&args, force_refresh, || self.score(text))
            .await
    }

    async fn score(&self, text: &str) -> Result<ClassifierResult, ServiceError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(ClassifierResult::neutral(
                "No text submitted for classification.",
            ));
        }

        let result = match self.provider.as_str() {
            "rapidapi" => match self.classify_rapidapi(trimmed).await {
                Ok(result) => result,
                Err(ServiceError::MissingCredentials(_)) => {
                    warn!("RapidAPI credentials missing; using local classifier");
                    classify_locally(trimmed, Some("RapidAPI credentials missing"))
                }
                Err(err) => {
                    warn!(error = %err, "classifier provider error; using local fallback");
                    classify_locally(trimmed, Some(&err.to_string()))
                }
            },
            "local" => classify_locally(trimmed, Some("Configured to use local classifier")),
            other => {
                warn!(provider = other, "unsupported classifier provider; falling back to local");
                classify_locally(trimmed, Some("Unsupported provider requested"))
            }
        };
        Ok(result)
    }

    async fn classify_rapidapi(&self, text: &str) -> Result<ClassifierResult, ServiceError> {
        let (api_key, api_host) = match (&self.config.rapidapi_key, &self.config.rapidapi_host) {
            (Some(key), Some(host)) => (key.clone(), host.clone()),
            _ => {
                return Err(ServiceError::MissingCredentials(
                    "RAPIDAPI_KEY and RAPIDAPI_HOST are required for the rapidapi provider"
                        .to_string(),
                ))
            }
        };

        let response = self
            .http
            .post(&self.config.rapidapi_classifier_endpoint)
            .timeout(self.timeout)
            .header("X-RapidAPI-Key", api_key.as_str())
            .header("X-RapidAPI-Host", api_host.as_str())
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await?;
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(ServiceError::Provider("RapidAPI rate limit reached".to_string()));
        }
        let data: Value = response.error_for_status()?.json().await?;

        Ok(ClassifierResult {
            provider: "rapidapi".to_string(),
            score: extract_score(&data),
            explanation: extract_explanation(&data),
        })
    }
}

// == Local Heuristic ==
/// Deterministic fallback: counts sensational vs. reputable cues and
/// squashes the weighted difference through a logistic curve.
fn classify_locally(text: &str, reason: Option<&str>) -> ClassifierResult {
    let words: Vec<String> = text
        .split_whitespace()
        .map(|token| {
            token
                .trim_matches(|c: char| ".,!?;:\"'()".contains(c))
                .to_lowercase()
        })
        .filter(|word| !word.is_empty())
        .collect();
    let sensational_hits = words
        .iter()
        .filter(|word| SENSATIONAL_TERMS.contains(&word.as_str()))
        .count();
    let reputable_hits = words
        .iter()
        .filter(|word| REPUTABLE_TERMS.contains(&word.as_str()))
        .count();

    let weight = 0.8 * sensational_hits as f64 - 0.6 * reputable_hits as f64;
    let score = (1.0 / (1.0 + (-weight).exp())).clamp(0.0, 1.0);

    let mut pieces = Vec::new();
    if sensational_hits > 0 {
        pieces.push(format!("Detected {} sensational terms", sensational_hits));
    }
    if reputable_hits > 0 {
        pieces.push(format!("Found {} reputable cues", reputable_hits));
    }
    if let Some(reason) = reason {
        pieces.push(reason.to_string());
    }
    let explanation = if pieces.is_empty() {
        "Heuristic baseline applied.".to_string()
    } else {
        pieces.join("; ")
    };

    ClassifierResult {
        provider: "local".to_string(),
        score,
        explanation: Some(truncate(&explanation, MAX_EXPLANATION_CHARS)),
    }
}

// == Payload Parsing ==

/// Pulls a score out of the provider payload, neutral on unknown shapes.
fn extract_score(payload: &Value) -> f64 {
    if let Some(score) = payload["score"].as_f64() {
        return score.clamp(0.0, 1.0);
    }
    if let Some(prediction) = payload["prediction"].as_f64() {
        return prediction.clamp(0.0, 1.0);
    }
    if let Some(fake) = payload["probability"]["fake"].as_f64() {
        return fake.clamp(0.0, 1.0);
    }
    0.5
}

fn extract_explanation(payload: &Value) -> Option<String> {
    ["explanation", "reason", "label"].into_iter().find_map(|key| {
        payload[key]
            .as_str()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(|text| truncate(text, MAX_EXPLANATION_CHARS))
    })
}

fn hash_text(text: &str) -> String {
    Sha256::digest(text.as_bytes())
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect()
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
