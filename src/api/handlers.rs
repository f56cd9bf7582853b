//! API Handlers
//!
//! HTTP request handlers for the verification endpoints. The analysis
//! handler orchestrates the cached services and the verdict heuristics;
//! service failures degrade into notes rather than error responses.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde_json::Value;
use tracing::error;

use crate::cache::{redis_available, LocalCache};
use crate::config::Config;
use crate::error::{ApiError, ServiceError};
use crate::models::{
    CacheCheck, CheckNewsRequest, CheckNewsResponse, ClassifierResult, HealthResponse, ReadyChecks,
    ReadyResponse, RedisCheck, RefreshQuery, Verdict,
};
use crate::services::verdict::{
    append_note, combine_scores, estimate_news_contradiction_score, map_score_to_verdict,
    promote_claim_review_verdict, BASELINE_NOTE,
};
use crate::services::{ClassifierService, FactCheckService, NewsService};

// == Application State ==
/// Shared state handed to every handler.
///
/// The services each own their cache; cloning the state clones cheap
/// `Arc` handles, not the caches themselves.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration snapshot
    pub config: Config,
    /// Cached news search service
    pub news: Arc<NewsService>,
    /// Cached fact-check lookup service
    pub factcheck: Arc<FactCheckService>,
    /// Cached classifier service
    pub classifier: Arc<ClassifierService>,
}

impl AppState {
    /// Builds the state and its services from configuration.
    ///
    /// One HTTP client is shared across the provider services; each
    /// service applies its own request timeout.
    pub fn from_config(config: &Config) -> Self {
        let http = reqwest::Client::new();
        Self {
            config: config.clone(),
            news: Arc::new(NewsService::new(config, http.clone())),
            factcheck: Arc::new(FactCheckService::new(config, http.clone())),
            classifier: Arc::new(ClassifierService::new(config, http)),
        }
    }
}

// == Check News ==
/// Handler for POST /check-news
///
/// Assembles the analysis: fact-check reviews outrank everything and are
/// promoted to the primary verdict; otherwise the classifier score is
/// blended with a news-coverage heuristic. `?refresh=true` forces every
/// cached downstream lookup to recompute.
pub async fn check_news_handler(
    State(state): State<AppState>,
    Query(params): Query<RefreshQuery>,
    Json(payload): Json<CheckNewsRequest>,
) -> Result<Json<CheckNewsResponse>, ApiError> {
    if let Some(message) = payload.validate() {
        return Err(ApiError::Validation(message));
    }
    let refresh = params.refresh;

    let mut verdict = Verdict::Unsure;
    let mut confidence = 0.5;
    let mut notes = BASELINE_NOTE.to_string();

    let claim_reviews = match state
        .factcheck
        .query_claimreview(&payload.text, state.config.factcheck_default_limit, refresh)
        .await
    {
        Ok(reviews) => reviews,
        Err(err) => {
            error!(error = %err, "fact-check query failed");
            Vec::new()
        }
    };
    if !claim_reviews.is_empty() {
        (verdict, confidence) = promote_claim_review_verdict(&claim_reviews);
        notes = append_note(&notes, "ClaimReview matched and promoted to primary verdict.");
    }

    let sources = match state
        .news
        .search_news(&payload.text, state.config.news_default_limit, refresh)
        .await
    {
        Ok(articles) => {
            if articles.is_empty() {
                notes = append_note(&notes, "No related articles returned by the news provider.");
            } else {
                notes = append_note(
                    &notes,
                    &format!(
                        "News results added from provider: {}",
                        state.config.news_provider
                    ),
                );
            }
            articles
        }
        Err(ServiceError::MissingCredentials(which)) => {
            notes = append_note(&notes, &format!("News provider credentials missing: {}.", which));
            Vec::new()
        }
        Err(err) => {
            error!(error = %err, "news search failed");
            notes = append_note(&notes, "News provider lookup failed; see logs for details.");
            Vec::new()
        }
    };

    let classifier = match state.classifier.classify_text(&payload.text, refresh).await {
        Ok(result) => result,
        Err(err) => {
            error!(error = %err, "classifier invocation failed");
            ClassifierResult::neutral("Classifier unavailable; defaulting to neutral score.")
        }
    };
    notes = append_note(
        &notes,
        &format!("Classifier provider {} executed.", classifier.provider),
    );

    if claim_reviews.is_empty() {
        let combined = combine_scores(
            classifier.score,
            estimate_news_contradiction_score(&sources),
        );
        (verdict, confidence) = map_score_to_verdict(combined);
        notes = append_note(&notes, "Verdict blended classifier and news heuristics.");
    }

    Ok(Json(CheckNewsResponse {
        verdict,
        confidence,
        evidence: Vec::new(),
        sources,
        claim_reviews,
        classifier,
        notes,
    }))
}

// == Health ==
/// Handler for GET /health
///
/// Lightweight liveness probe; answers without touching dependencies.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

// == Readiness ==
/// Handler for GET /ready
///
/// Probes a throwaway local cache round-trip and reports whether the
/// distributed backend is both expected and reachable. A missing redis
/// only degrades readiness since the selector falls back transparently.
pub async fn ready_handler(State(state): State<AppState>) -> Json<ReadyResponse> {
    let probe = LocalCache::new(2, 8);
    probe.set("ready", Value::Bool(true), Some(1)).await;
    let cache_ok = probe.get("ready").await.is_some();

    let configured = state.config.use_redis && state.config.redis_url.is_some();
    let available = redis_available().await;

    let status = if !cache_ok {
        "fail"
    } else if configured && !available {
        "degraded"
    } else {
        "ok"
    };

    Json(ReadyResponse {
        status: status.to_string(),
        checks: ReadyChecks {
            cache: CacheCheck {
                status: if cache_ok { "pass" } else { "fail" }.to_string(),
            },
            redis: RedisCheck {
                configured,
                available,
            },
        },
    })
}
