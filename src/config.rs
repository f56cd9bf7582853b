//! Configuration Module
//!
//! Handles loading and managing service configuration from environment
//! variables.

use std::env;

use once_cell::sync::Lazy;

static GLOBAL: Lazy<Config> = Lazy::new(Config::from_env);

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible
/// defaults; malformed values fall back to the default rather than
/// failing startup. Cache sizing floors (TTL >= 60s, >= 4 items) are
/// enforced here so every backend sees sane bounds.
#[derive(Debug, Clone)]
pub struct Config {
    /// Default cache TTL in seconds
    pub cache_ttl_seconds: u64,
    /// Default maximum cache item count
    pub cache_max_items: usize,
    /// Whether the distributed cache backend is enabled
    pub use_redis: bool,
    /// Connection URL for the distributed backend
    pub redis_url: Option<String>,

    /// Active news provider (`newsapi`, `gnews`, or `newsdata`)
    pub news_provider: String,
    /// Default number of articles returned per search
    pub news_default_limit: usize,
    /// News cache TTL in seconds
    pub news_cache_ttl_seconds: u64,
    /// News cache entry bound
    pub news_cache_max_items: usize,
    /// News provider HTTP timeout in seconds
    pub news_http_timeout_seconds: f64,
    /// NewsAPI search endpoint
    pub newsapi_endpoint: String,
    /// GNews search endpoint
    pub gnews_endpoint: String,
    /// NewsData search endpoint
    pub newsdata_endpoint: String,
    /// NewsAPI credential
    pub newsapi_key: Option<String>,
    /// GNews credential
    pub gnews_key: Option<String>,
    /// NewsData credential
    pub newsdata_key: Option<String>,

    /// Active fact-check provider (`google` or disabled)
    pub factcheck_provider: String,
    /// Default number of claim reviews returned per query
    pub factcheck_default_limit: usize,
    /// Fact-check cache TTL in seconds
    pub factcheck_cache_ttl_seconds: u64,
    /// Fact-check cache entry bound
    pub factcheck_cache_max_items: usize,
    /// Fact-check HTTP timeout in seconds
    pub factcheck_http_timeout_seconds: f64,
    /// Google Fact Check Tools endpoint
    pub google_factcheck_endpoint: String,
    /// Google Fact Check Tools credential
    pub google_factcheck_key: Option<String>,

    /// Active classifier provider (`local` or `rapidapi`)
    pub classifier_provider: String,
    /// Classifier cache TTL in seconds
    pub classifier_cache_ttl_seconds: u64,
    /// Classifier cache entry bound
    pub classifier_cache_max_items: usize,
    /// Classifier HTTP timeout in seconds
    pub classifier_http_timeout_seconds: f64,
    /// RapidAPI classifier endpoint
    pub rapidapi_classifier_endpoint: String,
    /// RapidAPI credential
    pub rapidapi_key: Option<String>,
    /// RapidAPI host header value
    pub rapidapi_host: Option<String>,

    /// HTTP server port
    pub server_port: u16,
    /// Origins allowed by CORS; `*` permits any
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_TTL_SECONDS` / `CACHE_MAX_ITEMS` - default backend sizing
    /// - `USE_REDIS` / `REDIS_URL` - distributed backend selection
    /// - `NEWS_*`, `FACTCHECK_*`, `CLASSIFIER_*` - provider settings
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        Self {
            cache_ttl_seconds: env_u64("CACHE_TTL_SECONDS", 600).max(60),
            cache_max_items: env_usize("CACHE_MAX_ITEMS", 256).max(4),
            use_redis: env_bool("USE_REDIS", false),
            redis_url: env_str("REDIS_URL"),

            news_provider: env_str("NEWS_PROVIDER")
                .unwrap_or_else(|| "newsapi".to_string())
                .to_lowercase(),
            news_default_limit: env_usize("NEWS_DEFAULT_LIMIT", 3).max(1),
            news_cache_ttl_seconds: env_u64("NEWS_CACHE_TTL_SECONDS", 600).max(60),
            news_cache_max_items: env_usize("NEWS_CACHE_MAXSIZE", 64).max(4),
            news_http_timeout_seconds: env_f64("NEWS_HTTP_TIMEOUT_SECONDS", 8.0).max(1.0),
            newsapi_endpoint: env_str("NEWSAPI_ENDPOINT")
                .unwrap_or_else(|| "https://newsapi.org/v2/everything".to_string()),
            gnews_endpoint: env_str("GNEWS_ENDPOINT")
                .unwrap_or_else(|| "https://gnews.io/api/v4/search".to_string()),
            newsdata_endpoint: env_str("NEWSDATA_ENDPOINT")
                .unwrap_or_else(|| "https://newsdata.io/api/1/news".to_string()),
            newsapi_key: env_str("NEWSAPI_KEY"),
            gnews_key: env_str("GNEWS_KEY"),
            newsdata_key: env_str("NEWSDATA_KEY"),

            factcheck_provider: env_str("FACTCHECK_PROVIDER")
                .unwrap_or_else(|| "google".to_string())
                .to_lowercase(),
            factcheck_default_limit: env_usize("FACTCHECK_DEFAULT_LIMIT", 5).max(1),
            factcheck_cache_ttl_seconds: env_u64("FACTCHECK_CACHE_TTL_SECONDS", 900).max(60),
            factcheck_cache_max_items: env_usize("FACTCHECK_CACHE_MAXSIZE", 64).max(4),
            factcheck_http_timeout_seconds: env_f64("FACTCHECK_HTTP_TIMEOUT_SECONDS", 8.0).max(1.0),
            google_factcheck_endpoint: env_str("GOOGLE_FACTCHECK_ENDPOINT").unwrap_or_else(|| {
                "https://factchecktools.googleapis.com/v1alpha1/claims:search".to_string()
            }),
            google_factcheck_key: env_str("GOOGLE_FACTCHECK_KEY"),

            classifier_provider: env_str("CLASSIFIER_PROVIDER")
                .unwrap_or_else(|| "local".to_string())
                .to_lowercase(),
            classifier_cache_ttl_seconds: env_u64("CLASSIFIER_CACHE_TTL_SECONDS", 600).max(60),
            classifier_cache_max_items: env_usize("CLASSIFIER_CACHE_MAXSIZE", 64).max(4),
            classifier_http_timeout_seconds: env_f64("CLASSIFIER_HTTP_TIMEOUT_SECONDS", 8.0)
                .max(1.0),
            rapidapi_classifier_endpoint: env_str("RAPIDAPI_CLASSIFIER_ENDPOINT")
                .unwrap_or_else(|| "https://fake-news-detector.p.rapidapi.com/predict".to_string()),
            rapidapi_key: env_str("RAPIDAPI_KEY"),
            rapidapi_host: env_str("RAPIDAPI_HOST"),

            server_port: env_u64("SERVER_PORT", 3000).min(u16::MAX as u64) as u16,
            allowed_origins: env_list("ALLOWED_ORIGINS", "*"),
        }
    }

    /// Process-wide configuration, loaded once on first access.
    ///
    /// Backend creation reads sizing and redis settings from here; the
    /// values are fixed for the process lifetime.
    pub fn global() -> &'static Config {
        &GLOBAL
    }
}

impl Default for Config {
    fn default() -> Self {
        // Defaults match an empty environment.
        Self {
            cache_ttl_seconds: 600,
            cache_max_items: 256,
            use_redis: false,
            redis_url: None,
            news_provider: "newsapi".to_string(),
            news_default_limit: 3,
            news_cache_ttl_seconds: 600,
            news_cache_max_items: 64,
            news_http_timeout_seconds: 8.0,
            newsapi_endpoint: "https://newsapi.org/v2/everything".to_string(),
            gnews_endpoint: "https://gnews.io/api/v4/search".to_string(),
            newsdata_endpoint: "https://newsdata.io/api/1/news".to_string(),
            newsapi_key: None,
            gnews_key: None,
            newsdata_key: None,
            factcheck_provider: "google".to_string(),
            factcheck_default_limit: 5,
            factcheck_cache_ttl_seconds: 900,
            factcheck_cache_max_items: 64,
            factcheck_http_timeout_seconds: 8.0,
            google_factcheck_endpoint:
                "https://factchecktools.googleapis.com/v1alpha1/claims:search".to_string(),
            google_factcheck_key: None,
            classifier_provider: "local".to_string(),
            classifier_cache_ttl_seconds: 600,
            classifier_cache_max_items: 64,
            classifier_http_timeout_seconds: 8.0,
            rapidapi_classifier_endpoint: "https://fake-news-detector.p.rapidapi.com/predict"
                .to_string(),
            rapidapi_key: None,
            rapidapi_host: None,
            server_port: 3000,
            allowed_origins: vec!["*".to_string()],
        }
    }
}

// == Env Helpers ==

/// Non-empty string value of an environment variable.
fn env_str(name: &str) -> Option<String> {
    env::var(name).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn env_u64(name: &str, default: u64) -> u64 {
    env_str(name)
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env_str(name)
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

fn env_f64(name: &str, default: f64) -> f64 {
    env_str(name)
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

/// Comma-separated list value of an environment variable.
fn env_list(name: &str, default: &str) -> Vec<String> {
    env_str(name)
        .unwrap_or_else(|| default.to_string())
        .split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn env_bool(name: &str, default: bool) -> bool {
    match env_str(name) {
        Some(value) => matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        None => default,
    }
}
