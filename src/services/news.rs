//! News Search Service
//!
//! Provider-specific adapters for NewsAPI, GNews, and NewsData behind one
//! cached search entry point.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::cache::{make_key, Cached};
use crate::config::Config;
use crate::error::ServiceError;
use crate::models::SourceArticle;
use crate::services::{normalize_query, normalize_timestamp};

// == Query Arguments ==
/// Argument bundle keying one cached search.
#[derive(Debug, Serialize)]
struct NewsQuery {
    query: String,
    per_page: usize,
}

// == News Service ==
/// Searches the configured news provider for articles related to a text.
///
/// Results are cached under the `news.search` namespace; the key covers
/// the provider, the page size, and the whitespace-normalized lowercased
/// query, so phrasing differences collapse onto one entry.
pub struct NewsService {
    provider: String,
    timeout: Duration,
    http: Client,
    config: Config,
    cache: Cached<NewsQuery>,
}

impl NewsService {
    // == Constructor ==
    /// Builds the service from process configuration and a shared HTTP
    /// client. Cache sizing and the provider choice are fixed here.
    pub fn new(config: &Config, http: Client) -> Self {
        let provider = config.news_provider.clone();
        let cache = Cached::new("news.search")
            .ttl(config.news_cache_ttl_seconds)
            .max_items(config.news_cache_max_items)
            .key_fn({
                let provider = provider.clone();
                move |args: &NewsQuery| {
                    make_key(
                        "news",
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
            timeout: Duration::from_secs_f64(config.news_http_timeout_seconds),
            http,
            config: config.clone(),
            cache,
        }
    }

    // == Search ==
    /// Searches for relevant articles using the configured provider.
    ///
    /// Missing credentials surface as [`ServiceError::MissingCredentials`];
    /// provider HTTP failures are logged and yield an empty list. A blank
    /// query short-circuits to empty without touching the cache.
    pub async fn search_news(
        &self,
        query: &str,
        limit: usize,
        force_refresh: bool,
    ) -> Result<Vec<SourceArticle>, ServiceError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }
        let args = NewsQuery {
            query: trimmed.to_string(),
            per_page: limit.max(1),
        };
        self.cache
            .call(&args, force_refresh, || self.fetch(&args))
            .await
    }

    async fn fetch(&self, args: &NewsQuery) -> Result<Vec<SourceArticle>, ServiceError> {
        let api_key = match self.api_key() {
            Some(key) => key,
            None => {
                return Err(ServiceError::MissingCredentials(format!(
                    "news provider '{}'",
                    self.provider
                )))
            }
        };
        let result = match self.provider.as_str() {
            "newsapi" => self.search_newsapi(&args.query, args.per_page, &api_key).await,
            "gnews" => self.search_gnews(&args.query, args.per_page, &api_key).await,
            "newsdata" => self.search_newsdata(&args.query, args.per_page, &api_key).await,
            other => {
                warn!(provider = other, "unsupported news provider");
                return Ok(Vec::new());
            }
        };
        match result {
            Ok(articles) => Ok(articles),
            Err(err) => {
                warn!(error = %err, provider = %self.provider, "news provider request failed");
                Ok(Vec::new())
            }
        }
    }

    fn api_key(&self) -> Option<String> {
        match self.provider.as_str() {
            "newsapi" => self.config.newsapi_key.clone(),
            "gnews" => self.config.gnews_key.clone(),
            "newsdata" => self.config.newsdata_key.clone(),
            _ => None,
        }
    }

    // == Provider Adapters ==
    async fn search_newsapi(
        &self,
        query: &str,
        per_page: usize,
        api_key: &str,
    ) -> Result<Vec<SourceArticle>, reqwest::Error> {
        let page_size = per_page.to_string();
        let data: Value = self
            .http
            .get(&self.config.newsapi_endpoint)
            .timeout(self.timeout)
            .query(&[
                ("q", query),
                ("language", "en"),
                ("pageSize", page_size.as_str()),
                ("sortBy", "relevancy"),
            ])
            .header("X-Api-Key", api_key)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(parse_newsapi(&data, per_page))
    }

    async fn search_gnews(
        &self,
        query: &str,
        per_page: usize,
        api_key: &str,
    ) -> Result<Vec<SourceArticle>, reqwest::Error> {
        let max = per_page.to_string();
        let data: Value = self
            .http
            .get(&self.config.gnews_endpoint)
            .timeout(self.timeout)
            .query(&[("q", query), ("lang", "en"), ("max", max.as_str()), ("token", api_key)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(parse_gnews(&data, per_page))
    }

    async fn search_newsdata(
        &self,
        query: &str,
        per_page: usize,
        api_key: &str,
    ) -> Result<Vec<SourceArticle>, reqwest::Error> {
        let data: Value = self
            .http
            .get(&self.config.newsdata_endpoint)
            .timeout(self.timeout)
            .query(&[("q", query), ("language", "en"), ("apikey", api_key)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(parse_newsdata(&data, per_page))
    }
}

// == Payload Parsing ==

fn parse_newsapi(data: &Value, per_page: usize) -> Vec<SourceArticle> {
    data["articles"]
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .filter_map(|item| {
            normalize_article(
                item["title"].as_str(),
                item["source"]["name"].as_str(),
                item["url"].as_str(),
                item["publishedAt"].as_str(),
                item["description"]
                    .as_str()
                    .or_else(|| item["content"].as_str()),
            )
        })
        .take(per_page)
        .collect()
}

fn parse_gnews(data: &Value, per_page: usize) -> Vec<SourceArticle> {
    data["articles"]
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .filter_map(|item| {
            // GNews reports the source as an object or a bare string.
            let source = item["source"]["name"]
                .as_str()
                .or_else(|| item["source"].as_str());
            normalize_article(
                item["title"].as_str(),
                source,
                item["url"].as_str(),
                item["publishedAt"].as_str(),
                item["description"].as_str(),
            )
        })
        .take(per_page)
        .collect()
}

fn parse_newsdata(data: &Value, per_page: usize) -> Vec<SourceArticle> {
    data["results"]
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .filter_map(|item| {
            normalize_article(
                item["title"].as_str(),
                item["source_id"]
                    .as_str()
                    .or_else(|| item["creator"][0].as_str()),
                item["link"].as_str(),
                item["pubDate"].as_str(),
                item["description"]
                    .as_str()
                    .or_else(|| item["content"].as_str()),
            )
        })
        .take(per_page)
        .collect()
}

/// Builds a normalized article; rows without a title or URL are dropped.
fn normalize_article(
    title: Option<&str>,
    source: Option<&str>,
    url: Option<&str>,
    published_at: Option<&str>,
    snippet: Option<&str>,
) -> Option<SourceArticle> {
    let title = title.map(str::trim).filter(|t| !t.is_empty())?;
    let url = url.map(str::trim).filter(|u| !u.is_empty())?;
    let source = source
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("Unknown");
    Some(SourceArticle {
        title: title.to_string(),
        source: source.to_string(),
        url: url.to_string(),
        published_at: normalize_timestamp(published_at),
        snippet: snippet
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    })
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn service_with(config: Config) -> NewsService {
        NewsService::new(&config, Client::new())
    }

    #[test]
    fn test_parse_newsapi_payload() {
        let data = json!({
            "articles": [
                {
                    "title": " Quake hits region ",
                    "source": {"name": "Reuters"},
                    "url": "https://example.com/quake",
                    "publishedAt": "2026-01-01T12:00:00Z",
                    "description": "Details emerging."
                },
                {
                    "title": null,
                    "url": "https://example.com/broken"
                }
            ]
        });

        let articles = parse_newsapi(&data, 3);

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Quake hits region");
        assert_eq!(articles[0].source, "Reuters");
        assert_eq!(articles[0].published_at.as_deref(), Some("2026-01-01T12:00:00Z"));
        assert_eq!(articles[0].snippet.as_deref(), Some("Details emerging."));
    }

    #[test]
    fn test_parse_newsapi_respects_limit() {
        let rows: Vec<Value> = (0..5)
            .map(|i| {
                json!({
                    "title": format!("Story {}", i),
                    "url": format!("https://example.com/{}", i)
                })
            })
            .collect();
        let data = json!({ "articles": rows });

        assert_eq!(parse_newsapi(&data, 2).len(), 2);
    }

    #[test]
    fn test_parse_gnews_string_source() {
        let data = json!({
            "articles": [{
                "title": "Headline",
                "source": "GNews Wire",
                "url": "https://example.com/h",
                "publishedAt": "2026-02-02T00:00:00Z"
            }]
        });

        let articles = parse_gnews(&data, 3);
        assert_eq!(articles[0].source, "GNews Wire");
    }

    #[test]
    fn test_parse_newsdata_fallbacks() {
        let data = json!({
            "results": [{
                "title": "Local story",
                "creator": ["Jane Doe"],
                "link": "https://example.com/local",
                "pubDate": "2026-03-03 10:00:00",
                "content": "Body text"
            }]
        });

        let articles = parse_newsdata(&data, 3);
        assert_eq!(articles[0].source, "Jane Doe");
        assert_eq!(articles[0].published_at.as_deref(), Some("2026-03-03T10:00:00Z"));
        assert_eq!(articles[0].snippet.as_deref(), Some("Body text"));
    }

    #[test]
    fn test_normalize_article_missing_source_is_unknown() {
        let article =
            normalize_article(Some("T"), None, Some("https://example.com"), None, None).unwrap();
        assert_eq!(article.source, "Unknown");
        assert_eq!(article.published_at, None);
        assert_eq!(article.snippet, None);
    }

    #[tokio::test]
    async fn test_blank_query_returns_empty_without_error() {
        let service = service_with(Config::default());

        let articles = service.search_news("   ", 3, false).await.unwrap();
        assert!(articles.is_empty());
    }

    #[tokio::test]
    async fn test_missing_credentials_propagate() {
        // Default config carries no API keys.
        let service = service_with(Config::default());

        let err = service.search_news("moon landing", 3, false).await.unwrap_err();
        assert!(matches!(err, ServiceError::MissingCredentials(_)));
    }

    #[test]
    fn test_cache_key_normalizes_query_text() {
        let service = service_with(Config::default());

        let loose = NewsQuery {
            query: "  Moon   LANDING ".to_string(),
            per_page: 3,
        };
        let tight = NewsQuery {
            query: "moon landing".to_string(),
            per_page: 3,
        };
        let other = NewsQuery {
            query: "moon landing".to_string(),
            per_page: 5,
        };

        let loose_key = service.cache.derive_key(&loose).unwrap();
        let tight_key = service.cache.derive_key(&tight).unwrap();
        let other_key = service.cache.derive_key(&other).unwrap();

        assert_eq!(loose_key, tight_key);
        assert_ne!(tight_key, other_key);
        assert!(tight_key.starts_with("news:"));
    }
}
