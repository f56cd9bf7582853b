//! Remote Cache Module
//!
//! Distributed cache backend adapting a key-value client: namespaced
//! keys, JSON text values, and an optional recency index for bounded
//! trimming.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::cache::client::KeyValueClient;
use crate::error::CacheError;

// == Remote Cache ==
/// Cache backend whose state lives entirely in a distributed store.
///
/// Keys are namespaced as `<namespace>:<key>`. When a `max_items` bound is
/// configured, a sorted set at `<namespace>:keys` records each key with
/// its last-touched timestamp as score, enabling approximate LRU trimming.
/// The approximation is deliberate: a read refreshing its score can race a
/// concurrent trim, which is acceptable for a cache.
pub struct RemoteCache {
    client: Arc<dyn KeyValueClient>,
    namespace: String,
    default_ttl: u64,
    max_items: Option<usize>,
    index_key: String,
}

impl RemoteCache {
    // == Constructor ==
    /// Creates a backend over `client` bound to `namespace`.
    ///
    /// The TTL is floored to 1. `max_items = None` disables the recency
    /// index and trimming entirely.
    pub fn new(
        client: Arc<dyn KeyValueClient>,
        namespace: &str,
        default_ttl: u64,
        max_items: Option<usize>,
    ) -> Self {
        let namespace = {
            let trimmed = namespace.trim_end_matches(':');
            if trimmed.is_empty() { "cache" } else { trimmed }.to_string()
        };
        let index_key = format!("{}:keys", namespace);
        Self {
            client,
            namespace,
            default_ttl: default_ttl.max(1),
            max_items: max_items.filter(|&n| n > 0),
            index_key,
        }
    }

    /// Default TTL applied when `set` receives no positive TTL.
    pub fn default_ttl(&self) -> u64 {
        self.default_ttl
    }

    /// Configured entry bound, if any.
    pub fn max_items(&self) -> Option<usize> {
        self.max_items
    }

    // == Get ==
    /// Reads and decodes the value under `key`.
    ///
    /// A value that no longer parses as JSON is treated as absent and
    /// actively deleted so the next write starts clean. Transport errors
    /// propagate untouched.
    pub async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let namespaced = self.namespaced(key);
        let raw = match self.client.get(&namespaced).await? {
            Some(raw) => raw,
            None => return Ok(None),
        };
        if self.max_items.is_some() {
            self.client
                .zadd(&self.index_key, &namespaced, now_score())
                .await?;
        }
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(_) => {
                warn!(key, "remote cache value is not valid JSON; clearing entry");
                self.delete(key).await?;
                Ok(None)
            }
        }
    }

    // == Set ==
    /// Encodes `value` as JSON text and writes it with the resolved TTL
    /// as the remote expiry, then refreshes the index and trims when a
    /// bound is configured.
    pub async fn set(&self, key: &str, value: &Value, ttl: Option<u64>) -> Result<(), CacheError> {
        let payload = value.to_string();
        let ttl_seconds = self.resolve_ttl(ttl);
        let namespaced = self.namespaced(key);
        self.client
            .set_ex(&namespaced, &payload, ttl_seconds)
            .await?;
        if self.max_items.is_some() {
            self.client
                .zadd(&self.index_key, &namespaced, now_score())
                .await?;
            self.trim().await?;
        }
        Ok(())
    }

    // == Delete ==
    /// Removes the key and, when bounded, its index entry.
    pub async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let namespaced = self.namespaced(key);
        self.client.delete(&[namespaced.clone()]).await?;
        if self.max_items.is_some() {
            self.client.zrem(&self.index_key, &[namespaced]).await?;
        }
        Ok(())
    }

    // == Clear ==
    /// Deletes every key in the namespace.
    ///
    /// Bounded stores walk the recency index; unbounded stores fall back
    /// to a prefix scan.
    pub async fn clear(&self) -> Result<(), CacheError> {
        if self.max_items.is_some() {
            let keys = self.client.zrange(&self.index_key, 0, -1).await?;
            if !keys.is_empty() {
                self.client.delete(&keys).await?;
            }
            self.client.delete(&[self.index_key.clone()]).await?;
        } else {
            let pattern = format!("{}:*", self.namespace);
            let keys = self.client.scan_match(&pattern).await?;
            if !keys.is_empty() {
                self.client.delete(&keys).await?;
            }
        }
        Ok(())
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }

    fn resolve_ttl(&self, ttl: Option<u64>) -> u64 {
        match ttl {
            Some(seconds) if seconds > 0 => seconds,
            _ => self.default_ttl,
        }
    }

    // == Trim ==
    /// Deletes the oldest entries until the index is back within bound.
    ///
    /// set-then-trim is not transactional; interleaving with a concurrent
    /// trim at worst deletes an entry twice.
    async fn trim(&self) -> Result<(), CacheError> {
        let bound = match self.max_items {
            Some(bound) => bound as u64,
            None => return Ok(()),
        };
        let count = self.client.zcard(&self.index_key).await?;
        if count <= bound {
            return Ok(());
        }
        let overflow = (count - bound) as isize;
        let stale = self.client.zrange(&self.index_key, 0, overflow - 1).await?;
        if !stale.is_empty() {
            self.client.delete(&stale).await?;
            self.client.zrem(&self.index_key, &stale).await?;
        }
        Ok(())
    }
}

/// Wall-clock seconds used as the recency score in the index.
fn now_score() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}
