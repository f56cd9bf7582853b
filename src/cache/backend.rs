//! Cache Backend Module
//!
//! The backend contract shared by the local and remote stores, the
//! selector that picks one per namespace, and the process-wide registry
//! used for bulk invalidation.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::warn;

use crate::cache::client::RedisKeyValueClient;
use crate::cache::{LocalCache, RemoteCache};
use crate::config::Config;
use crate::error::CacheError;

// == Backend Contract ==
/// The four-operation contract every cache backend satisfies.
///
/// Local and remote stores are mutually substitutable behind this trait;
/// callers cannot tell which one the selector handed them.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Looks up a key. `Ok(None)` means "not cached", which is distinct
    /// from a cached JSON null (`Ok(Some(Value::Null))`).
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError>;

    /// Stores a value; a missing or non-positive TTL falls back to the
    /// backend default.
    async fn set(&self, key: &str, value: &Value, ttl: Option<u64>) -> Result<(), CacheError>;

    /// Removes a key; unknown keys are a no-op.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Removes every key the backend owns.
    async fn clear(&self) -> Result<(), CacheError>;

    /// TTL applied when `set` receives none.
    fn default_ttl(&self) -> u64;

    /// Entry bound, if one is configured.
    fn max_items(&self) -> Option<usize>;
}

#[async_trait]
impl CacheBackend for LocalCache {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        Ok(LocalCache::get(self, key).await)
    }

    async fn set(&self, key: &str, value: &Value, ttl: Option<u64>) -> Result<(), CacheError> {
        LocalCache::set(self, key, value.clone(), ttl).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        LocalCache::delete(self, key).await;
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        LocalCache::clear(self).await;
        Ok(())
    }

    fn default_ttl(&self) -> u64 {
        LocalCache::default_ttl(self)
    }

    fn max_items(&self) -> Option<usize> {
        Some(LocalCache::max_items(self))
    }
}

#[async_trait]
impl CacheBackend for RemoteCache {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        RemoteCache::get(self, key).await
    }

    async fn set(&self, key: &str, value: &Value, ttl: Option<u64>) -> Result<(), CacheError> {
        RemoteCache::set(self, key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        RemoteCache::delete(self, key).await
    }

    async fn clear(&self) -> Result<(), CacheError> {
        RemoteCache::clear(self).await
    }

    fn default_ttl(&self) -> u64 {
        RemoteCache::default_ttl(self)
    }

    fn max_items(&self) -> Option<usize> {
        RemoteCache::max_items(self)
    }
}

// == Process-Wide State ==

/// Every backend ever created by the selector, in creation order.
/// Append-only for the process lifetime; consumed by bulk clears.
static REGISTRY: Lazy<Mutex<Vec<Arc<dyn CacheBackend>>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// The distributed client handle, established at most once. `Some(None)`
/// after a failed attempt so later backends do not retry the connection.
static REDIS_CLIENT: OnceCell<Option<Arc<RedisKeyValueClient>>> = OnceCell::const_new();

// == Backend Selector ==
/// Creates a cache backend for `namespace` and registers it for bulk
/// invalidation.
///
/// Returns a remote backend when distributed caching is enabled in the
/// process configuration and a client can be established; otherwise (or
/// when establishment fails) a local store, transparently to the caller.
pub async fn create_cache(
    namespace: &str,
    ttl: u64,
    max_items: Option<usize>,
) -> Arc<dyn CacheBackend> {
    let config = Config::global();
    let backend: Arc<dyn CacheBackend> = match ensure_redis_client().await {
        Some(client) => Arc::new(RemoteCache::new(client, namespace, ttl, max_items)),
        None => Arc::new(LocalCache::new(
            ttl,
            max_items.unwrap_or(config.cache_max_items),
        )),
    };

    REGISTRY
        .lock()
        .expect("cache registry lock poisoned")
        .push(Arc::clone(&backend));
    backend
}

// == Bulk Clear ==
/// Clears every registered backend.
///
/// A failure clearing one backend is logged and does not stop the sweep.
pub async fn clear_registered_caches() {
    let backends: Vec<Arc<dyn CacheBackend>> = REGISTRY
        .lock()
        .expect("cache registry lock poisoned")
        .clone();
    for backend in backends {
        if let Err(err) = backend.clear().await {
            warn!(error = %err, "failed to clear cache backend");
        }
    }
}

// == Redis Availability ==
/// Whether distributed caching is configured and the client handle is
/// live. Used by the readiness probe.
pub async fn redis_available() -> bool {
    redis_enabled(Config::global()) && ensure_redis_client().await.is_some()
}

fn redis_enabled(config: &Config) -> bool {
    config.use_redis && config.redis_url.is_some()
}

/// Establishes the distributed client once per process.
///
/// The first call attempts the connection; every later call reuses the
/// outcome. A failed attempt logs a warning and pins the fallback.
async fn ensure_redis_client() -> Option<Arc<RedisKeyValueClient>> {
    REDIS_CLIENT
        .get_or_init(|| async {
            let config = Config::global();
            if !redis_enabled(config) {
                return None;
            }
            let url = config.redis_url.as_deref().unwrap_or_default();
            match RedisKeyValueClient::connect(url).await {
                Ok(client) => Some(Arc::new(client)),
                Err(err) => {
                    warn!(
                        error = %err,
                        "redis requested but unreachable; falling back to in-process cache"
                    );
                    None
                }
            }
        })
        .await
        .clone()
}

/// Drops every registered backend so a test can assert registration
/// behavior in isolation.
#[cfg(test)]
pub(crate) fn reset_registry_for_tests() {
    REGISTRY
        .lock()
        .expect("cache registry lock poisoned")
        .clear();
}

#[cfg(test)]
pub(crate) fn registered_backend_count() -> usize {
    REGISTRY
        .lock()
        .expect("cache registry lock poisoned")
        .len()
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // The registry is process state shared by every test in the binary;
    // tests that reset it or sweep it serialize on this lock so they do
    // not clobber each other's backends mid-assertion.
    static REGISTRY_TEST_LOCK: Mutex<()> = Mutex::new(());

    #[tokio::test]
    async fn test_create_cache_falls_back_to_local_without_redis() {
        // The default test environment has USE_REDIS unset.
        let backend = create_cache("unit-fallback", 60, Some(16)).await;

        backend.set("key", &json!("value"), None).await.unwrap();
        assert_eq!(backend.get("key").await.unwrap(), Some(json!("value")));
        assert_eq!(backend.default_ttl(), 60);
        assert_eq!(backend.max_items(), Some(16));
    }

    #[tokio::test]
    async fn test_create_cache_registers_backend() {
        let _guard = REGISTRY_TEST_LOCK.lock().expect("test lock poisoned");
        reset_registry_for_tests();

        let _a = create_cache("unit-reg-a", 60, None).await;
        let _b = create_cache("unit-reg-b", 60, Some(8)).await;

        // Other tests may register backends concurrently; the registry is
        // append-only, so at least our two must be present.
        assert!(registered_backend_count() >= 2);
    }

    #[tokio::test]
    async fn test_clear_registered_caches_empties_every_backend() {
        let _guard = REGISTRY_TEST_LOCK.lock().expect("test lock poisoned");
        let first = create_cache("unit-clear-a", 60, Some(8)).await;
        let second = create_cache("unit-clear-b", 60, Some(8)).await;

        first.set("k1", &json!(1), None).await.unwrap();
        second.set("k2", &json!(2), None).await.unwrap();

        clear_registered_caches().await;

        assert_eq!(first.get("k1").await.unwrap(), None);
        assert_eq!(second.get("k2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unbounded_local_fallback_uses_process_default() {
        let backend = create_cache("unit-default-size", 60, None).await;

        // Local stores always carry a bound; without an explicit one the
        // process-wide default applies.
        assert_eq!(backend.max_items(), Some(Config::global().cache_max_items));
    }

    #[tokio::test]
    async fn test_backend_contract_null_vs_absent() {
        let backend = create_cache("unit-null", 60, Some(8)).await;

        backend.set("nullable", &Value::Null, None).await.unwrap();

        assert_eq!(backend.get("nullable").await.unwrap(), Some(Value::Null));
        assert_eq!(backend.get("missing").await.unwrap(), None);
    }
}
