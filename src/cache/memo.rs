//! Memoization Module
//!
//! A composable wrapper that gives an async computation cache lookups,
//! force-refresh bypass, and explicit invalidation.

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::cache::backend::{create_cache, CacheBackend};
use crate::cache::key::make_key;
use crate::config::Config;
use crate::error::CacheError;

// == Cached Computation ==
/// Memoizes an async computation keyed by its argument bundle.
///
/// The wrapper owns the key-derivation strategy and a backend reference.
/// Without a custom key function, arguments are serialized to canonical
/// JSON (maps sort their keys) and hashed under the namespace. The
/// backend is created through the selector on first use unless one is
/// injected explicitly.
///
/// The force-refresh flag is a call parameter, not an argument, so it can
/// never leak into the derived key.
pub struct Cached<A> {
    namespace: String,
    ttl: Option<u64>,
    max_items: Option<usize>,
    key_fn: Option<Box<dyn Fn(&A) -> String + Send + Sync>>,
    backend: OnceCell<Arc<dyn CacheBackend>>,
}

impl<A: Serialize> Cached<A> {
    // == Constructor ==
    /// Creates a wrapper caching under `namespace` with selector-chosen
    /// backing and process-default TTL.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ttl: None,
            max_items: None,
            key_fn: None,
            backend: OnceCell::new(),
        }
    }

    /// Overrides the TTL written with each cached result.
    pub fn ttl(mut self, ttl_seconds: u64) -> Self {
        self.ttl = Some(ttl_seconds);
        self
    }

    /// Bounds the lazily created backend.
    pub fn max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }

    /// Replaces canonical-JSON key derivation with a custom function.
    pub fn key_fn(mut self, derive: impl Fn(&A) -> String + Send + Sync + 'static) -> Self {
        self.key_fn = Some(Box::new(derive));
        self
    }

    /// Injects an explicit backend instead of creating one lazily.
    pub fn backend(self, backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            backend: OnceCell::new_with(Some(backend)),
            ..self
        }
    }

    // == Call ==
    /// Runs the computation through the cache.
    ///
    /// With `force_refresh` false, a hit returns the cached result and the
    /// computation never runs. On a miss, or with `force_refresh` true,
    /// the computation runs and its result unconditionally overwrites the
    /// cached entry. The computation's own errors pass through unchanged;
    /// cache transport errors convert into the caller's error type.
    pub async fn call<T, E, F, Fut>(&self, args: &A, force_refresh: bool, compute: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<CacheError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let backend = self.resolve_backend().await;
        let key = self.derive_key(args);

        if !force_refresh {
            if let Some(key) = &key {
                if let Some(cached) = backend.get(key).await.map_err(E::from)? {
                    match serde_json::from_value::<T>(cached) {
                        Ok(hit) => return Ok(hit),
                        Err(err) => {
                            debug!(namespace = %self.namespace, error = %err,
                                "cached value failed to decode; recomputing");
                        }
                    }
                }
            }
        }

        let result = compute().await?;

        if let Some(key) = &key {
            match serde_json::to_value(&result) {
                Ok(value) => backend.set(key, &value, self.ttl).await.map_err(E::from)?,
                Err(err) => {
                    warn!(namespace = %self.namespace, error = %err,
                        "result is not cacheable; skipping write");
                }
            }
        }
        Ok(result)
    }

    // == Invalidate ==
    /// Derives the key for `args` and deletes it, for callers that need
    /// cache-busting outside the read path.
    pub async fn invalidate(&self, args: &A) -> Result<(), CacheError> {
        match self.derive_key(args) {
            Some(key) => self.resolve_backend().await.delete(&key).await,
            None => Ok(()),
        }
    }

    async fn resolve_backend(&self) -> Arc<dyn CacheBackend> {
        self.backend
            .get_or_init(|| async {
                let ttl = self.ttl.unwrap_or(Config::global().cache_ttl_seconds);
                create_cache(&self.namespace, ttl, self.max_items).await
            })
            .await
            .clone()
    }

    /// Key for `args`: the custom function when supplied, otherwise the
    /// canonical JSON form hashed under the namespace. `None` only when
    /// the arguments cannot be serialized, in which case caching is
    /// skipped for the call.
    pub(crate) fn derive_key(&self, args: &A) -> Option<String> {
        if let Some(derive) = &self.key_fn {
            return Some(derive(args));
        }
        match serde_json::to_value(args) {
            Ok(value) => Some(make_key(&self.namespace, &[value.to_string()])),
            Err(err) => {
                warn!(namespace = %self.namespace, error = %err,
                    "arguments are not serializable; call will not be cached");
                None
            }
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::LocalCache;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Serialize)]
    struct Args {
        value: i64,
    }

    fn local_backend() -> Arc<dyn CacheBackend> {
        Arc::new(LocalCache::new(60, 32))
    }

    #[tokio::test]
    async fn test_hit_skips_computation() {
        let cached: Cached<Args> = Cached::new("memo.hit").backend(local_backend());
        let calls = AtomicUsize::new(0);

        let compute = |value: i64| {
            let calls = &calls;
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<i64, CacheError>(value * 2)
            }
        };

        let first = cached
            .call(&Args { value: 5 }, false, || compute(5))
            .await
            .unwrap();
        let second = cached
            .call(&Args { value: 5 }, false, || compute(5))
            .await
            .unwrap();

        assert_eq!(first, 10);
        assert_eq!(second, 10);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_force_refresh_recomputes_and_overwrites() {
        let backend = local_backend();
        let cached: Cached<Args> = Cached::new("memo.refresh").backend(Arc::clone(&backend));
        let calls = AtomicUsize::new(0);

        for (force, expected_calls) in [(false, 1), (false, 1), (true, 2)] {
            let result: i64 = cached
                .call(&Args { value: 7 }, force, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<i64, CacheError>(14)
                })
                .await
                .unwrap();
            assert_eq!(result, 14);
            assert_eq!(calls.load(Ordering::SeqCst), expected_calls);
        }
    }

    #[tokio::test]
    async fn test_distinct_args_compute_separately() {
        let cached: Cached<Args> = Cached::new("memo.distinct").backend(local_backend());
        let calls = AtomicUsize::new(0);

        for value in [1, 2, 1] {
            let _: i64 = cached
                .call(&Args { value }, false, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<i64, CacheError>(value)
                })
                .await
                .unwrap();
        }

        // Third call repeats value=1 and hits.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_next_call_to_compute() {
        let cached: Cached<Args> = Cached::new("memo.invalidate").backend(local_backend());
        let calls = AtomicUsize::new(0);

        let run = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<i64, CacheError>(42)
        };

        let _: i64 = cached.call(&Args { value: 1 }, false, run).await.unwrap();
        cached.invalidate(&Args { value: 1 }).await.unwrap();
        let _: i64 = cached.call(&Args { value: 1 }, false, run).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_custom_key_fn_normalizes_arguments() {
        #[derive(Serialize)]
        struct Query {
            text: String,
        }

        let cached: Cached<Query> = Cached::new("memo.custom")
            .backend(local_backend())
            .key_fn(|args: &Query| {
                let normalized = args.text.split_whitespace().collect::<Vec<_>>().join(" ");
                make_key("memo.custom", &[normalized])
            });
        let calls = AtomicUsize::new(0);

        let run = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<bool, CacheError>(true)
        };

        let loose = Query {
            text: "  spaced   out  query ".to_string(),
        };
        let tight = Query {
            text: "spaced out query".to_string(),
        };

        let _ = cached.call(&loose, false, run).await.unwrap();
        let _ = cached.call(&tight, false, run).await.unwrap();

        // Whitespace-only differences collapse onto one key.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_structured_results_round_trip() {
        #[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
        struct Payload {
            items: Vec<String>,
            total: u32,
        }

        let cached: Cached<Args> = Cached::new("memo.structured").backend(local_backend());
        let payload = Payload {
            items: vec!["a".to_string(), "b".to_string()],
            total: 2,
        };

        let first: Payload = cached
            .call(&Args { value: 9 }, false, || {
                let payload = payload.clone();
                async move { Ok::<Payload, CacheError>(payload) }
            })
            .await
            .unwrap();
        let second: Payload = cached
            .call::<Payload, CacheError, _, _>(&Args { value: 9 }, false, || async {
                panic!("cached call must not recompute")
            })
            .await
            .unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_computation_error_passes_through() {
        let cached: Cached<Args> = Cached::new("memo.error").backend(local_backend());

        let result: Result<i64, String> = cached
            .call(&Args { value: 3 }, false, || async {
                Err::<i64, String>("upstream exploded".to_string())
            })
            .await;

        assert_eq!(result.unwrap_err(), "upstream exploded");
    }

    #[tokio::test]
    async fn test_failed_computation_is_not_cached() {
        let cached: Cached<Args> = Cached::new("memo.error-miss").backend(local_backend());
        let calls = AtomicUsize::new(0);

        let _ = cached
            .call(&Args { value: 3 }, false, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<i64, String>("try again".to_string())
            })
            .await;
        let ok: i64 = cached
            .call(&Args { value: 3 }, false, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<i64, String>(6)
            })
            .await
            .unwrap();

        assert_eq!(ok, 6);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_canonical_key_is_stable_across_instances() {
        // Two wrappers over one backend derive identical keys for equal
        // argument values.
        let backend = local_backend();
        let first: Cached<Args> = Cached::new("memo.shared").backend(Arc::clone(&backend));
        let second: Cached<Args> = Cached::new("memo.shared").backend(Arc::clone(&backend));
        let calls = AtomicUsize::new(0);

        let _: i64 = first
            .call(&Args { value: 11 }, false, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<i64, CacheError>(22)
            })
            .await
            .unwrap();
        let hit: i64 = second
            .call(&Args { value: 11 }, false, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<i64, CacheError>(0)
            })
            .await
            .unwrap();

        assert_eq!(hit, 22);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_backend_write_visible_through_raw_contract() {
        let backend = local_backend();
        let cached: Cached<Args> = Cached::new("memo.raw").backend(Arc::clone(&backend));

        let _: i64 = cached
            .call(&Args { value: 2 }, false, || async {
                Ok::<i64, CacheError>(4)
            })
            .await
            .unwrap();

        let key = cached.derive_key(&Args { value: 2 }).unwrap();
        assert_eq!(backend.get(&key).await.unwrap(), Some(json!(4)));
    }

    #[test]
    fn test_string_error_from_cache_error() {
        // The test error types above rely on this conversion.
        let err = redis::RedisError::from((redis::ErrorKind::IoError, "down"));
        let s = String::from(CacheError::Transport(err).to_string());
        assert!(s.contains("down"));
    }
}
