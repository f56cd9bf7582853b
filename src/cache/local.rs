//! Local Cache Module
//!
//! In-process cache backend combining TTL expiry with LRU eviction.

use std::collections::HashMap;

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::cache::{CacheStats, Entry, RecencyList};

// == Inner State ==
/// Everything guarded by the store lock.
#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, Entry>,
    recency: RecencyList,
    stats: CacheStats,
}

impl Inner {
    /// Drops every entry whose TTL has elapsed.
    ///
    /// Expiry is swept lazily at the head of each lookup and write; there
    /// is no background timer.
    fn purge_expired(&mut self) {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();
        for key in expired {
            self.entries.remove(&key);
            self.recency.remove(&key);
        }
    }
}

// == Local Cache ==
/// In-process store with TTL expiry and LRU eviction.
///
/// All four operations serialize on a single store-wide lock; once the
/// lock is held the operation runs to completion without awaiting, so each
/// call is atomic relative to every other call on the same store.
#[derive(Debug)]
pub struct LocalCache {
    default_ttl: u64,
    max_items: usize,
    inner: Mutex<Inner>,
}

impl LocalCache {
    // == Constructor ==
    /// Creates a store with the given default TTL (seconds) and entry bound.
    ///
    /// Both parameters are floored to 1 and fixed for the store's lifetime.
    pub fn new(default_ttl: u64, max_items: usize) -> Self {
        Self {
            default_ttl: default_ttl.max(1),
            max_items: max_items.max(1),
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Default TTL applied when `set` receives no positive TTL.
    pub fn default_ttl(&self) -> u64 {
        self.default_ttl
    }

    /// Maximum number of resident entries.
    pub fn max_items(&self) -> usize {
        self.max_items
    }

    // == Get ==
    /// Looks up a key, returning a deep copy of the stored value.
    ///
    /// Expired entries are purged first and count as absent. A hit bumps
    /// the entry's hit counter and marks it most recently used. The
    /// returned `None` is distinct from a cached JSON null, which comes
    /// back as `Some(Value::Null)`.
    pub async fn get(&self, key: &str) -> Option<Value> {
        let mut inner = self.inner.lock().await;
        inner.purge_expired();
        match inner.entries.get_mut(key) {
            Some(entry) => {
                entry.hits += 1;
                let value = entry.value.clone();
                inner.recency.touch(key);
                inner.stats.record_hit();
                let count = inner.entries.len();
                inner.stats.set_entries(count);
                Some(value)
            }
            None => {
                inner.stats.record_miss();
                None
            }
        }
    }

    // == Set ==
    /// Stores a deep copy of `value` under `key`.
    ///
    /// A missing or non-positive `ttl` falls back to the store default, so
    /// zero never means "immediately expired" or "forever". After the
    /// insert, least-recently-used entries are evicted until the store is
    /// back within its bound.
    pub async fn set(&self, key: &str, value: Value, ttl: Option<u64>) {
        let ttl_seconds = self.resolve_ttl(ttl);
        let entry = Entry::new(value, ttl_seconds);
        let mut inner = self.inner.lock().await;
        inner.purge_expired();
        inner.entries.insert(key.to_string(), entry);
        inner.recency.touch(key);
        while inner.entries.len() > self.max_items {
            if let Some(evicted) = inner.recency.pop_oldest() {
                inner.entries.remove(&evicted);
                inner.stats.record_eviction();
                debug!(key = %evicted, "cache LRU eviction");
            } else {
                break;
            }
        }
        let count = inner.entries.len();
        inner.stats.set_entries(count);
    }

    // == Delete ==
    /// Removes a key if present; unknown keys are a no-op.
    pub async fn delete(&self, key: &str) {
        let mut inner = self.inner.lock().await;
        inner.entries.remove(key);
        inner.recency.remove(key);
        let count = inner.entries.len();
        inner.stats.set_entries(count);
    }

    // == Clear ==
    /// Empties the store in one atomic step.
    pub async fn clear(&self) {
        let mut inner = self.inner.lock().await;
        inner.entries.clear();
        inner.recency.clear();
        inner.stats.set_entries(0);
    }

    // == Stats ==
    /// Snapshot of the store's observational counters.
    pub async fn stats(&self) -> CacheStats {
        let inner = self.inner.lock().await;
        let mut stats = inner.stats.clone();
        stats.set_entries(inner.entries.len());
        stats
    }

    /// Current number of resident entries (expired entries included until
    /// the next sweep).
    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    fn resolve_ttl(&self, ttl: Option<u64>) -> u64 {
        match ttl {
            Some(seconds) if seconds > 0 => seconds,
            _ => self.default_ttl,
        }
    }
}
