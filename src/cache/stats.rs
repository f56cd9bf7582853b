//! Cache Statistics Module
//!
//! Observational counters for the in-process cache backend.

use serde::Serialize;

// == Cache Stats ==
/// Hit/miss/eviction counters for one local store.
///
/// Purely observational: nothing in the eviction or expiry logic reads
/// these numbers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Lookups that returned a live entry
    pub hits: u64,
    /// Lookups that found nothing (absent or expired)
    pub misses: u64,
    /// Entries removed by the LRU bound
    pub evictions: u64,
    /// Entries currently resident
    pub entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates stats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// hits / (hits + misses), or 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Increments the eviction counter.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Updates the resident entry count.
    pub fn set_entries(&mut self, count: usize) {
        self.entries = count;
    }
}
