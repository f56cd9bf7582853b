//! Cache Entry Module
//!
//! Defines the value holder stored by the in-process cache backend.

use std::time::{Duration, Instant};

use serde_json::Value;

// == Cache Entry ==
/// A single cached value with its expiry instant and access count.
#[derive(Debug, Clone)]
pub struct Entry {
    /// The stored payload (already a deep copy of the caller's value)
    pub value: Value,
    /// Absolute monotonic instant after which the entry is dead
    pub expires_at: Instant,
    /// Number of times the entry has been returned by a lookup
    pub hits: u64,
}

impl Entry {
    // == Constructor ==
    /// Creates an entry expiring `ttl_seconds` from now.
    pub fn new(value: Value, ttl_seconds: u64) -> Self {
        Self {
            value,
            expires_at: Instant::now() + Duration::from_secs(ttl_seconds),
            hits: 0,
        }
    }

    // == Is Expired ==
    /// Checks whether the entry's TTL has elapsed.
    ///
    /// An entry is expired once the current instant has reached
    /// `expires_at`; lookups treat expired entries as absent.
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    // == Time To Live ==
    /// Remaining lifetime, or zero when already expired.
    ///
    /// Used for debug logging and assertions; eviction never consults it.
    pub fn ttl_remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}
