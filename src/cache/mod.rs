//! Cache Module
//!
//! Generic async memoization with interchangeable in-process and
//! distributed backends: TTL expiry and LRU eviction locally, namespaced
//! keys with an optional recency index remotely, plus key derivation and
//! a memoizing wrapper shared by both.

mod backend;
mod client;
mod entry;
mod key;
mod local;
mod memo;
mod recency;
mod remote;
mod stats;


// Re-export public types
pub use backend::{clear_registered_caches, create_cache, redis_available, CacheBackend};
pub use client::{KeyValueClient, RedisKeyValueClient};
pub use entry::Entry;
pub use key::make_key;
pub use local::LocalCache;
pub use memo::Cached;
pub use recency::RecencyList;
pub use remote::RemoteCache;
pub use stats::CacheStats;
