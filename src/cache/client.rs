//! Key-Value Client Module
//!
//! Capability trait required of a distributed cache backend, plus the
//! redis implementation used in production.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use crate::error::CacheError;

// == Client Capability Trait ==
/// The operations the remote store needs from a distributed client.
///
/// Each method maps onto one remote call and is individually atomic;
/// nothing here provides multi-call transactions. Transport failures
/// propagate as [`CacheError::Transport`].
#[async_trait]
pub trait KeyValueClient: Send + Sync {
    /// Reads the text value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Writes `value` under `key` with a relative expiry in seconds.
    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), CacheError>;

    /// Deletes the given keys; unknown keys are ignored.
    async fn delete(&self, keys: &[String]) -> Result<(), CacheError>;

    /// Adds or rescores `member` in the sorted set at `key`.
    async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<(), CacheError>;

    /// Returns members of the sorted set by ascending score rank.
    async fn zrange(&self, key: &str, start: isize, stop: isize)
        -> Result<Vec<String>, CacheError>;

    /// Removes members from the sorted set at `key`.
    async fn zrem(&self, key: &str, members: &[String]) -> Result<(), CacheError>;

    /// Cardinality of the sorted set at `key`.
    async fn zcard(&self, key: &str) -> Result<u64, CacheError>;

    /// All keys matching a glob pattern (used for unbounded clears).
    async fn scan_match(&self, pattern: &str) -> Result<Vec<String>, CacheError>;
}

// == Redis Client ==
/// Redis-backed [`KeyValueClient`] over a shared connection manager.
///
/// The manager multiplexes one connection and reconnects on failure;
/// cloning it per call is the intended usage.
pub struct RedisKeyValueClient {
    manager: ConnectionManager,
}

impl RedisKeyValueClient {
    // == Connect ==
    /// Opens a client for `url` and establishes the managed connection.
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = Client::open(url).map_err(CacheError::Transport)?;
        let manager = ConnectionManager::new(client)
            .await
            .map_err(CacheError::Transport)?;
        Ok(Self { manager })
    }
}

#[async_trait]
impl KeyValueClient for RedisKeyValueClient {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.manager.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        let _: () = conn.set_ex(key, value, ttl_seconds).await?;
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<(), CacheError> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut conn = self.manager.clone();
        let _: () = conn.del(keys).await?;
        Ok(())
    }

    async fn zadd(&self, key: &str, member: &str, score: f64) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        let _: () = conn.zadd(key, member, score).await?;
        Ok(())
    }

    async fn zrange(
        &self,
        key: &str,
        start: isize,
        stop: isize,
    ) -> Result<Vec<String>, CacheError> {
        let mut conn = self.manager.clone();
        let members: Vec<String> = conn.zrange(key, start, stop).await?;
        Ok(members)
    }

    async fn zrem(&self, key: &str, members: &[String]) -> Result<(), CacheError> {
        if members.is_empty() {
            return Ok(());
        }
        let mut conn = self.manager.clone();
        let _: () = conn.zrem(key, members).await?;
        Ok(())
    }

    async fn zcard(&self, key: &str) -> Result<u64, CacheError> {
        let mut conn = self.manager.clone();
        let count: u64 = conn.zcard(key).await?;
        Ok(count)
    }

    async fn scan_match(&self, pattern: &str) -> Result<Vec<String>, CacheError> {
        let mut conn = self.manager.clone();
        let mut keys = Vec::new();
        let mut iter = conn.scan_match::<_, String>(pattern).await?;
        while let Some(key) = iter.next_item().await {
            keys.push(key);
        }
        Ok(keys)
    }
}
