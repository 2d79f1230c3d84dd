//! Key-value cache store with TTL support.
//!
//! The gateway treats the cache as an injected abstraction: `get` returns
//! the stored bytes or a NotFound/Expired miss, `set` stores bytes under a
//! per-entry TTL. Backend failures other than a miss must never fail a
//! resolution, so the read helpers here log and downgrade them to misses.

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use std::time::{Duration, SystemTime};
use thiserror::Error;
use tracing::warn;

/// Cache store access errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("cache entry not found")]
    NotFound,

    #[error("cache entry expired")]
    Expired,

    #[error("cache backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// A miss is the expected no-data outcome; anything else is a backend
    /// fault worth logging
    pub fn is_miss(&self) -> bool {
        matches!(self, StoreError::NotFound | StoreError::Expired)
    }
}

/// Injected key-value cache abstraction
pub trait CacheStore: Send + Sync {
    /// Get the bytes stored under `key`, if present and fresh
    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Store `value` under `key` for `ttl`
    fn set(&self, key: &str, value: Vec<u8>, ttl: Duration);
}

/// Cache entry with TTL
#[derive(Debug, Clone)]
struct StoreEntry {
    data: Vec<u8>,
    stored_at: SystemTime,
    ttl: Duration,
}

impl StoreEntry {
    /// Check if the entry is still fresh
    fn is_fresh(&self) -> bool {
        match self.stored_at.elapsed() {
            Ok(elapsed) => elapsed < self.ttl,
            Err(_) => false, // clock went backwards, consider stale
        }
    }
}

/// In-memory cache store
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, StoreEntry>,
}

impl MemoryCache {
    /// Create an empty in-memory cache
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Number of entries currently held, fresh or stale
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        if let Some(entry) = self.entries.get(key) {
            if entry.is_fresh() {
                return Ok(entry.data.clone());
            }
        } else {
            return Err(StoreError::NotFound);
        }
        // the read guard is released before evicting; a concurrent set may
        // have refreshed the entry in between, so re-check staleness
        self.entries.remove_if(key, |_, entry| !entry.is_fresh());
        Err(StoreError::Expired)
    }

    fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) {
        self.entries.insert(
            key.to_string(),
            StoreEntry {
                data: value,
                stored_at: SystemTime::now(),
                ttl,
            },
        );
    }
}

/// Read raw bytes from the store, downgrading backend faults to a miss
pub fn get_bytes(store: &dyn CacheStore, key: &str) -> Option<Vec<u8>> {
    match store.get(key) {
        Ok(bytes) => Some(bytes),
        Err(e) if e.is_miss() => None,
        Err(e) => {
            warn!(key, error = %e, "cache read failed, treating as miss");
            None
        }
    }
}

/// Read and deserialize a JSON value from the store; decode failures are
/// also treated as a miss so stale shapes get refetched
pub fn get_json<T: DeserializeOwned>(store: &dyn CacheStore, key: &str) -> Option<T> {
    let bytes = get_bytes(store, key)?;
    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "cached bytes failed to decode, treating as miss");
            None
        }
    }
}
