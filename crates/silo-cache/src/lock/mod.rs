//! Keyed mutual-exclusion tables.
//!
//! A `LockTable` maps cache keys to async mutexes, created lazily and never
//! removed, so the table is bounded by the number of distinct keys ever
//! requested in the process lifetime. The locks are held across network
//! calls and subprocess invocations deliberately: their purpose is to
//! collapse duplicate concurrent work for the same key, not to protect an
//! in-memory structure. Late arrivals block, then observe the cache
//! populated by the winner.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Process-lifetime table of per-key async locks
#[derive(Debug, Default)]
pub struct LockTable {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl LockTable {
    /// Create an empty lock table
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Get the lock for `key`, creating it on first use.
    ///
    /// The returned handle outlives the table entry's map guard, so callers
    /// can hold the mutex across await points without touching the map.
    pub fn lock_for(&self, key: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Number of distinct keys ever locked
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Check whether any key has been locked yet
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
