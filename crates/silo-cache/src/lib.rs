//! Cache store, keyed locks, and tarball extraction for Silo
//!
//! This crate provides the injected key-value cache abstraction the
//! gateway resolves through, the per-key mutual-exclusion tables that
//! collapse duplicate concurrent work, and gzip+tar extraction for
//! tarball-fallback manifest recovery.

pub mod lock;
pub mod store;
pub mod tarball;

// Re-export main types
pub use lock::LockTable;
pub use store::{get_bytes, get_json, CacheStore, MemoryCache, StoreError};
pub use tarball::extract_tarball;

use silo_core::error::SiloError;

/// Result type for cache operations
pub type CacheResult<T> = Result<T, SiloError>;
