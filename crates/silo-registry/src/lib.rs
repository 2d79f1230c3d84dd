//! npm registry client and packument cache for Silo
//!
//! This crate builds authenticated requests against a configured registry
//! (with scope-based fallback to the public default), and caches each
//! package's full version listing with per-key mutual exclusion so
//! concurrent identical lookups collapse into one network call.

pub mod api;
pub mod client;
pub mod packument;

// Re-export main types
pub use api::{Dist, Packument, PackumentVersion};
pub use client::{AuthConfig, RegistryClient, RegistryOptions};
pub use packument::PackumentCache;

use silo_core::error::SiloError;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, SiloError>;
