//! Version matching and manifest resolution for Silo
//!
//! This crate turns a (name, version-specifier) pair into the normalized
//! manifest of one concrete, immutable version. Specifiers may be exact
//! versions, dist-tags, or semver ranges; when the registry's metadata
//! endpoint cannot serve a version's manifest, it is recovered by
//! downloading and unpacking the version's published tarball.

pub mod manifest;
pub mod matcher;

// Re-export main types
pub use manifest::{ManifestResolver, ResolverOptions, NODE_TYPES_VERSION};
pub use matcher::find_best_version;

use silo_core::error::SiloError;

/// Result type for resolver operations
pub type ResolverResult<T> = Result<T, SiloError>;
