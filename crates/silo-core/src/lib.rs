//! # silo-core
//!
//! Core types and utilities shared across all Silo crates.
//!
//! This crate provides:
//! - NameVersion for normalized package specifiers
//! - PackageManifest, the normalized package.json view
//! - SiloError enum for unified error handling
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `types`: Core data types (NameVersion, PackageManifest, etc.)
//! - `error`: Error types and result aliases

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{SiloError, SiloResult};
pub use types::{NameVersion, PackageManifest};
