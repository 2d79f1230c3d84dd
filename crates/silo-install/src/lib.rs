//! Local package materialization for Silo
//!
//! This crate drives an external package-installation tool (`pnpm`) to
//! place a resolved package on local disk for downstream consumers. Each
//! `name@version` is installed under its own lock so at most one installer
//! subprocess ever targets the same package-version, with bounded retry
//! around the subprocess invocation.

pub mod orchestrator;
pub mod process;

// Re-export main types
pub use orchestrator::{InstallOrchestrator, InstallOptions, InstallRequest, Provenance};
pub use process::{ProcessOutput, ProcessRunner, TokioRunner};

use silo_core::error::SiloError;

/// Result type for install operations
pub type InstallResult<T> = Result<T, SiloError>;
