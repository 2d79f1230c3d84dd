//! Error types and result aliases for Silo operations.
//!
//! Provides a unified error type that covers all error conditions
//! across the Silo gateway with package identity context attached.

use thiserror::Error;

/// Unified error type for all Silo operations
#[derive(Error, Debug)]
pub enum SiloError {
    // Resolution errors
    #[error("package '{name}' not found in registry")]
    PackageNotFound { name: String },

    #[error("version {version} of '{name}' not found")]
    VersionNotFound { name: String, version: String },

    #[error("'{constraint}' is not a valid version range")]
    InvalidConstraint { constraint: String },

    #[error("'{version}' is not a valid version")]
    InvalidVersion { version: String },

    #[error("no published version satisfies '{constraint}'")]
    NoMatchingVersion { constraint: String },

    // Registry errors
    #[error("registry error: {message}")]
    Registry {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("tarball recovery failed for {package}: {message}")]
    TarballRecovery { package: String, message: String },

    // Install errors
    #[error("install failed for {package}: {message}")]
    Install { package: String, message: String },

    // Decode errors
    #[error("failed to parse JSON: {message}")]
    Json { message: String },

    // Config errors
    #[error("configuration field '{field}' is invalid: {reason}")]
    ConfigValidation { field: String, reason: String },

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for Silo operations
pub type SiloResult<T> = Result<T, SiloError>;

impl SiloError {
    /// Create a registry error from any error type
    pub fn registry<E>(message: String, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Registry {
            message,
            source: Some(Box::new(source)),
        }
    }

    /// Create a registry error with no underlying cause
    pub fn registry_message(message: String) -> Self {
        Self::Registry {
            message,
            source: None,
        }
    }

    /// Create an IO error from std::io::Error
    pub fn io(message: String, source: std::io::Error) -> Self {
        Self::Io { message, source }
    }

    /// Create a JSON decode error
    pub fn json(source: serde_json::Error) -> Self {
        Self::Json {
            message: source.to_string(),
        }
    }

    /// Check if this error means the package or version is absent upstream
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SiloError::PackageNotFound { .. } | SiloError::VersionNotFound { .. }
        )
    }
}
