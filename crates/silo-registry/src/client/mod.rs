//! HTTP client for registry lookups.
//!
//! One shared pooled client serves every lookup: fixed connect and request
//! timeouts, idle-connection reuse, gzip. URL construction is scope-aware:
//! when a registry scope is configured, names outside that scope fall back
//! to the public default registry, which lets a single private registry be
//! configured without losing access to public packages.

use reqwest::{Client, ClientBuilder, Response};
use std::time::Duration;
use tracing::debug;

use silo_core::error::SiloError;

use crate::RegistryResult;

/// The public default registry used for out-of-scope names
pub const PUBLIC_REGISTRY: &str = "https://registry.npmjs.org/";

/// Authentication configuration for registry access
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    /// Bearer token for authentication
    pub token: Option<String>,
    /// Basic auth username
    pub user: Option<String>,
    /// Basic auth password
    pub password: Option<String>,
}

/// Options for constructing a [`RegistryClient`]
#[derive(Debug, Clone)]
pub struct RegistryOptions {
    /// Registry root URL, slash-terminated
    pub registry: String,
    /// Scope the configured registry is authoritative for
    pub scope: Option<String>,
    /// Credentials for the configured registry
    pub auth: AuthConfig,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            registry: PUBLIC_REGISTRY.to_string(),
            scope: None,
            auth: AuthConfig::default(),
        }
    }
}

/// HTTP client for registry operations
#[derive(Debug, Clone)]
pub struct RegistryClient {
    /// Underlying HTTP client with connection pooling
    http: Client,
    /// Registry root URL
    registry: String,
    /// Scope the configured registry serves
    scope: Option<String>,
    /// Registry credentials
    auth: AuthConfig,
}

impl RegistryClient {
    /// Create a registry client against the public default registry
    pub fn new() -> RegistryResult<Self> {
        Self::with_options(RegistryOptions::default())
    }

    /// Create a registry client with explicit options
    pub fn with_options(options: RegistryOptions) -> RegistryResult<Self> {
        let http = ClientBuilder::new()
            .pool_max_idle_per_host(50)
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .gzip(true)
            .user_agent("silo/0.1.0")
            .build()
            .map_err(|e| SiloError::registry("failed to create HTTP client".to_string(), e))?;

        let mut registry = options.registry;
        if !registry.ends_with('/') {
            registry.push('/');
        }

        Ok(Self {
            http,
            registry,
            scope: options.scope,
            auth: options.auth,
        })
    }

    /// Build the metadata URL for a package, optionally version-suffixed.
    ///
    /// An empty version yields the packument URL.
    pub fn package_url(&self, name: &str, version: &str) -> String {
        let base = match &self.scope {
            Some(scope) if !name.starts_with(scope.as_str()) => PUBLIC_REGISTRY,
            _ => self.registry.as_str(),
        };
        let mut url = format!("{}{}", base, name);
        if !version.is_empty() {
            url.push('/');
            url.push_str(version);
        }
        debug!(name, version, url, "registry url");
        url
    }

    /// Perform an authenticated GET: bearer token when configured,
    /// otherwise basic auth, otherwise a bare request
    pub async fn get(&self, url: &str) -> RegistryResult<Response> {
        let mut request = self.http.get(url);
        if let Some(token) = &self.auth.token {
            request = request.bearer_auth(token);
        } else if let (Some(user), Some(password)) = (&self.auth.user, &self.auth.password) {
            request = request.basic_auth(user, Some(password));
        }
        request
            .send()
            .await
            .map_err(|e| SiloError::registry(format!("GET {} failed", url), e))
    }

    /// The configured registry root
    pub fn registry(&self) -> &str {
        &self.registry
    }
}

#[cfg(test)]
mod tests;
