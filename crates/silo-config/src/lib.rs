//! Configuration for the Silo registry gateway
//!
//! This crate parses the gateway's TOML configuration file and applies
//! environment-variable overrides for registry credentials, providing one
//! validated configuration value the rest of the gateway is wired from.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

use silo_core::error::SiloError;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, SiloError>;

/// The public default registry used for names outside a configured scope
pub const PUBLIC_REGISTRY: &str = "https://registry.npmjs.org/";

/// Gateway configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Registry root URL, always slash-terminated after validation
    pub registry: String,

    /// Package scope the configured registry is authoritative for;
    /// names outside it fall back to the public registry
    pub scope: Option<String>,

    /// Bearer token for registry authentication
    pub token: Option<String>,

    /// Basic auth username
    pub user: Option<String>,

    /// Basic auth password
    pub password: Option<String>,

    /// Working directory for tarball downloads and installs
    pub work_dir: PathBuf,

    /// Wall-clock limit for one installer subprocess invocation, in seconds
    pub install_timeout_secs: u64,

    /// Known-problematic published versions forced to a patched
    /// replacement, keyed by `name@version` prefix
    pub fixed_versions: BTreeMap<String, String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            registry: PUBLIC_REGISTRY.to_string(),
            scope: None,
            token: None,
            user: None,
            password: None,
            work_dir: env::temp_dir().join("silo"),
            install_timeout_secs: 120,
            fixed_versions: default_fixed_versions(),
        }
    }
}

/// Published versions known to break downstream bundling, with their
/// patched replacements
pub fn default_fixed_versions() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("@types/react@17".to_string(), "17.0.53".to_string()),
        ("@types/react@18".to_string(), "18.0.27".to_string()),
        ("isomorphic-ws@4".to_string(), "5.0.0".to_string()),
    ])
}

impl GatewayConfig {
    /// Load configuration from a TOML file, then apply env overrides
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            SiloError::io(format!("failed to read {}", path.display()), e)
        })?;
        let mut config: GatewayConfig =
            toml::from_str(&contents).map_err(|e| SiloError::ConfigValidation {
                field: path.display().to_string(),
                reason: e.to_string(),
            })?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment-variable overrides for credentials and registry.
    ///
    /// Credentials belong in the environment rather than on disk or on a
    /// command line, mirroring how they are later passed to the installer.
    pub fn apply_env(&mut self) {
        if let Ok(registry) = env::var("SILO_NPM_REGISTRY") {
            self.registry = registry;
        }
        if let Ok(token) = env::var("SILO_NPM_TOKEN") {
            self.token = Some(token);
        }
        if let Ok(user) = env::var("SILO_NPM_USER") {
            self.user = Some(user);
        }
        if let Ok(password) = env::var("SILO_NPM_PASSWORD") {
            self.password = Some(password);
        }
    }

    /// Validate and normalize the configuration
    pub fn validate(&mut self) -> ConfigResult<()> {
        if self.registry.is_empty() {
            return Err(SiloError::ConfigValidation {
                field: "registry".to_string(),
                reason: "registry URL must not be empty".to_string(),
            });
        }
        if !self.registry.starts_with("http://") && !self.registry.starts_with("https://") {
            return Err(SiloError::ConfigValidation {
                field: "registry".to_string(),
                reason: format!("'{}' is not an http(s) URL", self.registry),
            });
        }
        if !self.registry.ends_with('/') {
            self.registry.push('/');
        }
        if self.install_timeout_secs == 0 {
            return Err(SiloError::ConfigValidation {
                field: "install_timeout_secs".to_string(),
                reason: "timeout must be positive".to_string(),
            });
        }
        debug!(registry = %self.registry, scope = ?self.scope, "configuration validated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.registry, PUBLIC_REGISTRY);
        assert_eq!(config.install_timeout_secs, 120);
        assert_eq!(
            config.fixed_versions.get("isomorphic-ws@4"),
            Some(&"5.0.0".to_string())
        );
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
registry = "https://npm.pkg.github.com"
scope = "@my-org"
install_timeout_secs = 60
"#
        )
        .unwrap();

        let config = GatewayConfig::from_file(file.path()).unwrap();
        // trailing slash added by validation
        assert_eq!(config.registry, "https://npm.pkg.github.com/");
        assert_eq!(config.scope.as_deref(), Some("@my-org"));
        assert_eq!(config.install_timeout_secs, 60);
    }

    #[test]
    fn test_invalid_registry_rejected() {
        let mut config = GatewayConfig {
            registry: "ftp://mirror.example.com/".to_string(),
            ..GatewayConfig::default()
        };
        assert!(config.validate().is_err());

        let mut config = GatewayConfig {
            registry: String::new(),
            ..GatewayConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = GatewayConfig {
            install_timeout_secs: 0,
            ..GatewayConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
