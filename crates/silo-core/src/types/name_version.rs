//! Normalized package specifiers.
//!
//! A `NameVersion` is the literal (name, version-specifier) pair used as
//! cache identity throughout the gateway. Name normalization is scope-aware
//! and strips trailing sub-paths; semantically equal version strings
//! (`1.0` vs `1.0.0`) are deliberately not collapsed at this layer.

use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A package name paired with a version specifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NameVersion {
    pub name: String,
    pub version: String,
}

impl NameVersion {
    /// Normalize a raw (name, version) pair into a NameVersion.
    ///
    /// The name keeps at most one scope segment (`@scope/pkg/sub/path`
    /// becomes `@scope/pkg`); the version drops a leading `=` or `v` and
    /// defaults to `latest` when empty.
    pub fn new(name: &str, version: &str) -> Self {
        let parts: Vec<&str> = name.trim_matches('/').split('/').collect();
        let name = if name.starts_with('@') && parts.len() > 1 {
            format!("{}/{}", parts[0], parts[1])
        } else {
            parts[0].to_string()
        };

        let version = version.strip_prefix('=').unwrap_or(version);
        let version = version.strip_prefix('v').unwrap_or(version);
        let version = if version.is_empty() {
            "latest".to_string()
        } else {
            version.to_string()
        };

        Self { name, version }
    }

    /// Check whether the version component is already an exact semantic
    /// version, as opposed to a range or dist-tag
    pub fn is_exact(&self) -> bool {
        Version::parse(&self.version).is_ok()
    }
}

impl fmt::Display for NameVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_name() {
        let nv = NameVersion::new("lodash", "4.17.21");
        assert_eq!(nv.name, "lodash");
        assert_eq!(nv.version, "4.17.21");
        assert!(nv.is_exact());
    }

    #[test]
    fn test_scoped_name_with_subpath() {
        let nv = NameVersion::new("@scope/pkg/sub/path", "=v2.0.0");
        assert_eq!(nv.name, "@scope/pkg");
        assert_eq!(nv.version, "2.0.0");
    }

    #[test]
    fn test_unscoped_subpath_stripped() {
        let nv = NameVersion::new("lodash/fp", "");
        assert_eq!(nv.name, "lodash");
        assert_eq!(nv.version, "latest");
    }

    #[test]
    fn test_empty_version_defaults_to_latest() {
        let nv = NameVersion::new("react", "");
        assert_eq!(nv.version, "latest");
        assert!(!nv.is_exact());
    }

    #[test]
    fn test_leading_v_and_eq_stripped() {
        assert_eq!(NameVersion::new("a", "v1.2.3").version, "1.2.3");
        assert_eq!(NameVersion::new("a", "=1.2.3").version, "1.2.3");
        assert_eq!(NameVersion::new("a", "=v1.2.3").version, "1.2.3");
    }

    #[test]
    fn test_ranges_are_not_exact() {
        assert!(!NameVersion::new("a", "^1.0.0").is_exact());
        assert!(!NameVersion::new("a", "1.x").is_exact());
        assert!(!NameVersion::new("a", "latest").is_exact());
        assert!(NameVersion::new("a", "1.2.3-beta.1").is_exact());
    }

    #[test]
    fn test_display() {
        let nv = NameVersion::new("@types/react", "18.0.27");
        assert_eq!(nv.to_string(), "@types/react@18.0.27");
    }
}
