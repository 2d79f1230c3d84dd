//! npm registry API response types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Full version listing of one package as published by a registry.
///
/// Immutable once cached; re-fetched only after cache expiry.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Packument {
    /// Package name
    #[serde(default)]
    pub name: String,
    /// Mutable named pointers to versions (e.g. `latest`)
    #[serde(default, rename = "dist-tags")]
    pub dist_tags: HashMap<String, String>,
    /// Every known version and its tarball location
    #[serde(default)]
    pub versions: HashMap<String, PackumentVersion>,
}

/// Per-version entry of a packument
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PackumentVersion {
    /// Distribution information
    #[serde(default)]
    pub dist: Dist,
}

/// Tarball location and checksum for one published version
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Dist {
    /// Tarball download URL
    #[serde(default)]
    pub tarball: String,
    /// SHA-1 checksum of the tarball
    #[serde(default)]
    pub shasum: String,
}

impl Packument {
    /// Version strings of every published version
    pub fn available_versions(&self) -> Vec<String> {
        self.versions.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packument_decode() {
        let body = r#"{
            "name": "smallest",
            "dist-tags": { "latest": "1.0.1" },
            "versions": {
                "1.0.0": { "dist": { "tarball": "https://registry.npmjs.org/smallest/-/smallest-1.0.0.tgz", "shasum": "aaa" } },
                "1.0.1": { "dist": { "tarball": "https://registry.npmjs.org/smallest/-/smallest-1.0.1.tgz", "shasum": "bbb" } }
            }
        }"#;
        let packument: Packument = serde_json::from_str(body).unwrap();
        assert_eq!(packument.name, "smallest");
        assert_eq!(packument.dist_tags.get("latest").unwrap(), "1.0.1");
        assert_eq!(packument.versions.len(), 2);
        let mut versions = packument.available_versions();
        versions.sort();
        assert_eq!(versions, vec!["1.0.0", "1.0.1"]);
    }

    #[test]
    fn test_packument_tolerates_missing_fields() {
        let packument: Packument = serde_json::from_str(r#"{"name":"x"}"#).unwrap();
        assert!(packument.versions.is_empty());
        assert!(packument.dist_tags.is_empty());
    }
}
