//! Normalized package manifests.
//!
//! Registries publish `package.json` documents whose fields vary in shape
//! between packages: `browser` may be a string or a map, `sideEffects` a
//! bool, the string `"false"`, or a file list. Each dynamic field maps to a
//! tagged-variant type here, and [`PackageManifest`] is the normalized view
//! derived from the raw bytes on every read. The cache stores the raw wire
//! bytes, never this struct, so derived fields can evolve without
//! invalidating cached data.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{SiloError, SiloResult};

/// A field that is either a single path or a conditional map
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum StringOrMap {
    Str(String),
    Map(BTreeMap<String, Value>),
}

impl StringOrMap {
    /// The main value: the string itself, or the `.` entry of the map
    pub fn main_value(&self) -> Option<String> {
        match self {
            StringOrMap::Str(s) if !s.is_empty() => Some(s.clone()),
            StringOrMap::Str(_) => None,
            StringOrMap::Map(m) => m.get(".").and_then(|v| v.as_str()).map(str::to_string),
        }
    }
}

/// The raw `sideEffects` declaration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SideEffectsField {
    Bool(bool),
    Str(String),
    List(Vec<Value>),
}

/// Raw package.json document as published by a registry.
///
/// Unknown fields are ignored; every field the gateway consumes is listed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawManifest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(rename = "type")]
    pub module_type: Option<String>,
    pub main: Option<String>,
    pub module: Option<StringOrMap>,
    pub es2015: Option<StringOrMap>,
    #[serde(rename = "jsnext:main")]
    pub jsnext_main: Option<String>,
    pub types: Option<String>,
    pub typings: Option<String>,
    pub browser: Option<StringOrMap>,
    #[serde(rename = "sideEffects")]
    pub side_effects: Option<SideEffectsField>,
    pub dependencies: Option<BTreeMap<String, String>>,
    #[serde(rename = "peerDependencies")]
    pub peer_dependencies: Option<BTreeMap<String, String>>,
    pub exports: Option<Value>,
    pub deprecated: Option<Value>,
    /// Gateway-specific configuration block embedded in the manifest
    #[serde(rename = "silo")]
    pub gateway_config: Option<Value>,
}

/// Normalized manifest for one exact package version.
///
/// Read-only after construction; derived from [`RawManifest`] via
/// [`PackageManifest::from_bytes`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageManifest {
    pub name: String,
    pub version: String,
    /// Module system marker (`"module"` or `"commonjs"`)
    pub module_type: Option<String>,
    pub main: Option<String>,
    pub module: Option<String>,
    pub es2015: Option<String>,
    pub jsnext_main: Option<String>,
    pub types: Option<String>,
    pub typings: Option<String>,
    /// Sub-path to replacement path; an empty string disables the sub-path
    pub browser: BTreeMap<String, String>,
    /// True when the package declares itself entirely side-effect free
    pub side_effects_false: bool,
    /// Explicit list of side-effectful files, when declared as an array
    pub side_effects: Option<BTreeSet<String>>,
    pub dependencies: BTreeMap<String, String>,
    pub peer_dependencies: BTreeMap<String, String>,
    /// Export map, kept in wire shape
    pub exports: Option<Value>,
    pub deprecated: Option<String>,
    pub gateway_config: Option<Value>,
}

impl PackageManifest {
    /// Decode raw registry bytes into a normalized manifest
    pub fn from_bytes(bytes: &[u8]) -> SiloResult<Self> {
        let raw: RawManifest = serde_json::from_slice(bytes).map_err(SiloError::json)?;
        Ok(Self::from_raw(raw))
    }

    /// Normalize a raw manifest into the derived view
    pub fn from_raw(raw: RawManifest) -> Self {
        let mut browser = BTreeMap::new();
        match &raw.browser {
            Some(StringOrMap::Str(s)) if !s.is_empty() => {
                browser.insert(".".to_string(), s.clone());
            }
            Some(StringOrMap::Map(m)) => {
                for (k, v) in m {
                    match v {
                        Value::String(s) => {
                            browser.insert(k.clone(), s.clone());
                        }
                        Value::Bool(false) => {
                            browser.insert(k.clone(), String::new());
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }

        let mut side_effects_false = false;
        let mut side_effects = None;
        match &raw.side_effects {
            Some(SideEffectsField::Bool(b)) => side_effects_false = !b,
            Some(SideEffectsField::Str(s)) => side_effects_false = s == "false",
            Some(SideEffectsField::List(items)) if !items.is_empty() => {
                let set: BTreeSet<String> = items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect();
                side_effects = Some(set);
            }
            _ => {}
        }

        let deprecated = match &raw.deprecated {
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        };

        // an empty string exports field carries no information
        let exports = raw.exports.filter(|v| v.as_str() != Some(""));

        Self {
            name: raw.name,
            version: raw.version,
            module_type: raw.module_type,
            main: raw.main,
            module: raw.module.as_ref().and_then(StringOrMap::main_value),
            es2015: raw.es2015.as_ref().and_then(StringOrMap::main_value),
            jsnext_main: raw.jsnext_main,
            types: raw.types,
            typings: raw.typings,
            browser,
            side_effects_false,
            side_effects,
            dependencies: raw.dependencies.unwrap_or_default(),
            peer_dependencies: raw.peer_dependencies.unwrap_or_default(),
            exports,
            deprecated,
            gateway_config: raw.gateway_config,
        }
    }

    /// Check whether the package ships only type declarations
    pub fn is_types_only(&self) -> bool {
        self.main.is_none() && self.module.is_none() && self.types.is_some()
    }
}
