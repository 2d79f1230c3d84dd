//! Core data types for the Silo gateway.

pub mod manifest;
pub mod name_version;

pub use manifest::{PackageManifest, RawManifest, SideEffectsField, StringOrMap};
pub use name_version::NameVersion;
