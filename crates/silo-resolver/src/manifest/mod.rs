//! Manifest resolution with tarball-fallback recovery.
//!
//! `ManifestResolver` turns a (name, specifier) pair into the normalized
//! manifest of one exact version. Dist-tags and ranges go through the
//! packument; exact versions skip straight to the manifest fetch. When the
//! registry's per-version metadata endpoint is unavailable or incomplete
//! (private scoped registries, GitHub's package registry), the manifest is
//! recovered from the version's published tarball instead.
//!
//! The manifest cache stores the raw registry JSON bytes, not the derived
//! struct: normalized fields like `sideEffects` are computed on every read,
//! so cached data stays forward-compatible with manifest-shape changes.

use sha1::{Digest, Sha1};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use silo_cache::{extract_tarball, get_bytes, CacheStore, LockTable};
use silo_core::error::SiloError;
use silo_core::types::{NameVersion, PackageManifest};
use silo_registry::{Packument, PackumentCache, RegistryClient};

use crate::matcher::find_best_version;
use crate::ResolverResult;

/// Exact-version manifests are immutable once published, so cache long
const MANIFEST_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Tag-to-version mappings can move at any time, so cache short
const VERSION_LOOKUP_TTL: Duration = Duration::from_secs(10 * 60);

/// Pinned `@types/node` version served without a registry round-trip
pub const NODE_TYPES_VERSION: &str = "16.18.10";

/// Options for constructing a [`ManifestResolver`]
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    /// Working directory for tarball downloads
    pub work_dir: PathBuf,
    /// `name@version` prefixes forced to a patched replacement version
    pub fixed_versions: BTreeMap<String, String>,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            work_dir: std::env::temp_dir().join("silo"),
            fixed_versions: BTreeMap::new(),
        }
    }
}

/// Resolves version specifiers to concrete manifests
pub struct ManifestResolver {
    client: Arc<RegistryClient>,
    packuments: Arc<PackumentCache>,
    store: Arc<dyn CacheStore>,
    locks: LockTable,
    work_dir: PathBuf,
    fixed_versions: BTreeMap<String, String>,
}

impl ManifestResolver {
    /// Create a manifest resolver over a client, packument cache, and store
    pub fn new(
        client: Arc<RegistryClient>,
        packuments: Arc<PackumentCache>,
        store: Arc<dyn CacheStore>,
        options: ResolverOptions,
    ) -> Self {
        Self {
            client,
            packuments,
            store,
            locks: LockTable::new(),
            work_dir: options.work_dir,
            fixed_versions: options.fixed_versions,
        }
    }

    /// Resolve `name` at `spec` (exact version, dist-tag, or range) to the
    /// normalized manifest of one concrete version
    pub async fn resolve(&self, name: &str, spec: &str) -> ResolverResult<PackageManifest> {
        let manifest = self.resolve_uncorrected(name, spec).await?;

        // known-problematic published versions are forced to a patched
        // replacement; the substitute goes through full resolution so its
        // own manifest is fetched fresh
        let id = format!("{}@{}", manifest.name, manifest.version);
        for (prefix, pinned) in &self.fixed_versions {
            if id.starts_with(prefix.as_str()) {
                info!(package = %id, pinned = %pinned, "applying fixed-version override");
                return self.resolve_uncorrected(&manifest.name, pinned).await;
            }
        }
        Ok(manifest)
    }

    async fn resolve_uncorrected(&self, name: &str, spec: &str) -> ResolverResult<PackageManifest> {
        let nv = NameVersion::new(name, spec);

        // types-only package effectively pinned to one version; serving it
        // synthetically avoids depending on the types registry at all
        if nv.name == "@types/node" {
            return Ok(node_types_manifest());
        }

        let nv = if nv.is_exact() {
            nv
        } else {
            let version = self.resolve_version(&nv).await?;
            NameVersion {
                name: nv.name,
                version,
            }
        };

        self.fetch_manifest(&nv).await
    }

    /// Resolve a dist-tag or range to an exact version, with a short-lived
    /// lookup cache in front of the packument
    async fn resolve_version(&self, nv: &NameVersion) -> ResolverResult<String> {
        let cache_key = format!("packument-version-lookup:{}", nv);

        if let Some(bytes) = get_bytes(&*self.store, &cache_key) {
            if let Ok(version) = String::from_utf8(bytes) {
                debug!(package = %nv, version = %version, "version lookup cache hit");
                return Ok(version);
            }
        }

        let packument = self.packuments.get(&nv.name).await?;
        let version = best_version_in_packument(nv, &packument)?;
        debug!(package = %nv, version = %version, "resolved specifier");

        self.store
            .set(&cache_key, version.clone().into_bytes(), VERSION_LOOKUP_TTL);
        Ok(version)
    }

    /// Fetch the manifest of one exact version, trying the registry's
    /// metadata endpoint first and falling back to the tarball
    async fn fetch_manifest(&self, nv: &NameVersion) -> ResolverResult<PackageManifest> {
        let cache_key = format!("manifest:{}", nv);

        let lock = self.locks.lock_for(&cache_key);
        let _guard = lock.lock().await;

        if let Some(bytes) = get_bytes(&*self.store, &cache_key) {
            match PackageManifest::from_bytes(&bytes) {
                Ok(manifest) => {
                    debug!(package = %nv, "manifest cache hit");
                    return Ok(manifest);
                }
                Err(e) => {
                    warn!(package = %nv, error = %e, "cached manifest failed to decode, refetching");
                }
            }
        }

        let raw = match self.fetch_manifest_direct(nv).await {
            Ok(bytes) => bytes,
            Err(direct_err) => {
                // the tarball error is the more specific diagnosis when
                // both paths fail; the direct error is only logged
                debug!(package = %nv, error = %direct_err, "direct manifest fetch failed, trying tarball");
                self.recover_from_tarball(nv).await?
            }
        };

        let manifest = PackageManifest::from_bytes(&raw)?;
        self.store.set(&cache_key, raw, MANIFEST_TTL);
        Ok(manifest)
    }

    async fn fetch_manifest_direct(&self, nv: &NameVersion) -> ResolverResult<Vec<u8>> {
        let url = self.client.package_url(&nv.name, &nv.version);
        let response = self.client.get(&url).await?;
        let status = response.status();

        if status == 404 || status == 401 {
            return Err(SiloError::VersionNotFound {
                name: nv.name.clone(),
                version: nv.version.clone(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SiloError::registry_message(format!(
                "could not get manifest of '{}' ({}: {})",
                nv,
                status,
                body.chars().take(256).collect::<String>()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SiloError::registry(format!("read manifest body of '{}'", nv), e))?;
        Ok(bytes.to_vec())
    }

    /// Recover a manifest from the version's published tarball.
    ///
    /// The same version may have vanished from the registry's API surface
    /// while its tarball still exists. The download and extraction scratch
    /// space is owned by this call alone and removed on every exit path.
    async fn recover_from_tarball(&self, nv: &NameVersion) -> ResolverResult<Vec<u8>> {
        let recovery = |message: String| SiloError::TarballRecovery {
            package: nv.to_string(),
            message,
        };

        let packument = self
            .packuments
            .get(&nv.name)
            .await
            .map_err(|e| recovery(format!("packument fetch: {}", e)))?;
        let version = best_version_in_packument(nv, &packument)
            .map_err(|e| recovery(format!("version resolution: {}", e)))?;
        let dist = packument
            .versions
            .get(&version)
            .map(|v| v.dist.clone())
            .ok_or_else(|| recovery(format!("no tarball recorded for version {}", version)))?;
        if dist.tarball.is_empty() {
            return Err(recovery(format!("empty tarball URL for version {}", version)));
        }

        info!(package = %nv, tarball = %dist.tarball, "recovering manifest from tarball");
        let response = self
            .client
            .get(&dist.tarball)
            .await
            .map_err(|e| recovery(format!("tarball download: {}", e)))?;
        if !response.status().is_success() {
            return Err(recovery(format!(
                "tarball download: HTTP {}",
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| recovery(format!("tarball download: {}", e)))?;

        if !dist.shasum.is_empty() {
            let mut hasher = Sha1::new();
            hasher.update(&bytes);
            let digest = hex::encode(hasher.finalize());
            if digest != dist.shasum {
                return Err(recovery(format!(
                    "shasum mismatch: expected {}, got {}",
                    dist.shasum, digest
                )));
            }
        }

        let downloads = self.work_dir.join("tarballs");
        fs::create_dir_all(&downloads)
            .map_err(|e| recovery(format!("create {}: {}", downloads.display(), e)))?;
        // scratch dir is deleted when it drops, success or not
        let scratch = tempfile::Builder::new()
            .prefix("silo-")
            .tempdir_in(&downloads)
            .map_err(|e| recovery(format!("create scratch dir: {}", e)))?;

        let archive_path = scratch.path().join("package.tgz");
        fs::write(&archive_path, &bytes)
            .map_err(|e| recovery(format!("write tarball: {}", e)))?;
        let archive = fs::File::open(&archive_path)
            .map_err(|e| recovery(format!("open tarball: {}", e)))?;

        let contents_dir = scratch.path().join("contents");
        extract_tarball(archive, &contents_dir)
            .map_err(|e| recovery(format!("extract: {}", e)))?;

        fs::read(contents_dir.join("package").join("package.json"))
            .map_err(|e| recovery(format!("read package/package.json: {}", e)))
    }
}

/// Map a specifier to an exact version using a packument: dist-tags first,
/// then best-match over the published version set
pub fn best_version_in_packument(
    nv: &NameVersion,
    packument: &Packument,
) -> ResolverResult<String> {
    if let Some(version) = packument.dist_tags.get(&nv.version) {
        return Ok(version.clone());
    }
    match find_best_version(&nv.version, &packument.available_versions()) {
        Ok(version) => Ok(version),
        Err(SiloError::NoMatchingVersion { .. }) => Err(SiloError::VersionNotFound {
            name: nv.name.clone(),
            version: nv.version.clone(),
        }),
        Err(e) => Err(e),
    }
}

/// Synthetic manifest for the pinned types-only package
fn node_types_manifest() -> PackageManifest {
    PackageManifest {
        name: "@types/node".to_string(),
        version: NODE_TYPES_VERSION.to_string(),
        types: Some("index.d.ts".to_string()),
        ..PackageManifest::default()
    }
}
