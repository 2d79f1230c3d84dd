//! Packument fetching and caching.
//!
//! A packument is the full per-package version listing. Fetches are
//! serialized per package name: the per-key lock is taken before anything
//! else, the cache is re-checked under it, and late arrivals observe the
//! bytes stored by whichever caller fetched first. Negative results are
//! never cached.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use silo_cache::{get_json, CacheStore, LockTable};
use silo_core::error::SiloError;

use crate::api::Packument;
use crate::client::RegistryClient;
use crate::RegistryResult;

/// How long a packument stays fresh; dist-tags move, so hours not days
const PACKUMENT_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// Caching fetcher for packuments
pub struct PackumentCache {
    client: Arc<RegistryClient>,
    store: Arc<dyn CacheStore>,
    locks: LockTable,
}

impl PackumentCache {
    /// Create a packument cache over a client and a cache store
    pub fn new(client: Arc<RegistryClient>, store: Arc<dyn CacheStore>) -> Self {
        Self {
            client,
            store,
            locks: LockTable::new(),
        }
    }

    /// Fetch the packument for `name`, consulting the cache first.
    ///
    /// Two concurrent calls for the same name never both hit the network.
    pub async fn get(&self, name: &str) -> RegistryResult<Packument> {
        let cache_key = format!("packument:{}", name);

        let lock = self.locks.lock_for(&cache_key);
        let _guard = lock.lock().await;

        if let Some(packument) = get_json::<Packument>(&*self.store, &cache_key) {
            debug!(name, "packument cache hit");
            return Ok(packument);
        }

        let url = self.client.package_url(name, "");
        let response = self.client.get(&url).await?;
        let status = response.status();
        debug!(name, status = %status, "packument fetched");

        if status == 404 || status == 401 {
            return Err(SiloError::PackageNotFound {
                name: name.to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SiloError::registry_message(format!(
                "could not get metadata of package '{}' ({}: {})",
                name,
                status,
                snippet(&body)
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SiloError::registry(format!("read packument body of '{}'", name), e))?;
        let packument: Packument = serde_json::from_slice(&bytes).map_err(SiloError::json)?;

        if packument.versions.is_empty() {
            warn!(name, "packument has no versions");
        }

        self.store.set(&cache_key, bytes.to_vec(), PACKUMENT_TTL);
        Ok(packument)
    }
}

/// Trim a response body for inclusion in an error message
fn snippet(body: &str) -> &str {
    let end = body
        .char_indices()
        .take(256)
        .last()
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    &body[..end]
}

#[cfg(test)]
mod tests;
