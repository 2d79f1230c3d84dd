//! `silo install` command

use anyhow::Context;
use std::path::PathBuf;
use tracing::info;

use silo_install::{InstallRequest, Provenance};

use super::CommandContext;

/// Resolve a specifier to one exact version and materialize it on disk
pub async fn execute(
    name: &str,
    spec: &str,
    dir: Option<PathBuf>,
    ctx: &CommandContext,
) -> anyhow::Result<()> {
    let manifest = ctx
        .resolver
        .resolve(name, spec)
        .await
        .with_context(|| format!("failed to resolve '{}'", name))?;
    let id = format!("{}@{}", manifest.name, manifest.version);

    let work_dir = dir.unwrap_or_else(|| {
        // scoped names contain '/', so flatten the identity for the path
        ctx.config
            .work_dir
            .join("packages")
            .join(id.replace('/', "_"))
    });

    let request = InstallRequest {
        name: manifest.name.clone(),
        version: manifest.version.clone(),
        provenance: Provenance::Registry,
    };
    ctx.installer
        .install(&work_dir, &request)
        .await
        .with_context(|| format!("failed to install '{}'", id))?;

    info!(package = %id, dir = %work_dir.display(), "installed");
    println!("{}", work_dir.join("node_modules").join(&manifest.name).display());
    Ok(())
}
