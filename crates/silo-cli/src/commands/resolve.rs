//! `silo resolve` command

use anyhow::Context;

use super::CommandContext;

/// Resolve a specifier and print the normalized manifest as JSON
pub async fn execute(name: &str, spec: &str, ctx: &CommandContext) -> anyhow::Result<()> {
    let manifest = ctx
        .resolver
        .resolve(name, spec)
        .await
        .with_context(|| format!("failed to resolve '{}'", name))?;

    println!("{}", serde_json::to_string_pretty(&manifest)?);
    Ok(())
}
