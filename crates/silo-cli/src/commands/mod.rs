//! Command implementations and dispatch logic.
//!
//! Each command is an async function taking a [`CommandContext`], which
//! owns the fully wired service graph: one shared HTTP client, one cache
//! store, the packument cache, the manifest resolver, and the install
//! orchestrator.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use silo_cache::{CacheStore, MemoryCache};
use silo_config::GatewayConfig;
use silo_install::{InstallOptions, InstallOrchestrator, TokioRunner};
use silo_registry::{AuthConfig, PackumentCache, RegistryClient, RegistryOptions};
use silo_resolver::{ManifestResolver, ResolverOptions};

pub mod install;
pub mod resolve;


use crate::Commands;

/// Shared context for all commands
pub struct CommandContext {
    pub config: GatewayConfig,
    pub resolver: ManifestResolver,
    pub installer: InstallOrchestrator<TokioRunner>,
}

impl CommandContext {
    /// Wire the service graph from configuration
    pub fn new(config_path: Option<&Path>) -> anyhow::Result<Self> {
        let config = match config_path {
            Some(path) => GatewayConfig::from_file(path)?,
            None => {
                let mut config = GatewayConfig::default();
                config.apply_env();
                config.validate()?;
                config
            }
        };

        let client = Arc::new(RegistryClient::with_options(RegistryOptions {
            registry: config.registry.clone(),
            scope: config.scope.clone(),
            auth: AuthConfig {
                token: config.token.clone(),
                user: config.user.clone(),
                password: config.password.clone(),
            },
        })?);
        let store: Arc<dyn CacheStore> = Arc::new(MemoryCache::new());
        let packuments = Arc::new(PackumentCache::new(client.clone(), store.clone()));
        let resolver = ManifestResolver::new(
            client,
            packuments,
            store,
            ResolverOptions {
                work_dir: config.work_dir.clone(),
                fixed_versions: config.fixed_versions.clone(),
            },
        );
        let installer = InstallOrchestrator::new(
            TokioRunner,
            InstallOptions {
                token: config.token.clone(),
                user: config.user.clone(),
                password: config.password.clone(),
                timeout: Duration::from_secs(config.install_timeout_secs),
            },
        );

        Ok(Self {
            config,
            resolver,
            installer,
        })
    }
}

/// Dispatch a command to its handler
pub async fn dispatch_command(command: Commands, ctx: &CommandContext) -> anyhow::Result<()> {
    match command {
        Commands::Resolve { package } => {
            let (name, spec) = split_package_arg(&package);
            info!(name, spec, "resolving");
            resolve::execute(name, spec, ctx).await
        }
        Commands::Install { package, dir } => {
            let (name, spec) = split_package_arg(&package);
            info!(name, spec, "installing");
            install::execute(name, spec, dir, ctx).await
        }
    }
}

/// Split a `name[@spec]` argument, leaving the scope marker intact
pub fn split_package_arg(arg: &str) -> (&str, &str) {
    if arg.len() < 2 {
        return (arg, "");
    }
    match arg[1..].find('@') {
        Some(i) => (&arg[..i + 1], &arg[i + 2..]),
        None => (arg, ""),
    }
}
