//! # silo-cli
//!
//! Command-line driver for the Silo registry gateway. It wires the
//! configuration, cache, registry client, resolver, and install
//! orchestrator together and exposes them as `silo resolve` and
//! `silo install`.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::CommandContext;

/// Package-registry gateway: resolve specifiers and materialize packages
#[derive(Parser)]
#[command(name = "silo", version, about = "Package-registry gateway")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a specifier to one exact version and print its manifest
    Resolve {
        /// Package to resolve, as `name`, `name@tag`, or `name@range`
        package: String,
    },
    /// Install a resolved package into a working directory
    Install {
        /// Package to install, as `name`, `name@tag`, or `name@range`
        package: String,
        /// Target directory (defaults under the configured work dir)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let runtime = tokio::runtime::Runtime::new().context("failed to create async runtime")?;
    runtime.block_on(async {
        let ctx = CommandContext::new(cli.config.as_deref())?;
        commands::dispatch_command(cli.command, &ctx).await
    })
}

fn setup_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(format!("silo={0},silo_cli={0}", default_level))
            }),
        )
        .with_target(false)
        .init();
}
