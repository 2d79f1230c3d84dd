//! Install orchestration over the external installer.
//!
//! `install` materializes one resolved package under a caller-owned working
//! directory. A `package.json` anchor is written first so the installer
//! never reads dependency declarations from an ancestor directory, then the
//! installer runs under a per-`name@version` lock with bounded retry.
//! Credentials reach the subprocess through environment variables, never
//! argv, so they stay out of process listings.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

use silo_cache::LockTable;
use silo_core::error::SiloError;
use silo_core::types::NameVersion;

use crate::process::ProcessRunner;
use crate::InstallResult;

const MAX_ATTEMPTS: u32 = 3;

/// Fixed pause between attempts, not exponential
const RETRY_BACKOFF: Duration = Duration::from_millis(100);

const INSTALLER: &str = "pnpm";

/// Where a package comes from, which decides install mode and anchoring
#[derive(Debug, Clone, PartialEq)]
pub enum Provenance {
    /// Normal registry package, installed by `add name@version`
    Registry,
    /// Source-control-hosted package, installed via a git dependency spec
    Git,
    /// Republished snippet whose manifest is already known
    Republished { manifest: Vec<u8> },
}

/// One package to materialize
#[derive(Debug, Clone)]
pub struct InstallRequest {
    pub name: String,
    pub version: String,
    pub provenance: Provenance,
}

impl InstallRequest {
    /// `name@version` identity, also the install lock key
    pub fn id(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }
}

/// Options for constructing an [`InstallOrchestrator`]
#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// Bearer token forwarded to the installer
    pub token: Option<String>,
    /// Basic auth username forwarded to the installer
    pub user: Option<String>,
    /// Basic auth password forwarded to the installer
    pub password: Option<String>,
    /// Wall-clock limit per installer invocation
    pub timeout: Duration,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            token: None,
            user: None,
            password: None,
            timeout: Duration::from_secs(120),
        }
    }
}

/// Drives the external installer with per-package-version locking
pub struct InstallOrchestrator<R: ProcessRunner> {
    runner: R,
    locks: LockTable,
    options: InstallOptions,
}

impl<R: ProcessRunner> InstallOrchestrator<R> {
    /// Create an orchestrator over a process runner
    pub fn new(runner: R, options: InstallOptions) -> Self {
        Self {
            runner,
            locks: LockTable::new(),
            options,
        }
    }

    /// Install one resolved package into `work_dir`.
    ///
    /// At most one installer subprocess runs per `name@version` at a time;
    /// concurrent callers for the same package-version wait on the winner.
    pub async fn install(&self, work_dir: &Path, request: &InstallRequest) -> InstallResult<()> {
        let id = request.id();

        let lock = self.locks.lock_for(&id);
        let _guard = lock.lock().await;

        self.ensure_anchor(work_dir, request)?;

        let mut result = Ok(());
        for attempt in 1..=MAX_ATTEMPTS {
            result = self.run_attempt(work_dir, request).await;
            match &result {
                Ok(()) => {
                    info!(package = %id, attempt, "installed");
                    break;
                }
                Err(e) => {
                    warn!(package = %id, attempt, error = %e, "install attempt failed");
                    if attempt < MAX_ATTEMPTS {
                        tokio::time::sleep(RETRY_BACKOFF).await;
                    }
                }
            }
        }
        result
    }

    /// Write the `package.json` anchor the installer requires.
    ///
    /// Without it the installer walks up to an ancestor manifest and
    /// installs into the wrong tree.
    fn ensure_anchor(&self, work_dir: &Path, request: &InstallRequest) -> InstallResult<()> {
        fs::create_dir_all(work_dir)
            .map_err(|e| SiloError::io(format!("create {}", work_dir.display()), e))?;

        let anchor = work_dir.join("package.json");
        let write = |content: Vec<u8>| {
            fs::write(&anchor, content)
                .map_err(|e| SiloError::io(format!("write {}", anchor.display()), e))
        };

        match &request.provenance {
            Provenance::Republished { manifest } => write(manifest.clone()),
            Provenance::Git => {
                let spec = format!(
                    "git+https://github.com/{}.git#{}",
                    request.name, request.version
                );
                let content = format!(r#"{{"dependencies":{{"{}":"{}"}}}}"#, request.name, spec);
                write(content.into_bytes())
            }
            Provenance::Registry if !anchor.exists() => write(b"{}".to_vec()),
            Provenance::Registry => Ok(()),
        }
    }

    async fn run_attempt(&self, work_dir: &Path, request: &InstallRequest) -> InstallResult<()> {
        let id = request.id();

        let mut args: Vec<String> = match &request.provenance {
            Provenance::Registry => {
                let mut args = vec!["add".to_string(), id.clone()];
                // exact versions can come straight from the local store
                if NameVersion::new(&request.name, &request.version).is_exact() {
                    args.push("--prefer-offline".to_string());
                }
                args
            }
            Provenance::Git | Provenance::Republished { .. } => vec!["install".to_string()],
        };
        args.extend(
            ["--ignore-scripts", "--loglevel", "error"]
                .iter()
                .map(|s| s.to_string()),
        );

        let output = self
            .runner
            .run(INSTALLER, &args, work_dir, &self.env(), self.options.timeout)
            .await?;
        if !output.success() {
            return Err(SiloError::Install {
                package: id,
                message: format!("{} {}: {}", INSTALLER, args[0], output.output.trim()),
            });
        }
        debug!(package = %id, "installer exited cleanly");

        self.verify(work_dir, request)
    }

    /// Check the installed manifest landed on disk, synthesizing one where
    /// the installer is known not to produce it
    fn verify(&self, work_dir: &Path, request: &InstallRequest) -> InstallResult<()> {
        let installed = work_dir
            .join("node_modules")
            .join(&request.name)
            .join("package.json");

        let write_manifest = |content: Vec<u8>| -> InstallResult<()> {
            if let Some(parent) = installed.parent() {
                fs::create_dir_all(parent)
                    .map_err(|e| SiloError::io(format!("create {}", parent.display()), e))?;
            }
            fs::write(&installed, content)
                .map_err(|e| SiloError::io(format!("write {}", installed.display()), e))
        };

        match &request.provenance {
            // the manifest is authoritative here, installed output or not
            Provenance::Republished { manifest } => write_manifest(manifest.clone()),
            Provenance::Git if !installed.exists() => {
                // git installs may ship without a package.json; synthesize
                // one from the known identity instead of retrying
                let content = serde_json::json!({
                    "name": request.name,
                    "version": request.version,
                });
                write_manifest(content.to_string().into_bytes())
            }
            Provenance::Git => Ok(()),
            Provenance::Registry if !installed.exists() => Err(SiloError::Install {
                package: request.id(),
                message: format!("{} not found after install", installed.display()),
            }),
            Provenance::Registry => Ok(()),
        }
    }

    fn env(&self) -> Vec<(String, String)> {
        let mut env = Vec::new();
        if let Some(token) = &self.options.token {
            env.push(("SILO_NPM_TOKEN".to_string(), token.clone()));
        }
        if let (Some(user), Some(password)) = (&self.options.user, &self.options.password) {
            env.push(("SILO_NPM_USER".to_string(), user.clone()));
            // the installer's auth hook expects the password pre-encoded
            env.push(("SILO_NPM_PASSWORD".to_string(), BASE64.encode(password)));
        }
        env
    }
}
