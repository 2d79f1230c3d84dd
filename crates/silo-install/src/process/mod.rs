//! Subprocess port for the external installer.
//!
//! The orchestrator never shells out directly; it goes through
//! [`ProcessRunner`] so tests can substitute a fake. [`TokioRunner`] is the
//! production implementation: it enforces a wall-clock timeout and kills
//! the child on expiry.

use std::io;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use silo_core::error::SiloError;

use crate::InstallResult;

/// Combined outcome of one subprocess invocation
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// Exit code, when the process exited normally
    pub status_code: Option<i32>,
    /// Combined stdout and stderr
    pub output: String,
}

impl ProcessOutput {
    /// Whether the process exited with status zero
    pub fn success(&self) -> bool {
        self.status_code == Some(0)
    }
}

/// Port for invoking an external tool in a working directory
#[allow(async_fn_in_trait)]
pub trait ProcessRunner {
    /// Run `program` with `args` in `dir`, with extra environment
    /// variables, bounded by `timeout`
    async fn run(
        &self,
        program: &str,
        args: &[String],
        dir: &Path,
        env: &[(String, String)],
        timeout: Duration,
    ) -> InstallResult<ProcessOutput>;
}

/// Production runner backed by `tokio::process`
#[derive(Debug, Clone, Default)]
pub struct TokioRunner;

impl ProcessRunner for TokioRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        dir: &Path,
        env: &[(String, String)],
        timeout: Duration,
    ) -> InstallResult<ProcessOutput> {
        debug!(program, ?args, dir = %dir.display(), "spawning installer");

        let mut command = Command::new(program);
        command
            .args(args)
            .current_dir(dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // the child must not outlive an expired timeout
            .kill_on_drop(true);
        for (key, value) in env {
            command.env(key, value);
        }

        let waited = tokio::time::timeout(timeout, command.output())
            .await
            .map_err(|_| {
                SiloError::io(
                    format!("{} timed out after {:?}", program, timeout),
                    io::Error::new(io::ErrorKind::TimedOut, "subprocess deadline exceeded"),
                )
            })?;
        let output = waited.map_err(|e| SiloError::io(format!("failed to run {}", program), e))?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(ProcessOutput {
            status_code: output.status.code(),
            output: combined,
        })
    }
}
