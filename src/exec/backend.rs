// src/exec/backend.rs

//! Pluggable process-execution backend.
//!
//! - [`RealExecBackend`] spawns actual child processes and is what
//!   production uses.
//! - Tests provide their own `ExecBackend` that records command lines and
//!   reports a canned exit code (see the test-utils crate).

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::debug;

use crate::errors::Result;

/// Trait abstracting child-process execution.
///
/// `use_shell` selects shell indirection (`cmd /C`) and is only set on
/// windows, which has no argv-exec convenience for its built-in commands.
/// Everywhere else the command line is split into argv and spawned directly.
pub trait ExecBackend: Send + Sync {
    /// Run one command to completion and return its exit code.
    fn run<'a>(
        &'a self,
        command_line: &'a str,
        use_shell: bool,
    ) -> Pin<Box<dyn Future<Output = Result<i32>> + Send + 'a>>;
}

/// Real backend used in production.
#[derive(Debug, Clone, Default)]
pub struct RealExecBackend;

impl ExecBackend for RealExecBackend {
    fn run<'a>(
        &'a self,
        command_line: &'a str,
        use_shell: bool,
    ) -> Pin<Box<dyn Future<Output = Result<i32>> + Send + 'a>> {
        Box::pin(async move {
            let mut cmd = if use_shell {
                let mut c = Command::new("cmd");
                c.arg("/C").arg(command_line);
                c
            } else {
                let mut parts = command_line.split_whitespace();
                let Some(program) = parts.next() else {
                    return Err(anyhow::anyhow!("empty command line").into());
                };
                let mut c = Command::new(program);
                c.args(parts);
                c
            };

            cmd.stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true);

            let mut child = cmd
                .spawn()
                .with_context(|| format!("spawning command: {command_line}"))?;

            // Drain both pipes so the child can't block on a full buffer.
            if let Some(stdout) = child.stdout.take() {
                tokio::spawn(async move {
                    let mut lines = BufReader::new(stdout).lines();
                    while let Ok(Some(line)) = lines.next_line().await {
                        debug!("stdout: {}", line);
                    }
                });
            }
            if let Some(stderr) = child.stderr.take() {
                tokio::spawn(async move {
                    let mut lines = BufReader::new(stderr).lines();
                    while let Ok(Some(line)) = lines.next_line().await {
                        debug!("stderr: {}", line);
                    }
                });
            }

            let status = child
                .wait()
                .await
                .with_context(|| format!("waiting for command: {command_line}"))?;

            Ok(status.code().unwrap_or(-1))
        })
    }
}
