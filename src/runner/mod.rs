use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

use crate::Result;

/// Captured outcome of one external tool invocation. Streams are fully
/// buffered; nothing is parsed until the process has terminated.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_ok: bool,
}

/// Capability for spawning external tools. Injected into the adapters so
/// tests can substitute a deterministic fake instead of real processes.
#[async_trait]
pub trait ToolRunner: Send + Sync {
    /// Run a program to completion with captured stdout/stderr
    async fn run(&self, program: &str, args: &[String]) -> Result<ToolOutput>;
}

/// Production runner backed by `tokio::process`
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolRunner for SystemRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<ToolOutput> {
        tracing::debug!("Spawning: {} {}", program, args.join(" "));

        let output = Command::new(program)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        Ok(ToolOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_ok: output.status.success(),
        })
    }
}

/// Check if a command is available in PATH
pub async fn command_available(command: &str) -> bool {
    Command::new(command)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|status| status.success())
        .unwrap_or(false)
}
