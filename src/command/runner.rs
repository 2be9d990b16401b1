//! Child-process runner

use crate::command::Invocation;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Error types for running a command
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to start '{program}': {reason}")]
    Spawn { program: String, reason: String },

    #[error("timed out after {0} seconds")]
    Timeout(u64),
}

/// Captured result of a finished child process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Only the exit code decides success, stderr content does not
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Trait for command execution - allows for different implementations
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the invocation to completion and capture its output
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, RunnerError>;
}

/// Find `program` on `PATH`. On Windows this honors `PATHEXT`, so `.cmd` and
/// `.bat` shims such as `npx.cmd` are found. Falls back to the name as given.
pub fn locate_program(program: &str) -> PathBuf {
    locate_in(program, std::env::var_os("PATH"))
}

fn locate_in(program: &str, search_path: Option<OsString>) -> PathBuf {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    match which::which_in(program, search_path, cwd) {
        Ok(path) => path,
        Err(e) => {
            debug!("'{}' not found on PATH ({}), spawning as given", program, e);
            PathBuf::from(program)
        }
    }
}

/// Runs invocations as real child processes
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    /// Optional per-command timeout in seconds
    timeout_secs: Option<u64>,
}

impl ProcessRunner {
    pub fn new(timeout_secs: Option<u64>) -> Self {
        Self { timeout_secs }
    }

    fn command(invocation: &Invocation) -> Command {
        let mut command = match invocation {
            Invocation::Shell { shell, flag, script } => {
                let mut command = Command::new(shell);
                command.arg(flag).arg(script);
                command
            }
            Invocation::Direct { program, args } => {
                let mut command = Command::new(locate_program(program));
                command.args(args);
                command
            }
        };
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, RunnerError> {
        debug!("Spawning: {}", invocation);

        let program = match invocation {
            Invocation::Shell { shell, .. } => shell.clone(),
            Invocation::Direct { program, .. } => program.clone(),
        };
        let child = Self::command(invocation).output();

        let result = match self.timeout_secs {
            Some(secs) => timeout(Duration::from_secs(secs), child)
                .await
                .map_err(|_| RunnerError::Timeout(secs))?,
            None => child.await,
        };

        let output = result.map_err(|e| RunnerError::Spawn {
            program,
            reason: e.to_string(),
        })?;

        let captured = CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !captured.success() {
            warn!(
                "Command exited with {:?}: {}",
                captured.exit_code,
                captured.stderr.trim()
            );
        }

        Ok(captured)
    }
}
