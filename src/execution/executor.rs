//! Step executor - runs a single step's command

use crate::{
    command::{resolve, CommandRunner, Platform},
    core::Step,
};
use tracing::{debug, info, warn, error};

/// Result of executing a step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResult {
    /// Command exited zero
    Success {
        stdout: String,
    },
    /// Command failed but the step's policy swallowed it
    Tolerated {
        exit_code: Option<i32>,
        stderr: String,
    },
    /// Command failed, or could not be started
    Failed {
        exit_code: Option<i32>,
        stderr: String,
    },
}

/// Executes a single step
pub struct StepExecutor<R> {
    runner: R,
    platform: Platform,
}

impl<R: CommandRunner> StepExecutor<R> {
    pub fn new(runner: R, platform: Platform) -> Self {
        Self { runner, platform }
    }

    /// Execute a step and return the result
    pub async fn execute(&self, step: &Step) -> ExecutionResult {
        info!("Executing step: {}", step.name);

        let invocation = match resolve(&step.command, self.platform) {
            Ok(invocation) => invocation,
            Err(e) => {
                error!("Cannot resolve command for step {}: {}", step.name, e);
                return ExecutionResult::Failed {
                    exit_code: None,
                    stderr: e.to_string(),
                };
            }
        };
        debug!("Resolved command for step {}: {}", step.name, invocation);

        let (exit_code, stderr) = match self.runner.run(&invocation).await {
            Ok(output) if output.success() => {
                if !output.stderr.trim().is_empty() {
                    debug!("Step {} wrote to stderr: {}", step.name, output.stderr.trim());
                }
                info!("Step {} completed successfully", step.name);
                return ExecutionResult::Success { stdout: output.stdout };
            }
            Ok(output) => (output.exit_code, output.stderr.trim().to_string()),
            Err(e) => (None, e.to_string()),
        };

        if step.on_failure.tolerates(&stderr) {
            warn!(
                "Step {} failed with {:?}, tolerated by its failure policy: {}",
                step.name, exit_code, stderr
            );
            return ExecutionResult::Tolerated { exit_code, stderr };
        }

        error!("Step {} failed with {:?}: {}", step.name, exit_code, stderr);
        ExecutionResult::Failed { exit_code, stderr }
    }
}
