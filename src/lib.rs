//! devstack - provisions a local multi-service development environment

pub mod cli;
pub mod command;
pub mod core;
pub mod execution;
pub mod provision;

// Re-export commonly used types
pub use crate::command::{CommandOutput, CommandRunner, Invocation, Platform, ProcessRunner, RunnerError};
pub use crate::core::{ExecutionStatus, Pipeline, PipelineOutcome, ProvisionError, Step, StepState};
pub use crate::execution::{ExecutionEngine, ExecutionEvent};
