//! Provisioning error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that end a provisioning run
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The credentials precondition is not met (file, profile or field missing)
    #[error("credentials missing ({path}): {reason}. Run `aws configure` once to create them")]
    CredentialsMissing { path: PathBuf, reason: String },

    /// An external command exited non-zero
    #[error("step '{step_name}' failed: {stderr}")]
    StepFailed { step_name: String, stderr: String },

    /// Filesystem failure while reading or writing run files
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// The table schema file is not a JSON array of objects
    #[error("invalid schema file {path}: {reason}")]
    Schema { path: PathBuf, reason: String },

    /// Invalid settings, pipeline definition or input
    #[error("configuration error: {0}")]
    Config(String),
}

impl ProvisionError {
    /// Process exit code for this error.
    ///
    /// `0` is reserved for full completion.
    pub fn exit_code(&self) -> i32 {
        match self {
            ProvisionError::StepFailed { .. } => 1,
            ProvisionError::CredentialsMissing { .. } => 2,
            ProvisionError::Io(_) | ProvisionError::Schema { .. } | ProvisionError::Config(_) => 3,
        }
    }
}
