//! Step domain model

use crate::core::error::ProvisionError;
use regex::Regex;

/// What to do when a step's command exits non-zero
#[derive(Debug, Clone, Default)]
pub enum FailurePolicy {
    /// Fail the step and abort the pipeline
    #[default]
    Abort,
    /// Swallow any failure
    Tolerate,
    /// Swallow the failure only when stderr matches the pattern
    TolerateMatching(Regex),
}

impl FailurePolicy {
    /// Check whether a failure with the given stderr is swallowed
    pub fn tolerates(&self, stderr: &str) -> bool {
        match self {
            FailurePolicy::Abort => false,
            FailurePolicy::Tolerate => true,
            FailurePolicy::TolerateMatching(pattern) => pattern.is_match(stderr),
        }
    }

    pub fn label(&self) -> String {
        match self {
            FailurePolicy::Abort => "abort".to_string(),
            FailurePolicy::Tolerate => "tolerate".to_string(),
            FailurePolicy::TolerateMatching(pattern) => format!("tolerate /{}/", pattern.as_str()),
        }
    }
}

/// A single provisioning step. Immutable once built; run state lives in
/// the pipeline's `PipelineState`.
#[derive(Debug, Clone)]
pub struct Step {
    /// Unique step name
    pub name: String,

    /// Command as an ordered list of tokens, unquoted
    pub command: Vec<String>,

    /// Endpoint or resource the step targets, if any
    pub endpoint: Option<String>,

    /// Failure handling for this step
    pub on_failure: FailurePolicy,
}

impl Step {
    /// Create a pending step that aborts the pipeline on failure
    pub fn new<I, S>(name: impl Into<String>, command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Step {
            name: name.into(),
            command: command.into_iter().map(Into::into).collect(),
            endpoint: None,
            on_failure: FailurePolicy::Abort,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.on_failure = policy;
        self
    }

    /// Reject steps that cannot be executed
    pub fn validate(&self) -> Result<(), ProvisionError> {
        if self.name.trim().is_empty() {
            return Err(ProvisionError::Config("step name must not be empty".to_string()));
        }
        if self.command.is_empty() || self.command[0].is_empty() {
            return Err(ProvisionError::Config(format!(
                "step '{}' has an empty command",
                self.name
            )));
        }
        Ok(())
    }
}
