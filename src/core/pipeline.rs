//! Pipeline domain model

use crate::core::{
    error::ProvisionError,
    state::{ExecutionStatus, PipelineState, StepState},
    step::Step,
};
use std::collections::HashSet;

/// An ordered list of provisioning steps
#[derive(Debug, Clone)]
pub struct Pipeline {
    /// Pipeline name
    pub name: String,

    /// Steps in execution order
    steps: Vec<Step>,

    /// Execution state
    pub state: PipelineState,
}

/// Result of running a pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Every step succeeded or had its failure tolerated
    Success,
    /// The named step failed; later steps were skipped
    Failed { step_name: String, stderr: String },
}

impl PipelineOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PipelineOutcome::Success)
    }

    /// Convert into the run's error type
    pub fn into_result(self) -> Result<(), ProvisionError> {
        match self {
            PipelineOutcome::Success => Ok(()),
            PipelineOutcome::Failed { step_name, stderr } => {
                Err(ProvisionError::StepFailed { step_name, stderr })
            }
        }
    }
}

impl Pipeline {
    /// Create a pipeline, validating every step and name uniqueness
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Result<Self, ProvisionError> {
        let mut seen = HashSet::new();
        for step in &steps {
            step.validate()?;
            if !seen.insert(step.name.as_str()) {
                return Err(ProvisionError::Config(format!(
                    "duplicate step name: {}",
                    step.name
                )));
            }
        }

        Ok(Pipeline {
            name: name.into(),
            state: PipelineState::new(steps.len()),
            steps,
        })
    }

    /// Steps in execution order
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.name == name)
    }

    /// Get a step by name
    pub fn step(&self, name: &str) -> Option<&Step> {
        self.position(name).map(|index| &self.steps[index])
    }

    /// Current state of the named step
    pub fn step_state(&self, name: &str) -> Option<&StepState> {
        self.position(name)
            .and_then(|index| self.state.step_state(index))
    }

    fn states(&self) -> impl Iterator<Item = (&Step, &StepState)> {
        self.steps.iter().zip(self.state.step_states.iter())
    }

    /// Per-step state labels in execution order
    pub fn outcomes(&self) -> Vec<(&str, &'static str)> {
        self.states()
            .map(|(step, state)| (step.name.as_str(), state.label()))
            .collect()
    }

    /// Check if pipeline was aborted
    pub fn has_failed(&self) -> bool {
        self.state.status == ExecutionStatus::Aborted
    }

    /// The step that aborted the pipeline, if any
    pub fn failed_step(&self) -> Option<&Step> {
        self.states()
            .find(|(_, state)| matches!(state, StepState::Failed { .. }))
            .map(|(step, _)| step)
    }

    /// Put every step back to `Pending` under a new execution id
    pub fn reset(&mut self) {
        self.state = PipelineState::new(self.steps.len());
    }
}
