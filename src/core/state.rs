//! Execution state models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Overall pipeline execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    /// Pipeline has not started
    Pending,
    /// Pipeline is currently running
    Running,
    /// Every step succeeded (or had its failure tolerated)
    Completed,
    /// A step failed and the remaining steps were skipped
    Aborted,
}

/// State of a single step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StepState {
    /// Step has not run yet
    Pending,
    /// Step's command is currently running
    Running {
        started_at: DateTime<Utc>,
    },
    /// Command exited zero
    Succeeded {
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    },
    /// Command exited non-zero but the step's failure policy swallowed it
    Tolerated {
        exit_code: Option<i32>,
        stderr: String,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    },
    /// Command exited non-zero (or could not be run)
    Failed {
        exit_code: Option<i32>,
        stderr: String,
        started_at: DateTime<Utc>,
        failed_at: DateTime<Utc>,
    },
    /// Step never ran because an earlier step failed
    Skipped {
        reason: String,
    },
}

impl StepState {
    /// Check if step is in a terminal state
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StepState::Pending | StepState::Running { .. })
    }

    /// Check if the step finished without failing the pipeline
    pub fn is_success(&self) -> bool {
        matches!(self, StepState::Succeeded { .. } | StepState::Tolerated { .. })
    }

    /// Short label for logs and summaries
    pub fn label(&self) -> &'static str {
        match self {
            StepState::Pending => "Pending",
            StepState::Running { .. } => "Running",
            StepState::Succeeded { .. } => "Succeeded",
            StepState::Tolerated { .. } => "Tolerated",
            StepState::Failed { .. } => "Failed",
            StepState::Skipped { .. } => "Skipped",
        }
    }
}

/// Overall pipeline state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineState {
    /// Unique execution ID
    pub execution_id: Uuid,

    /// Current execution status
    pub status: ExecutionStatus,

    /// When execution started
    pub started_at: Option<DateTime<Utc>>,

    /// When execution completed/aborted
    pub completed_at: Option<DateTime<Utc>>,

    /// Total number of steps
    pub total_steps: usize,

    /// Number of steps that finished without failing
    pub succeeded_steps: usize,

    /// Number of failed steps (zero or one, the pipeline is fail-fast)
    pub failed_steps: usize,

    /// Per-step state, indexed like the pipeline's steps
    pub(crate) step_states: Vec<StepState>,
}

impl PipelineState {
    /// Create a fresh state with every step pending
    pub fn new(total_steps: usize) -> Self {
        Self {
            execution_id: Uuid::new_v4(),
            status: ExecutionStatus::Pending,
            started_at: None,
            completed_at: None,
            total_steps,
            succeeded_steps: 0,
            failed_steps: 0,
            step_states: vec![StepState::Pending; total_steps],
        }
    }

    /// State of the step at `index`
    pub fn step_state(&self, index: usize) -> Option<&StepState> {
        self.step_states.get(index)
    }

    pub(crate) fn set_step_state(&mut self, index: usize, state: StepState) {
        if let Some(slot) = self.step_states.get_mut(index) {
            *slot = state;
        }
    }

    /// Mark pipeline as started
    pub fn start(&mut self) {
        self.status = ExecutionStatus::Running;
        self.started_at = Some(Utc::now());
        self.succeeded_steps = 0;
        self.failed_steps = 0;
    }

    /// Mark pipeline as completed
    pub fn complete(&mut self) {
        self.status = ExecutionStatus::Completed;
        self.completed_at = Some(Utc::now());
    }

    /// Mark pipeline as aborted
    pub fn abort(&mut self) {
        self.status = ExecutionStatus::Aborted;
        self.completed_at = Some(Utc::now());
    }

    /// Calculate progress percentage (0.0 to 1.0)
    pub fn progress(&self) -> f64 {
        if self.total_steps == 0 {
            return 0.0;
        }
        (self.succeeded_steps + self.failed_steps) as f64 / self.total_steps as f64
    }
}
