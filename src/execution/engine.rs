//! Main execution engine - runs a pipeline's steps in order, fail-fast

use crate::{
    command::CommandRunner,
    core::{ExecutionStatus, Pipeline, PipelineOutcome, StepState},
    execution::{ExecutionResult, StepExecutor},
    command::Platform,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Events that can occur during pipeline execution
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    PipelineStarted {
        execution_id: Uuid,
        pipeline_name: String,
        total_steps: usize,
    },
    StepStarted {
        step_name: String,
        index: usize,
        total: usize,
        endpoint: Option<String>,
    },
    StepSucceeded {
        step_name: String,
    },
    StepTolerated {
        step_name: String,
        exit_code: Option<i32>,
        stderr: String,
    },
    StepFailed {
        step_name: String,
        exit_code: Option<i32>,
        stderr: String,
    },
    StepSkipped {
        step_name: String,
    },
    PipelineFinished {
        execution_id: Uuid,
        status: ExecutionStatus,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(&ExecutionEvent) + Send + Sync>;

/// Sequential pipeline execution engine.
///
/// Steps run one at a time in definition order. The first failure aborts the
/// run and every later step is marked skipped. Nothing already brought up is
/// undone and nothing is retried.
pub struct ExecutionEngine<R> {
    executor: StepExecutor<R>,
    event_handlers: Vec<EventHandler>,
}

impl<R: CommandRunner> ExecutionEngine<R> {
    pub fn new(runner: R, platform: Platform) -> Self {
        Self {
            executor: StepExecutor::new(runner, platform),
            event_handlers: Vec::new(),
        }
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(&ExecutionEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Arc::new(handler));
    }

    fn emit_event(&self, event: ExecutionEvent) {
        for handler in &self.event_handlers {
            handler(&event);
        }
    }

    /// Execute the entire pipeline
    pub async fn execute(&self, pipeline: &mut Pipeline) -> PipelineOutcome {
        pipeline.reset();
        let execution_id = pipeline.state.execution_id;
        let total = pipeline.steps().len();

        info!("Starting pipeline execution: {} ({})", pipeline.name, execution_id);
        self.emit_event(ExecutionEvent::PipelineStarted {
            execution_id,
            pipeline_name: pipeline.name.clone(),
            total_steps: total,
        });
        pipeline.state.start();

        let mut outcome = PipelineOutcome::Success;

        for index in 0..total {
            if let PipelineOutcome::Failed { step_name, .. } = &outcome {
                let reason = format!("aborted after step '{}' failed", step_name);
                pipeline.state.set_step_state(index, StepState::Skipped { reason });
                self.emit_event(ExecutionEvent::StepSkipped {
                    step_name: pipeline.steps()[index].name.clone(),
                });
                continue;
            }

            let started_at = Utc::now();
            let step = pipeline.steps()[index].clone();
            pipeline.state.set_step_state(index, StepState::Running { started_at });

            self.emit_event(ExecutionEvent::StepStarted {
                step_name: step.name.clone(),
                index: index + 1,
                total,
                endpoint: step.endpoint.clone(),
            });

            let result = self.executor.execute(&step).await;
            let finished_at = Utc::now();

            let (state, event) = match result {
                ExecutionResult::Success { .. } => {
                    pipeline.state.succeeded_steps += 1;
                    (
                        StepState::Succeeded {
                            started_at,
                            completed_at: finished_at,
                        },
                        ExecutionEvent::StepSucceeded {
                            step_name: step.name.clone(),
                        },
                    )
                }
                ExecutionResult::Tolerated { exit_code, stderr } => {
                    pipeline.state.succeeded_steps += 1;
                    warn!("Continuing past tolerated failure of step {}", step.name);
                    (
                        StepState::Tolerated {
                            exit_code,
                            stderr: stderr.clone(),
                            started_at,
                            completed_at: finished_at,
                        },
                        ExecutionEvent::StepTolerated {
                            step_name: step.name.clone(),
                            exit_code,
                            stderr,
                        },
                    )
                }
                ExecutionResult::Failed { exit_code, stderr } => {
                    pipeline.state.failed_steps += 1;
                    outcome = PipelineOutcome::Failed {
                        step_name: step.name.clone(),
                        stderr: stderr.clone(),
                    };
                    (
                        StepState::Failed {
                            exit_code,
                            stderr: stderr.clone(),
                            started_at,
                            failed_at: finished_at,
                        },
                        ExecutionEvent::StepFailed {
                            step_name: step.name.clone(),
                            exit_code,
                            stderr,
                        },
                    )
                }
            };

            pipeline.state.set_step_state(index, state);
            self.emit_event(event);
        }

        let status = if outcome.is_success() {
            pipeline.state.complete();
            ExecutionStatus::Completed
        } else {
            pipeline.state.abort();
            ExecutionStatus::Aborted
        };

        match &outcome {
            PipelineOutcome::Success => {
                info!("Pipeline execution finished: {} - {:?}", pipeline.name, status)
            }
            PipelineOutcome::Failed { step_name, .. } => error!(
                "Pipeline {} aborted at step {} ({:.0}% of steps run)",
                pipeline.name,
                step_name,
                pipeline.state.progress() * 100.0
            ),
        }
        self.emit_event(ExecutionEvent::PipelineFinished {
            execution_id,
            status,
        });

        outcome
    }
}
