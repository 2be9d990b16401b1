//! Test utility functions for devstack
#![allow(dead_code)]

use devstack::command::{CommandOutput, CommandRunner, Invocation, Platform, RunnerError};
use devstack::core::{ExecutionStatus, Pipeline, PipelineOutcome, Step, StepState};
use devstack::execution::{ExecutionEngine, ExecutionEvent};

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Scripted response for invocations whose text contains `needle`
#[derive(Debug, Clone)]
struct Rule {
    needle: String,
    exit_code: Option<i32>,
    stderr: String,
}

/// Mock runner that records every invocation and answers from scripted rules.
/// Invocations matching no rule exit 0.
#[derive(Debug, Clone, Default)]
pub struct MockRunner {
    rules: Arc<Vec<Rule>>,
    spawn_failures: Arc<Vec<String>>,
    invocations: Arc<Mutex<Vec<Invocation>>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make invocations containing `needle` exit with `exit_code` and `stderr`
    pub fn failing(mut self, needle: &str, exit_code: i32, stderr: &str) -> Self {
        Arc::make_mut(&mut self.rules).push(Rule {
            needle: needle.to_string(),
            exit_code: Some(exit_code),
            stderr: stderr.to_string(),
        });
        self
    }

    /// Make invocations containing `needle` fail to start
    pub fn unspawnable(mut self, needle: &str) -> Self {
        Arc::make_mut(&mut self.spawn_failures).push(needle.to_string());
        self
    }

    /// Shared handle to the recorded invocations
    pub fn recorder(&self) -> Arc<Mutex<Vec<Invocation>>> {
        Arc::clone(&self.invocations)
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, RunnerError> {
        self.invocations.lock().unwrap().push(invocation.clone());
        let text = invocation.to_string();

        if self.spawn_failures.iter().any(|needle| text.contains(needle)) {
            return Err(RunnerError::Spawn {
                program: text,
                reason: "No such file or directory (os error 2)".to_string(),
            });
        }

        let output = match self.rules.iter().find(|rule| text.contains(&rule.needle)) {
            Some(rule) => CommandOutput {
                exit_code: rule.exit_code,
                stdout: String::new(),
                stderr: rule.stderr.clone(),
            },
            None => CommandOutput {
                exit_code: Some(0),
                stdout: String::new(),
                stderr: String::new(),
            },
        };
        Ok(output)
    }
}

/// Test result from running a pipeline
#[derive(Debug, Clone)]
pub struct PipelineTestResult {
    pub pipeline: Pipeline,
    pub outcome: PipelineOutcome,
    pub invocations: Vec<Invocation>,
    pub events: Vec<ExecutionEvent>,
}

impl PipelineTestResult {
    pub fn is_success(&self) -> bool {
        self.outcome.is_success() && self.pipeline.state.status == ExecutionStatus::Completed
    }

    pub fn is_aborted(&self) -> bool {
        !self.outcome.is_success() && self.pipeline.state.status == ExecutionStatus::Aborted
    }

    pub fn get_step_state(&self, name: &str) -> Option<&StepState> {
        self.pipeline.step_state(name)
    }

    /// Names of steps whose command was actually run, in run order
    pub fn executed_steps(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ExecutionEvent::StepStarted { step_name, .. } => Some(step_name.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn summary(&self) -> String {
        format!("{:?} - {:?}", self.pipeline.state.status, self.pipeline.outcomes())
    }
}

/// Run a pipeline against a mock runner on the POSIX platform
pub async fn run_pipeline_with_mock(pipeline: &mut Pipeline, runner: MockRunner) -> PipelineTestResult {
    run_pipeline_on(pipeline, runner, Platform::Posix).await
}

/// Run a pipeline against a mock runner on a given platform
pub async fn run_pipeline_on(
    pipeline: &mut Pipeline,
    runner: MockRunner,
    platform: Platform,
) -> PipelineTestResult {
    let recorder = runner.recorder();
    let events = Arc::new(Mutex::new(Vec::new()));

    let mut engine = ExecutionEngine::new(runner, platform);
    let sink = Arc::clone(&events);
    engine.add_event_handler(move |event| sink.lock().unwrap().push(event.clone()));

    let outcome = engine.execute(pipeline).await;

    let invocations = recorder.lock().unwrap().clone();
    let events = events.lock().unwrap().clone();
    PipelineTestResult {
        pipeline: pipeline.clone(),
        outcome,
        invocations,
        events,
    }
}

/// Build a pipeline from `(name, command)` pairs
pub fn pipeline_of(steps: &[(&str, &[&str])]) -> Pipeline {
    let steps = steps
        .iter()
        .map(|(name, command)| Step::new(*name, command.iter().copied()))
        .collect();
    Pipeline::new("test", steps).unwrap_or_else(|e| panic!("invalid test pipeline: {}", e))
}

/// Assert pipeline completed successfully
pub fn assert_pipeline_completed(result: &PipelineTestResult) {
    assert!(
        result.is_success(),
        "Pipeline should be completed, but was: {}",
        result.summary()
    );
}

/// Assert pipeline aborted at `step_name`
pub fn assert_pipeline_aborted_at(result: &PipelineTestResult, step_name: &str) {
    assert!(
        result.is_aborted(),
        "Pipeline should have aborted, but was: {}",
        result.summary()
    );
    match &result.outcome {
        PipelineOutcome::Failed { step_name: failed, .. } => assert_eq!(failed, step_name),
        PipelineOutcome::Success => unreachable!(),
    }
}

/// Assert the states of every step, in order, by label
pub fn assert_outcomes(result: &PipelineTestResult, expected: &[(&str, &str)]) {
    let actual = result.pipeline.outcomes();
    assert_eq!(actual, expected, "Unexpected step outcomes");
}
