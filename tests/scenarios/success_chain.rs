//! Test: Success Chain - every step runs once, in order

use crate::helpers::*;
use devstack::command::{Invocation, Platform};
use devstack::core::StepState;
use devstack::execution::ExecutionEvent;

#[tokio::test]
async fn test_all_steps_run_in_order() {
    let mut pipeline = pipeline_of(&[
        ("first", &["echo", "one"]),
        ("second", &["echo", "two"]),
        ("third", &["echo", "three"]),
    ]);

    let result = run_pipeline_with_mock(&mut pipeline, MockRunner::new()).await;

    assert_pipeline_completed(&result);
    assert_eq!(result.executed_steps(), vec!["first", "second", "third"]);
    assert_outcomes(
        &result,
        &[("first", "Succeeded"), ("second", "Succeeded"), ("third", "Succeeded")],
    );
    assert_eq!(result.pipeline.state.succeeded_steps, 3);
    assert_eq!(result.pipeline.state.progress(), 1.0);
}

#[tokio::test]
async fn test_posix_invocations_go_through_shell() {
    let mut pipeline = pipeline_of(&[("greet", &["echo", "hello world"])]);

    let result = run_pipeline_with_mock(&mut pipeline, MockRunner::new()).await;

    assert_eq!(
        result.invocations,
        vec![Invocation::Shell {
            shell: "sh".to_string(),
            flag: "-c".to_string(),
            script: "echo 'hello world'".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_windows_invocations_pass_tokens_through() {
    let mut pipeline = pipeline_of(&[("greet", &["echo", "hello world"])]);

    let result = run_pipeline_on(&mut pipeline, MockRunner::new(), Platform::Windows).await;

    assert_pipeline_completed(&result);
    assert_eq!(
        result.invocations,
        vec![Invocation::Direct {
            program: "echo".to_string(),
            args: vec!["hello world".to_string()],
        }]
    );
}

#[tokio::test]
async fn test_events_bracket_the_run() {
    let mut pipeline = pipeline_of(&[("only", &["true"])]);

    let result = run_pipeline_with_mock(&mut pipeline, MockRunner::new()).await;

    assert!(matches!(
        result.events.first(),
        Some(ExecutionEvent::PipelineStarted { total_steps: 1, .. })
    ));
    assert!(matches!(
        result.events.last(),
        Some(ExecutionEvent::PipelineFinished { .. })
    ));
    assert!(matches!(
        result.get_step_state("only"),
        Some(StepState::Succeeded { .. })
    ));
}

#[tokio::test]
async fn test_rerun_starts_from_pending() {
    let mut pipeline = pipeline_of(&[("a", &["true"]), ("b", &["true"])]);

    let first = run_pipeline_with_mock(&mut pipeline, MockRunner::new().failing("true", 1, "boom")).await;
    assert_pipeline_aborted_at(&first, "a");

    let second = run_pipeline_with_mock(&mut pipeline, MockRunner::new()).await;
    assert_pipeline_completed(&second);
    assert_ne!(first.pipeline.state.execution_id, second.pipeline.state.execution_id);
    assert_eq!(second.pipeline.state.failed_steps, 0);
}
