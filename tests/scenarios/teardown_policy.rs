//! Test: Teardown Policy - a failed teardown of nothing does not stop provisioning

use crate::helpers::*;
use devstack::core::config::{Settings, TeardownPolicy};
use devstack::core::{Pipeline, StepState};
use devstack::provision::library;

fn compose_pipeline(teardown: TeardownPolicy) -> Pipeline {
    let settings = Settings {
        teardown,
        ..Settings::default()
    };
    Pipeline::new("compose", library::compose_bring_up(&settings)).unwrap()
}

#[tokio::test]
async fn test_missing_resources_are_tolerated_by_default() {
    let mut pipeline = compose_pipeline(TeardownPolicy::default());
    let runner = MockRunner::new().failing(
        "compose down",
        1,
        "Error response from daemon: No such container: api",
    );

    let result = run_pipeline_with_mock(&mut pipeline, runner).await;

    assert_pipeline_completed(&result);
    assert_outcomes(
        &result,
        &[
            ("compose-down", "Tolerated"),
            ("compose-build", "Succeeded"),
            ("compose-up", "Succeeded"),
        ],
    );
    match result.get_step_state("compose-down") {
        Some(StepState::Tolerated { exit_code, stderr, .. }) => {
            assert_eq!(*exit_code, Some(1));
            assert!(stderr.contains("No such container"));
        }
        other => panic!("unexpected state: {:?}", other),
    }
}

#[tokio::test]
async fn test_other_teardown_errors_abort_by_default() {
    let mut pipeline = compose_pipeline(TeardownPolicy::NotFound);
    let runner = MockRunner::new().failing(
        "compose down",
        1,
        "Cannot connect to the Docker daemon at unix:///var/run/docker.sock. Is the docker daemon running?",
    );

    let result = run_pipeline_with_mock(&mut pipeline, runner).await;

    assert_pipeline_aborted_at(&result, "compose-down");
    assert_eq!(result.executed_steps(), vec!["compose-down"]);
}

#[tokio::test]
async fn test_always_tolerates_any_teardown_error() {
    let mut pipeline = compose_pipeline(TeardownPolicy::Always);
    let runner = MockRunner::new().failing("compose down", 1, "Cannot connect to the Docker daemon");

    let result = run_pipeline_with_mock(&mut pipeline, runner).await;

    assert_pipeline_completed(&result);
}

#[tokio::test]
async fn test_never_aborts_on_missing_resources() {
    let mut pipeline = compose_pipeline(TeardownPolicy::Never);
    let runner = MockRunner::new().failing("compose down", 1, "No such container: api");

    let result = run_pipeline_with_mock(&mut pipeline, runner).await;

    assert_pipeline_aborted_at(&result, "compose-down");
}

#[tokio::test]
async fn test_failed_build_is_never_tolerated() {
    let mut pipeline = compose_pipeline(TeardownPolicy::Always);
    let runner = MockRunner::new().failing("compose build", 1, "No such object: base-image");

    let result = run_pipeline_with_mock(&mut pipeline, runner).await;

    assert_pipeline_aborted_at(&result, "compose-build");
    assert!(matches!(result.get_step_state("compose-up"), Some(StepState::Skipped { .. })));
}
