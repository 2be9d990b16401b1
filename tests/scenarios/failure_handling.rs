//! Test: Failure Handling - the first failure stops the pipeline

use crate::helpers::*;
use devstack::core::{ProvisionError, StepState};

#[tokio::test]
async fn test_failure_skips_remaining_steps() {
    let mut pipeline = pipeline_of(&[
        ("compose-up", &["docker", "compose", "up", "-d"]),
        ("create-bucket", &["aws", "s3", "mb", "s3://local-bucket"]),
        ("sync-schema", &["npx", "prisma", "db", "push"]),
    ]);
    let runner = MockRunner::new().failing("s3 mb", 1, "make_bucket failed: BucketAlreadyExists");

    let result = run_pipeline_with_mock(&mut pipeline, runner).await;

    assert_pipeline_aborted_at(&result, "create-bucket");
    assert_eq!(result.executed_steps(), vec!["compose-up", "create-bucket"]);
    assert_eq!(result.invocations.len(), 2);
    assert_outcomes(
        &result,
        &[
            ("compose-up", "Succeeded"),
            ("create-bucket", "Failed"),
            ("sync-schema", "Skipped"),
        ],
    );
}

#[tokio::test]
async fn test_failure_carries_exit_code_and_stderr() {
    let mut pipeline = pipeline_of(&[("create-bucket", &["aws", "s3", "mb", "s3://b"])]);
    let runner = MockRunner::new().failing("s3 mb", 254, "BucketAlreadyOwnedByYou");

    let result = run_pipeline_with_mock(&mut pipeline, runner).await;

    match result.get_step_state("create-bucket") {
        Some(StepState::Failed { exit_code, stderr, .. }) => {
            assert_eq!(*exit_code, Some(254));
            assert_eq!(stderr, "BucketAlreadyOwnedByYou");
        }
        other => panic!("unexpected state: {:?}", other),
    }

    let err = result.outcome.clone().into_result().unwrap_err();
    assert!(matches!(
        &err,
        ProvisionError::StepFailed { step_name, stderr }
            if step_name == "create-bucket" && stderr == "BucketAlreadyOwnedByYou"
    ));
    assert_eq!(err.exit_code(), 1);
}

#[tokio::test]
async fn test_stderr_alone_does_not_fail_a_step() {
    // Exit status decides success; CLIs often print warnings on stderr
    let mut pipeline = pipeline_of(&[("noisy", &["echo", "hi"]), ("next", &["true"])]);
    let runner = MockRunner::new().failing("echo", 0, "WARNING: something");

    let result = run_pipeline_with_mock(&mut pipeline, runner).await;

    assert_pipeline_completed(&result);
    assert_eq!(result.executed_steps(), vec!["noisy", "next"]);
}

#[tokio::test]
async fn test_unlaunchable_program_fails_the_step() {
    let mut pipeline = pipeline_of(&[("missing", &["no-such-tool"]), ("next", &["true"])]);
    let runner = MockRunner::new().unspawnable("no-such-tool");

    let result = run_pipeline_with_mock(&mut pipeline, runner).await;

    assert_pipeline_aborted_at(&result, "missing");
    match result.get_step_state("missing") {
        Some(StepState::Failed { exit_code, stderr, .. }) => {
            assert_eq!(*exit_code, None);
            assert!(stderr.contains("No such file or directory"));
        }
        other => panic!("unexpected state: {:?}", other),
    }
    assert!(matches!(result.get_step_state("next"), Some(StepState::Skipped { .. })));
}

#[tokio::test]
async fn test_failure_with_empty_stderr() {
    let mut pipeline = pipeline_of(&[("quiet", &["false"])]);
    let runner = MockRunner::new().failing("false", 1, "");

    let result = run_pipeline_with_mock(&mut pipeline, runner).await;

    assert_pipeline_aborted_at(&result, "quiet");
    assert_eq!(result.pipeline.state.failed_steps, 1);
}
