//! Shell executor tests

#![cfg(unix)]

use std::time::{Duration, Instant};

use deployd::deploy::{
    FailureReason, Pipeline, PipelineExecutor, PipelineStep, PipelineResult, ShellExecutor,
};
use tempfile::TempDir;

fn executor(dir: &TempDir, commands: &[&str], timeout: Duration) -> ShellExecutor {
    ShellExecutor::new(Pipeline::in_dir(dir.path(), commands.iter().copied(), timeout))
}

#[tokio::test]
async fn test_all_steps_succeed_output_in_order() {
    let dir = TempDir::new().unwrap();
    let executor = executor(
        &dir,
        &["echo one", "echo two; echo note 1>&2", "echo three"],
        Duration::from_secs(30),
    );

    let result = executor.execute().await;

    assert!(result.success());
    assert_eq!(result.stdout(), "one\ntwo\nthree\n");
    assert_eq!(result.stderr(), "note\n");
    assert_eq!(result.failing_step_index(), None);
    assert_eq!(result.error_message(), None);
}

#[tokio::test]
async fn test_fail_fast_stops_at_failing_step() {
    let dir = TempDir::new().unwrap();
    let executor = executor(
        &dir,
        &[
            "echo first",
            "echo second; echo broken 1>&2; exit 3",
            "echo third; touch later.txt",
        ],
        Duration::from_secs(30),
    );

    let result = executor.execute().await;

    assert!(!result.success());
    assert_eq!(result.failing_step_index(), Some(1));
    assert_eq!(result.stdout(), "first\nsecond\n");
    assert_eq!(result.stderr(), "broken\n");
    assert!(!dir.path().join("later.txt").exists());

    let failure = result.failure().unwrap();
    assert_eq!(failure.reason, FailureReason::ExitStatus { code: Some(3) });
    assert_eq!(failure.command.as_deref(), Some("echo second; echo broken 1>&2; exit 3"));
    assert!(result.error_message().unwrap().contains("exited with status 3"));
}

#[tokio::test]
async fn test_first_step_failure() {
    let dir = TempDir::new().unwrap();
    let executor = executor(&dir, &["exit 1", "echo unreachable"], Duration::from_secs(30));

    let result = executor.execute().await;

    assert_eq!(result.failing_step_index(), Some(0));
    assert_eq!(result.stdout(), "");
}

#[tokio::test]
async fn test_steps_share_working_directory() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("marker.txt"), "present\n").unwrap();
    let executor = executor(
        &dir,
        &["cat marker.txt", "echo built > artifact.txt", "cat artifact.txt"],
        Duration::from_secs(30),
    );

    let result = executor.execute().await;

    assert!(result.success());
    assert_eq!(result.stdout(), "present\nbuilt\n");
}

#[tokio::test]
async fn test_step_specific_working_directory() {
    let dir = TempDir::new().unwrap();
    let sub = dir.path().join("frontend");
    std::fs::create_dir(&sub).unwrap();
    std::fs::write(sub.join("name.txt"), "frontend\n").unwrap();

    let pipeline = Pipeline::new(
        vec![
            PipelineStep::new("test -d frontend", dir.path()),
            PipelineStep::new("cat name.txt", &sub),
        ],
        Duration::from_secs(30),
    );

    let result = ShellExecutor::new(pipeline).execute().await;

    assert!(result.success());
    assert_eq!(result.stdout(), "frontend\n");
}

#[tokio::test]
async fn test_timeout_kills_step_and_reports_timeout() {
    let dir = TempDir::new().unwrap();
    let executor = executor(
        &dir,
        &["echo started", "sleep 30", "echo never"],
        Duration::from_millis(300),
    );

    let started = Instant::now();
    let result = executor.execute().await;

    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(!result.success());
    assert_eq!(result.failing_step_index(), Some(1));
    assert_eq!(result.stdout(), "started\n");

    let failure = result.failure().unwrap();
    assert!(failure.is_timeout());
    assert!(result.error_message().unwrap().contains("timed out"));
}

#[tokio::test]
async fn test_timeout_kills_background_children() {
    let dir = TempDir::new().unwrap();
    let executor = executor(
        &dir,
        &["(sleep 2; touch late.txt) & wait"],
        Duration::from_millis(300),
    );

    let result = executor.execute().await;
    assert!(result.failure().unwrap().is_timeout());

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(!dir.path().join("late.txt").exists());
}

#[tokio::test]
async fn test_background_process_left_by_step_does_not_block() {
    let dir = TempDir::new().unwrap();
    let executor = executor(
        &dir,
        &["echo up; (sleep 1; touch daemon.txt) &", "echo next"],
        Duration::from_secs(3),
    );

    let started = Instant::now();
    let result = executor.execute().await;

    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(result.success(), "{:?}", result.error_message());
    assert_eq!(result.stdout(), "up\nnext\n");

    // The process started by the first step is not killed.
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(dir.path().join("daemon.txt").exists());
}

#[tokio::test]
async fn test_missing_working_directory_is_spawn_failure() {
    let pipeline = Pipeline::new(
        vec![PipelineStep::new("true", "/no/such/checkout/dir")],
        Duration::from_secs(30),
    );

    let result = ShellExecutor::new(pipeline).execute().await;

    assert_eq!(result.failing_step_index(), Some(0));
    assert!(matches!(
        result.failure().unwrap().reason,
        FailureReason::Spawn { .. }
    ));
}

#[tokio::test]
async fn test_signal_exit_has_no_code() {
    let dir = TempDir::new().unwrap();
    let executor = executor(&dir, &["kill -9 $$"], Duration::from_secs(30));

    let result = executor.execute().await;

    assert_eq!(
        result.failure().unwrap().reason,
        FailureReason::ExitStatus { code: None }
    );
}

#[tokio::test]
async fn test_empty_pipeline_fails_without_running() {
    let result = ShellExecutor::new(Pipeline::new(vec![], Duration::from_secs(30)))
        .execute()
        .await;

    match result {
        PipelineResult::Failure { failure, output } => {
            assert_eq!(failure.reason, FailureReason::EmptyPipeline);
            assert_eq!(failure.step_index, None);
            assert_eq!(output.stdout, "");
        }
        PipelineResult::Success(_) => panic!("empty pipeline must not succeed"),
    }
}
