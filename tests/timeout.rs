#![cfg(unix)]

use std::error::Error;
use std::time::{Duration, Instant};

use cmdcapture::errors::CaptureError;
use cmdcapture::{CaptureOptions, CommandCapture, ExecutionRequest};
use cmdcapture_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

fn capture_with_grace(grace: Duration) -> CommandCapture {
    CommandCapture::with_options(CaptureOptions {
        grace_period: grace,
        ..CaptureOptions::default()
    })
}

/// Whether `pid` is still a live (non-zombie) process.
fn process_exists(pid: i32) -> bool {
    if std::path::Path::new("/proc/self").exists() {
        return match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
            // State is the first field after the parenthesised command name.
            Ok(stat) => stat
                .rsplit_once(')')
                .and_then(|(_, rest)| rest.trim_start().chars().next())
                .is_some_and(|state| state != 'Z' && state != 'X'),
            Err(_) => false,
        };
    }

    std::process::Command::new("kill")
        .args(["-0", &pid.to_string()])
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[tokio::test]
async fn long_command_raises_timeout_with_configured_value() {
    init_tracing();
    let capture = CommandCapture::new();
    let started = Instant::now();

    let err = with_timeout(capture.run_request(ExecutionRequest::new("sleep 3").timeout_secs(0.5)))
        .await
        .expect_err("sleep 3 must time out");

    let elapsed = started.elapsed();
    match &err {
        CaptureError::TimeoutFailure { command, timeout } => {
            assert_eq!(*timeout, 0.5);
            assert_eq!(command, "sleep 3");
        }
        other => panic!("Expected TimeoutFailure, got: {:?}", other),
    }
    assert!(err.is_timeout());
    assert_eq!(err.timeout(), Some(0.5));
    assert!(elapsed >= Duration::from_millis(500));
    assert!(elapsed < Duration::from_millis(2500), "took {elapsed:?}");
}

#[tokio::test]
async fn command_finishing_before_the_deadline_returns_a_result() -> TestResult {
    init_tracing();
    let capture = CommandCapture::new();

    let result = with_timeout(
        capture.run_request(ExecutionRequest::new("sleep 0.1; echo ok").timeout_secs(5.0)),
    )
    .await?;

    assert!(result.success());
    assert_eq!(result.stdout(), "ok\n");
    Ok(())
}

#[tokio::test]
async fn timeout_applies_to_non_zero_exits_too() -> TestResult {
    init_tracing();
    let capture = CommandCapture::new();

    let result = with_timeout(
        capture.run_request(ExecutionRequest::new("exit 3").timeout_secs(5.0)),
    )
    .await?;

    assert_eq!(result.return_code(), 3);
    Ok(())
}

#[tokio::test]
async fn default_timeout_from_options_is_used() {
    init_tracing();
    let capture = CommandCapture::with_options(CaptureOptions {
        timeout: Some(0.3),
        ..CaptureOptions::default()
    });

    let err = with_timeout(capture.run("sleep 3"))
        .await
        .expect_err("default timeout must apply");

    assert_eq!(err.timeout(), Some(0.3));
}

#[tokio::test]
async fn request_timeout_overrides_default() -> TestResult {
    init_tracing();
    let capture = CommandCapture::with_options(CaptureOptions {
        timeout: Some(0.1),
        ..CaptureOptions::default()
    });

    let result = with_timeout(
        capture.run_request(ExecutionRequest::new("sleep 0.3; echo ok").timeout_secs(5.0)),
    )
    .await?;

    assert_eq!(result.stdout(), "ok\n");
    Ok(())
}

#[tokio::test]
async fn grandchildren_are_terminated_on_timeout() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let pid_file = dir.path().join("child.pid");
    let capture = capture_with_grace(Duration::from_millis(500));

    let cmd = format!("sleep 30 & echo $! > {}; wait", pid_file.display());
    let err = with_timeout(capture.run_request(ExecutionRequest::new(cmd).timeout_secs(0.5)))
        .await
        .expect_err("must time out");
    assert!(err.is_timeout());

    let pid: i32 = std::fs::read_to_string(&pid_file)?.trim().parse()?;
    // Give the kernel a moment to tear down the group.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!process_exists(pid), "grandchild {pid} survived the timeout");
    Ok(())
}

#[tokio::test]
async fn sigterm_ignoring_process_is_killed_after_grace_period() {
    init_tracing();
    let capture = capture_with_grace(Duration::from_millis(300));
    let started = Instant::now();

    let err = with_timeout(capture.run_request(
        ExecutionRequest::new("trap '' TERM; sleep 30 & wait; sleep 30").timeout_secs(0.3),
    ))
    .await
    .expect_err("must time out");

    let elapsed = started.elapsed();
    assert!(err.is_timeout());
    // timeout + grace, plus slack; far below the command's own runtime.
    assert!(elapsed < Duration::from_secs(5), "took {elapsed:?}");
}

#[tokio::test]
async fn timeout_covers_pipes_held_open_by_background_children() {
    init_tracing();
    let capture = capture_with_grace(Duration::from_millis(200));
    let started = Instant::now();

    let err = with_timeout(
        capture.run_request(ExecutionRequest::new("sleep 30 & echo started").timeout_secs(0.5)),
    )
    .await
    .expect_err("open pipe must keep the invocation running until the deadline");

    assert!(err.is_timeout());
    assert!(started.elapsed() < Duration::from_secs(5));
}
