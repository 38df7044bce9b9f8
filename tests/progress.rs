#![cfg(unix)]

use std::error::Error;
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};
use std::time::Duration;

use cmdcapture::{CommandCapture, ExecutionRequest};
use cmdcapture_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

fn collector() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) + Send + Sync + 'static) {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&lines);
    (lines, move |line: &str| sink.lock().unwrap().push(line.to_string()))
}

#[tokio::test]
async fn callback_sees_every_stdout_line_in_order() -> TestResult {
    init_tracing();
    let capture = CommandCapture::new();
    let (lines, sink) = collector();

    let result = with_timeout(capture.run_request(
        ExecutionRequest::new("for i in 0 1 2; do echo \"Line $i\"; sleep 0.05; done").on_line(sink),
    ))
    .await?;

    assert_eq!(*lines.lock().unwrap(), vec!["Line 0", "Line 1", "Line 2"]);
    // The buffer is complete regardless of the callback.
    assert_eq!(result.stdout(), "Line 0\nLine 1\nLine 2\n");
    Ok(())
}

#[tokio::test]
async fn callback_ignores_stderr() -> TestResult {
    init_tracing();
    let capture = CommandCapture::new();
    let (lines, sink) = collector();

    let result = with_timeout(
        capture.run_request(ExecutionRequest::new("echo out; echo err >&2").on_line(sink)),
    )
    .await?;

    assert_eq!(*lines.lock().unwrap(), vec!["out"]);
    assert_eq!(result.stderr(), "err\n");
    Ok(())
}

#[tokio::test]
async fn unterminated_last_fragment_is_delivered() -> TestResult {
    init_tracing();
    let capture = CommandCapture::new();
    let (lines, sink) = collector();

    let result = with_timeout(
        capture.run_request(ExecutionRequest::new("printf 'a\\nb\\n\\ntail'").on_line(sink)),
    )
    .await?;

    assert_eq!(*lines.lock().unwrap(), vec!["a", "b", "", "tail"]);
    assert_eq!(result.stdout(), "a\nb\n\ntail");
    Ok(())
}

#[tokio::test]
async fn crlf_endings_are_stripped_from_lines_but_kept_in_stdout() -> TestResult {
    init_tracing();
    let capture = CommandCapture::new();
    let (lines, sink) = collector();

    let result = with_timeout(
        capture.run_request(ExecutionRequest::new("printf 'one\\r\\ntwo\\rstill two\\n'").on_line(sink)),
    )
    .await?;

    assert_eq!(*lines.lock().unwrap(), vec!["one", "two\rstill two"]);
    assert_eq!(result.stdout(), "one\r\ntwo\rstill two\n");
    Ok(())
}

#[tokio::test]
async fn callback_runs_off_the_calling_thread() -> TestResult {
    init_tracing();
    let capture = CommandCapture::new();
    let caller = thread::current().id();
    let seen: Arc<Mutex<Vec<ThreadId>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    with_timeout(capture.run_request(
        ExecutionRequest::new("echo a; echo b").on_line(move |_| sink.lock().unwrap().push(thread::current().id())),
    ))
    .await?;

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert!(seen.iter().all(|id| *id != caller));
    Ok(())
}

#[tokio::test]
async fn panicking_callback_does_not_break_capture() -> TestResult {
    init_tracing();
    let capture = CommandCapture::new();
    let (lines, sink) = collector();

    let result = with_timeout(capture.run_request(
        ExecutionRequest::new("echo first; echo boom; echo last").on_line(move |line| {
            if line == "boom" {
                panic!("callback failure");
            }
            sink(line);
        }),
    ))
    .await?;

    assert!(result.success());
    assert_eq!(result.stdout(), "first\nboom\nlast\n");
    assert_eq!(*lines.lock().unwrap(), vec!["first", "last"]);
    Ok(())
}

#[tokio::test]
async fn callback_without_output_is_never_called() -> TestResult {
    init_tracing();
    let capture = CommandCapture::new();
    let (lines, sink) = collector();

    with_timeout(capture.run_request(ExecutionRequest::new("true").on_line(sink))).await?;

    assert!(lines.lock().unwrap().is_empty());
    Ok(())
}

fn slow_collector(delay: Duration) -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) + Send + Sync + 'static) {
    let (lines, sink) = collector();
    (lines, move |line: &str| {
        thread::sleep(delay);
        sink(line);
    })
}

#[tokio::test]
async fn slow_callback_after_fast_exit_is_not_a_timeout() -> TestResult {
    init_tracing();
    let capture = CommandCapture::new();
    let (lines, sink) = slow_collector(Duration::from_millis(200));

    let result = with_timeout(capture.run_request(
        ExecutionRequest::new("printf 'a\\nb\\nc\\nd\\n'")
            .timeout_secs(0.3)
            .on_line(sink),
    ))
    .await?;

    assert_eq!(result.return_code(), 0);
    assert_eq!(*lines.lock().unwrap(), vec!["a", "b", "c", "d"]);
    Ok(())
}

#[tokio::test]
async fn no_callback_runs_after_a_timeout_returns() -> TestResult {
    init_tracing();
    let capture = CommandCapture::new();
    let (lines, sink) = slow_collector(Duration::from_millis(200));

    let outcome = with_timeout(capture.run_request(
        ExecutionRequest::new("printf 'a\\nb\\nc\\nd\\n'; sleep 5")
            .timeout_secs(0.3)
            .on_line(sink),
    ))
    .await;

    match outcome {
        Err(err) => assert!(err.is_timeout(), "unexpected error: {err}"),
        Ok(result) => panic!("expected a timeout, got {result}"),
    }

    let delivered_at_return = lines.lock().unwrap().len();
    assert!(delivered_at_return < 4, "delivered {delivered_at_return} lines");

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(lines.lock().unwrap().len(), delivered_at_return);
    Ok(())
}
