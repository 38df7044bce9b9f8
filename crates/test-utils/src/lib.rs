//! Shared helpers for the `cmdcapture` integration tests.

pub mod builders;
pub mod fake_executor;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

/// Upper bound for any single test body that spawns real processes.
pub const TEST_DEADLINE: Duration = Duration::from_secs(10);

static TRACING: Once = Once::new();

/// Route `tracing` output of the crate under test into the libtest capture
/// buffer. Filter with `RUST_LOG`; defaults to `cmdcapture=debug`, which
/// shows every invocation state change of a failing test.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("cmdcapture=debug"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .init();
    });
}

/// Fail the test instead of hanging when a child or drain never finishes.
pub async fn with_timeout<F, T>(fut: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(TEST_DEADLINE, fut).await {
        Ok(out) => out,
        Err(_) => panic!("test body exceeded {TEST_DEADLINE:?}"),
    }
}
