//! Shared fixtures for the `regenwatch` integration tests.

pub mod builders;
pub mod scripted_backend;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

/// Budget for tests that talk to a real local server.
pub const TEST_DEADLINE: Duration = Duration::from_secs(5);

static TRACING: Once = Once::new();

/// Route watcher logs through the test harness. `RUST_LOG` picks the filter,
/// `info` otherwise.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .init();
    });
}

/// Await `fut`, panicking once [`TEST_DEADLINE`] passes.
pub async fn with_timeout<F: Future>(fut: F) -> F::Output {
    match tokio::time::timeout(TEST_DEADLINE, fut).await {
        Ok(output) => output,
        Err(_) => panic!("test exceeded {TEST_DEADLINE:?}"),
    }
}
