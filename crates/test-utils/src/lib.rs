pub mod builders;
pub mod fake_backend;
pub mod recording;

use std::future::Future;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

/// Upper bound for a whole test scenario, including real engine processes.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Route `tracing` output from the crate under test into the test harness.
///
/// `RUST_LOG` overrides the default of debug logs for `impress` and warnings
/// for everything else. Output is captured per test and only shown for
/// failures. Calling this more than once is harmless.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("impress=debug,warn"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .with_target(true)
        .try_init();
}

/// Await `fut`, failing the test if it takes longer than [`TEST_TIMEOUT`].
pub async fn with_timeout<F: Future>(fut: F) -> F::Output {
    within(TEST_TIMEOUT, fut).await
}

/// Await `fut`, failing the test if it takes longer than `limit`.
pub async fn within<F: Future>(limit: Duration, fut: F) -> F::Output {
    match tokio::time::timeout(limit, fut).await {
        Ok(output) => output,
        Err(_) => panic!("scenario did not finish within {limit:?}"),
    }
}
