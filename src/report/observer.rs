// src/report/observer.rs

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use tracing::{error, info, warn};

use crate::errors::AttemptError;

/// Receiver of diagnostic events, keyed by page URL.
///
/// Delivery is fire-and-forget. All methods default to doing nothing so
/// implementations only override what they care about.
pub trait ImpressObserver: Send + Sync {
    /// An attempt failed; a retry follows unless the deadline intervenes.
    fn on_attempt_failed(&self, _url: &str, _attempt: u32, _error: &AttemptError) {}

    /// The next attempt is scheduled after `delay`.
    fn on_retry(&self, _url: &str, _next_attempt: u32, _delay: Duration) {}

    /// Attempt `attempt` produced valid content after `elapsed`.
    fn on_success(&self, _url: &str, _attempt: u32, _elapsed: Duration) {}

    fn on_warnings(&self, _url: &str, _warnings: &[String]) {}

    fn on_notices(&self, _url: &str, _notices: &[String]) {}

    /// The overall deadline expired before a successful attempt.
    fn on_timeout(&self, _url: &str, _timeout: Duration) {}
}

/// Observer that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ImpressObserver for NoopObserver {}

/// Observer that logs every event through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ImpressObserver for TracingObserver {
    fn on_attempt_failed(&self, url: &str, attempt: u32, error: &AttemptError) {
        error!(url, attempt, %error, "page could not be impressed; trying next attempt");
    }

    fn on_retry(&self, url: &str, next_attempt: u32, delay: Duration) {
        info!(
            url,
            attempt = next_attempt,
            delay_ms = delay.as_millis() as u64,
            "retry scheduled"
        );
    }

    fn on_success(&self, url: &str, attempt: u32, elapsed: Duration) {
        info!(
            url,
            attempt,
            elapsed_ms = elapsed.as_millis() as u64,
            "page impressed"
        );
    }

    fn on_warnings(&self, url: &str, warnings: &[String]) {
        warn!(url, count = warnings.len(), "impress warnings:\n{}", warnings.join("\n"));
    }

    fn on_notices(&self, url: &str, notices: &[String]) {
        info!(url, count = notices.len(), "impress notices:\n{}", notices.join("\n"));
    }

    fn on_timeout(&self, url: &str, timeout: Duration) {
        error!(url, timeout_ms = timeout.as_millis() as u64, "impress timeout");
    }
}

/// Run a caller-supplied callback, logging instead of unwinding if it panics.
///
/// Returns `false` if the callback panicked.
pub(crate) fn guarded<F: FnOnce()>(what: &str, f: F) -> bool {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(()) => true,
        Err(panic) => {
            let msg = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            error!(callback = what, panic = %msg, "callback panicked; continuing");
            false
        }
    }
}
