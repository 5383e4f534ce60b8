#![allow(dead_code, unused_imports)]

use std::sync::Arc;
use std::time::Duration;

pub use impress_test_utils::builders::{html_result, ConfigBuilder};
pub use impress_test_utils::fake_backend::{FakeAttempt, ScriptedBackend};
pub use impress_test_utils::recording::{Observed, RecordingObserver, RecordingSink};
pub use impress_test_utils::{init_tracing, with_timeout};

use impress::config::ImpressConfig;
use impress::engine::{CancelHandle, Job, Orchestrator};
use impress::exec::RendererBackend;

/// Orchestrator wired to a recording sink and observer.
pub fn orchestrator<B: RendererBackend>(
    config: ImpressConfig,
    job: Job,
    backend: B,
) -> (Orchestrator<B>, CancelHandle, RecordingSink, RecordingObserver) {
    let sink = RecordingSink::default();
    let observer = RecordingObserver::default();
    let (orch, cancel) = Orchestrator::new(config, job, backend, sink.boxed());
    let orch = orch.with_observer(Arc::new(observer.clone()));
    (orch, cancel, sink, observer)
}

pub fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}
