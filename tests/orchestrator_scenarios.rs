mod common;
use crate::common::*;

use std::sync::Arc;

use impress::engine::{Job, JobOutcome, Phase};
use impress::errors::AttemptError;
use impress::exec::AttemptResult;
use impress::types::ExtraArgs;
use impress::validate::ValidationError;
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn first_attempt_success_is_delivered_once() {
    init_tracing();

    let backend = ScriptedBackend::always(FakeAttempt::Succeed {
        after: ms(200),
        result: html_result("hello"),
    });
    let log = backend.log();
    let (orch, _cancel, sink, observer) = orchestrator(
        ConfigBuilder::new().build(),
        Job::new("http://x", ms(5000)),
        backend,
    );

    let start = Instant::now();
    let phase = orch.run().await;

    assert_eq!(phase, Phase::Succeeded);
    assert_eq!(start.elapsed(), ms(200));
    assert_eq!(log.count(), 1);
    assert_eq!(
        sink.deliveries(),
        vec![JobOutcome::Finished(html_result("hello"))]
    );
    assert_eq!(observer.events(), vec![Observed::Success { attempt: 1 }]);
}

#[tokio::test(start_paused = true)]
async fn always_failing_engine_retries_until_deadline() {
    init_tracing();

    let backend = ScriptedBackend::always(FakeAttempt::boom(ms(0)));
    let log = backend.log();
    let (orch, _cancel, sink, observer) = orchestrator(
        ConfigBuilder::new().build(),
        Job::new("http://x", ms(5000)),
        backend,
    );

    let phase = orch.run().await;

    assert_eq!(phase, Phase::TimedOut);
    let attempts = log.count();
    assert!((9..=11).contains(&attempts), "unexpected attempt count {attempts}");
    assert!(log.start_gaps().iter().all(|gap| *gap == ms(500)));

    let deliveries = sink.deliveries();
    assert_eq!(deliveries.len(), 1);
    match &deliveries[0] {
        JobOutcome::Rejected(reason) => assert!(reason.contains("impress timeout 5000")),
        other => panic!("expected rejection, got {other:?}"),
    }
    assert_eq!(
        observer.events().last(),
        Some(&Observed::Timeout { timeout: ms(5000) })
    );
}

#[tokio::test(start_paused = true)]
async fn slow_failures_are_retried_without_extra_delay() {
    let backend = ScriptedBackend::always(FakeAttempt::boom(ms(800)));
    let log = backend.log();
    let (orch, _cancel, _sink, observer) = orchestrator(
        ConfigBuilder::new().build(),
        Job::new("http://x", ms(3000)),
        backend,
    );

    orch.run().await;

    assert!(log.count() >= 3);
    assert!(log.start_gaps().iter().all(|gap| *gap == ms(800)));
    assert!(observer
        .events()
        .iter()
        .filter_map(|e| match e {
            Observed::Retry { delay, .. } => Some(*delay),
            _ => None,
        })
        .all(|delay| delay.is_zero()));
}

#[tokio::test(start_paused = true)]
async fn fast_failure_waits_exactly_the_shortfall() {
    let backend = ScriptedBackend::new(
        vec![FakeAttempt::boom(ms(120))],
        FakeAttempt::Succeed {
            after: ms(0),
            result: html_result("ok"),
        },
    );
    let log = backend.log();
    let (orch, _cancel, _sink, observer) = orchestrator(
        ConfigBuilder::new().build(),
        Job::new("http://x", ms(5000)),
        backend,
    );

    assert_eq!(orch.run().await, Phase::Succeeded);
    assert_eq!(log.start_gaps(), vec![ms(500)]);
    assert!(observer.events().contains(&Observed::Retry {
        next_attempt: 2,
        delay: ms(380)
    }));
}

#[tokio::test(start_paused = true)]
async fn structurally_invalid_content_is_retried_not_delivered() {
    let bad = AttemptResult {
        content: "not html".into(),
        ..AttemptResult::default()
    };
    let backend = ScriptedBackend::new(
        vec![FakeAttempt::Succeed {
            after: ms(10),
            result: bad,
        }],
        FakeAttempt::Succeed {
            after: ms(10),
            result: html_result("second"),
        },
    );
    let log = backend.log();
    let (orch, _cancel, sink, observer) = orchestrator(
        ConfigBuilder::new().build(),
        Job::new("http://x", ms(5000)),
        backend,
    );

    assert_eq!(orch.run().await, Phase::Succeeded);
    assert_eq!(log.count(), 2);
    assert_eq!(
        sink.deliveries(),
        vec![JobOutcome::Finished(html_result("second"))]
    );
    assert_eq!(
        observer.events()[0],
        Observed::AttemptFailed {
            attempt: 1,
            error: AttemptError::Validation(ValidationError::MissingRootMarker)
        }
    );
}

#[tokio::test(start_paused = true)]
async fn always_invalid_content_times_out() {
    let bad = AttemptResult {
        content: "<html><body>truncated".into(),
        ..AttemptResult::default()
    };
    let (orch, _cancel, sink, _observer) = orchestrator(
        ConfigBuilder::new().build(),
        Job::new("http://x", ms(2000)),
        ScriptedBackend::always(FakeAttempt::Succeed {
            after: ms(50),
            result: bad,
        }),
    );

    assert_eq!(orch.run().await, Phase::TimedOut);
    assert!(matches!(&sink.deliveries()[..], [JobOutcome::Rejected(_)]));
}

#[tokio::test(start_paused = true)]
async fn budget_counts_from_job_creation() {
    let created = Instant::now();
    tokio::time::sleep(ms(2000)).await;

    let backend = ScriptedBackend::always(FakeAttempt::Hang);
    let log = backend.log();
    let (orch, _cancel, sink, _observer) = orchestrator(
        ConfigBuilder::new().exec_timeout(ms(20_000)).build(),
        Job::new("http://x", ms(5000)).with_created(created),
        backend,
    );

    assert_eq!(orch.budget().remaining, ms(3000));
    assert_eq!(orch.run().await, Phase::TimedOut);
    assert_eq!(log.invocations()[0].limits.exec_timeout, ms(3000));
    assert_eq!(
        sink.deliveries(),
        vec![JobOutcome::Rejected(
            "FAIL page \"http://x\" impress timeout 3000".into()
        )]
    );
}

#[tokio::test(start_paused = true)]
async fn deadline_is_fixed_when_orchestrator_is_built() {
    let backend = ScriptedBackend::always(FakeAttempt::Hang);
    let log = backend.log();
    let built = Instant::now();
    let (orch, _cancel, sink, _observer) = orchestrator(
        ConfigBuilder::new().exec_timeout(ms(20_000)).build(),
        Job::new("http://x", ms(5000)),
        backend,
    );

    // Time spent before `run` still counts against the job.
    tokio::time::sleep(ms(2000)).await;

    assert_eq!(orch.run().await, Phase::TimedOut);
    assert_eq!(built.elapsed(), ms(5000));
    assert_eq!(log.count(), 1);
    assert_eq!(
        sink.deliveries(),
        vec![JobOutcome::Rejected(
            "FAIL page \"http://x\" impress timeout 5000".into()
        )]
    );
}

#[tokio::test(start_paused = true)]
async fn expired_job_is_rejected_without_attempts() {
    let created = Instant::now();
    tokio::time::sleep(ms(1500)).await;

    let backend = ScriptedBackend::always(FakeAttempt::boom(ms(0)));
    let log = backend.log();
    let (orch, _cancel, sink, _observer) = orchestrator(
        ConfigBuilder::new().build(),
        Job::new("http://x", ms(1000)).with_created(created),
        backend,
    );

    assert_eq!(orch.run().await, Phase::TimedOut);
    assert_eq!(log.count(), 0);
    assert_eq!(sink.deliveries().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn built_command_carries_normalised_args() {
    let backend = ScriptedBackend::always(FakeAttempt::Succeed {
        after: ms(0),
        result: html_result("ok"),
    });
    let log = backend.log();
    let config = ConfigBuilder::new()
        .extra_args(ExtraArgs::Line("--foo=1 bar=2".into()))
        .build();
    let (orch, _cancel, _sink, _observer) =
        orchestrator(config, Job::new("http://x", ms(5000)), backend);

    orch.run().await;

    let command = log.invocations()[0].command.to_string();
    assert!(command.contains("--ignore-ssl-errors=true --ssl-protocol=tlsv1 --foo=1 --bar=2"));
    assert!(command.ends_with("impress.js aHR0cDovL3g= --url-base64-encoded"));
}

#[tokio::test(start_paused = true)]
async fn reporter_emits_diagnostics_and_compresses_content() {
    let mut result = html_result("   spaced   out   ");
    result.warnings = vec!["w".into()];
    result.notices = vec!["n".into()];
    result.url = Some("http://final".into());

    let config = ConfigBuilder::new().warnings(true).notices(true).build();
    let (orch, _cancel, sink, observer) = orchestrator(
        config,
        Job::new("http://x", ms(5000)),
        ScriptedBackend::always(FakeAttempt::Succeed {
            after: ms(0),
            result,
        }),
    );
    let squash = |s: &str| s.split_whitespace().collect::<Vec<_>>().join(" ");
    let orch = orch.with_compressor(Arc::new(squash));

    orch.run().await;

    let events = observer.events();
    assert!(events.contains(&Observed::Warnings {
        url: "http://final".into(),
        messages: vec!["w".into()]
    }));
    assert!(events.contains(&Observed::Notices {
        url: "http://final".into(),
        messages: vec!["n".into()]
    }));
    match &sink.deliveries()[..] {
        [JobOutcome::Finished(res)] => {
            assert_eq!(res.content, "<html><body> spaced out </body></html>")
        }
        other => panic!("expected one success, got {other:?}"),
    }
}
