// src/engine/orchestrator.rs

use std::fmt;
use std::future::pending;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::{Instant, Sleep, sleep, sleep_until};
use tracing::{debug, info, warn};

use crate::command::build;
use crate::config::ImpressConfig;
use crate::engine::core::{Phase, SchedulerCommand, SchedulerCore, SchedulerEvent, SchedulerStep};
use crate::engine::job::{Budget, Job, JobSink};
use crate::exec::{AttemptHandle, AttemptLimits, AttemptOutcome, AttemptResult, RendererBackend};
use crate::report::observer::guarded;
use crate::report::{ContentCompressor, ImpressObserver, Reporter, TracingObserver};

/// Stand-in deadline for budgets too large to represent as an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Withdraws a running job. Dropping it without calling `cancel` does not
/// cancel anything.
#[derive(Debug)]
pub struct CancelHandle {
    tx: Option<oneshot::Sender<()>>,
}

impl CancelHandle {
    /// Idempotent. After the orchestrator observes the request, no outcome is
    /// delivered to the job.
    pub fn cancel(&mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Timers and the in-flight attempt owned by a running orchestrator.
///
/// Everything here is dropped when `run` returns, which clears both timers
/// and cancels (kills) any attempt still running.
#[derive(Default)]
struct Inflight {
    deadline_timer: Option<Pin<Box<Sleep>>>,
    retry_timer: Option<Pin<Box<Sleep>>>,
    attempt: Option<AttemptHandle>,
    attempt_started: Option<Instant>,
}

/// Drives one job through `SchedulerCore`, carrying out its commands with
/// Tokio timers and a `RendererBackend`.
///
/// This is the IO shell around the core: it turns timer firings, attempt
/// completions and external cancellation into `SchedulerEvent`s.
pub struct Orchestrator<B: RendererBackend> {
    core: SchedulerCore,
    /// Absolute end of the overall budget, fixed at construction.
    deadline: Instant,
    config: ImpressConfig,
    job: Job,
    backend: B,
    reporter: Reporter,
    observer: Arc<dyn ImpressObserver>,
    sink: Option<Box<dyn JobSink>>,
    cancel_rx: oneshot::Receiver<()>,
}

impl<B: RendererBackend> fmt::Debug for Orchestrator<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("core", &self.core)
            .field("job", &self.job)
            .finish_non_exhaustive()
    }
}

impl<B: RendererBackend> Orchestrator<B> {
    /// Build an orchestrator for `job`. The time budget and the deadline are
    /// fixed here, so time spent before `run` counts against the job.
    pub fn new(
        config: ImpressConfig,
        job: Job,
        backend: B,
        sink: Box<dyn JobSink>,
    ) -> (Self, CancelHandle) {
        let now = Instant::now();
        let budget = Budget::compute(&job, config.exec_timeout, now);
        let deadline = now
            .checked_add(budget.remaining)
            .unwrap_or_else(|| now + FAR_FUTURE);
        let core = SchedulerCore::new(job.url.clone(), budget, config.min_invoke_interval);
        let reporter = Reporter::new(&config);
        let (cancel_tx, cancel_rx) = oneshot::channel();

        let orchestrator = Self {
            core,
            deadline,
            config,
            job,
            backend,
            reporter,
            observer: Arc::new(TracingObserver),
            sink: Some(sink),
            cancel_rx,
        };
        (orchestrator, CancelHandle { tx: Some(cancel_tx) })
    }

    pub fn with_observer(mut self, observer: Arc<dyn ImpressObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_compressor(mut self, compressor: Arc<dyn ContentCompressor>) -> Self {
        self.reporter = self.reporter.with_compressor(compressor);
        self
    }

    pub fn budget(&self) -> Budget {
        self.core.budget()
    }

    /// Run until the job reaches a terminal phase and return that phase.
    ///
    /// When several events are ready in the same turn, external cancellation
    /// wins over the deadline, and the deadline wins over an attempt
    /// completion or the spacing timer.
    pub async fn run(mut self) -> Phase {
        info!(url = %self.job.url, budget = ?self.core.budget(), "impress job started");

        let mut inflight = Inflight::default();
        let mut cancel_open = true;

        let mut step = self.core.step(SchedulerEvent::Start);
        loop {
            for command in step.commands {
                self.execute(command, &mut inflight);
            }
            if step.finished {
                break;
            }

            let event = tokio::select! {
                biased;

                res = &mut self.cancel_rx, if cancel_open => {
                    match res {
                        Ok(()) => SchedulerEvent::CancelRequested,
                        Err(_) => {
                            cancel_open = false;
                            debug!(url = %self.job.url, "cancel handle dropped");
                            step = empty_step();
                            continue;
                        }
                    }
                }

                _ = wait_timer(&mut inflight.deadline_timer) => {
                    inflight.deadline_timer = None;
                    SchedulerEvent::DeadlineFired
                }

                outcome = wait_attempt(&mut inflight.attempt) => {
                    inflight.attempt = None;
                    let elapsed = inflight
                        .attempt_started
                        .map(|t| t.elapsed())
                        .unwrap_or_default();
                    SchedulerEvent::AttemptFinished { outcome, elapsed }
                }

                _ = wait_timer(&mut inflight.retry_timer) => {
                    inflight.retry_timer = None;
                    SchedulerEvent::RetryTimerFired
                }
            };

            debug!(url = %self.job.url, ?event, "orchestrator received event");
            step = self.core.step(event);
        }

        let phase = self.core.phase();
        info!(url = %self.job.url, ?phase, "impress job finished");
        phase
    }

    fn execute(&mut self, command: SchedulerCommand, inflight: &mut Inflight) {
        let url = self.job.url.as_str();
        match command {
            SchedulerCommand::ArmDeadline(budget) => {
                let left = self.deadline.saturating_duration_since(Instant::now());
                debug!(
                    url,
                    budget_ms = budget.as_millis() as u64,
                    left_ms = left.as_millis() as u64,
                    "deadline armed"
                );
                inflight.deadline_timer = Some(Box::pin(sleep_until(self.deadline)));
            }
            SchedulerCommand::ClearDeadline => {
                inflight.deadline_timer = None;
            }
            SchedulerCommand::StartAttempt {
                attempt,
                exec_timeout,
            } => {
                let command = build(&self.config, url);
                let limits = AttemptLimits {
                    exec_timeout,
                    max_output_bytes: self.config.max_content_length,
                };
                debug!(url, attempt, cmd = %command, "starting attempt");
                inflight.attempt_started = Some(Instant::now());
                inflight.attempt = Some(self.backend.invoke(command, limits));
            }
            SchedulerCommand::CancelAttempt => {
                if let Some(mut attempt) = inflight.attempt.take() {
                    attempt.cancel();
                }
            }
            SchedulerCommand::ArmRetryTimer {
                next_attempt,
                delay,
            } => {
                let observer = &self.observer;
                guarded("on_retry", || observer.on_retry(url, next_attempt, delay));
                inflight.retry_timer = Some(Box::pin(sleep(delay)));
            }
            SchedulerCommand::ClearRetryTimer => {
                inflight.retry_timer = None;
            }
            SchedulerCommand::AttemptFailed { attempt, error } => {
                let observer = &self.observer;
                guarded("on_attempt_failed", || {
                    observer.on_attempt_failed(url, attempt, &error)
                });
            }
            SchedulerCommand::Succeed { attempt, result } => {
                let elapsed = inflight
                    .attempt_started
                    .map(|t| t.elapsed())
                    .unwrap_or_default();
                let observer = &self.observer;
                guarded("on_success", || observer.on_success(url, attempt, elapsed));
                let result = self.reporter.report(url, result, observer.as_ref());
                self.finish(result);
            }
            SchedulerCommand::Reject { reason, timeout } => {
                let observer = &self.observer;
                guarded("on_timeout", || observer.on_timeout(url, timeout));
                self.reject(reason);
            }
        }
    }

    fn finish(&mut self, result: AttemptResult) {
        match self.sink.take() {
            Some(sink) => {
                guarded("job finish", move || sink.finish(result));
            }
            None => warn!(url = %self.job.url, "job already completed; result dropped"),
        }
    }

    fn reject(&mut self, reason: String) {
        match self.sink.take() {
            Some(sink) => {
                guarded("job reject", move || sink.reject(reason));
            }
            None => warn!(url = %self.job.url, "job already completed; rejection dropped"),
        }
    }
}

fn empty_step() -> SchedulerStep {
    SchedulerStep {
        commands: Vec::new(),
        finished: false,
    }
}

async fn wait_timer(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(timer) => timer.as_mut().await,
        None => pending().await,
    }
}

async fn wait_attempt(attempt: &mut Option<AttemptHandle>) -> AttemptOutcome {
    let Some(handle) = attempt else {
        return pending().await;
    };
    match handle.outcome().await {
        Some(outcome) => outcome,
        None => pending().await,
    }
}
