use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use impress::command::CommandLine;
use impress::errors::AttemptError;
use impress::exec::{
    attempt_channel, spawn_attempt, AttemptHandle, AttemptLimits, AttemptResult, RendererBackend,
};
use tokio::time::{sleep, Instant};

/// What a scripted attempt does once started.
#[derive(Debug, Clone)]
pub enum FakeAttempt {
    /// Report success after `after`.
    Succeed { after: Duration, result: AttemptResult },
    /// Report failure after `after`.
    Fail { after: Duration, error: AttemptError },
    /// Never report; only ends when canceled.
    Hang,
}

impl FakeAttempt {
    pub fn boom(after: Duration) -> Self {
        FakeAttempt::Fail {
            after,
            error: AttemptError::Runtime {
                code: Some(1),
                message: "boom".to_string(),
            },
        }
    }
}

/// One call to `invoke`, as seen by the backend.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub started: Instant,
    pub command: CommandLine,
    pub limits: AttemptLimits,
}

/// Shared view of everything a fake backend was asked to do.
#[derive(Debug, Clone, Default)]
pub struct InvocationLog {
    invocations: Arc<Mutex<Vec<Invocation>>>,
    canceled: Arc<Mutex<usize>>,
}

impl InvocationLog {
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.invocations.lock().unwrap().len()
    }

    /// Gaps between consecutive attempt starts.
    pub fn start_gaps(&self) -> Vec<Duration> {
        let starts: Vec<_> = self.invocations().iter().map(|i| i.started).collect();
        starts.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// Attempts whose runner observed a cancellation request.
    pub fn canceled(&self) -> usize {
        *self.canceled.lock().unwrap()
    }

    fn record(&self, invocation: Invocation) {
        self.invocations.lock().unwrap().push(invocation);
    }

    fn mark_canceled(&self) {
        *self.canceled.lock().unwrap() += 1;
    }
}

/// A backend that plays a script of attempts without spawning processes.
///
/// Once the script is exhausted every further attempt uses `fallback`.
pub struct ScriptedBackend {
    script: VecDeque<FakeAttempt>,
    fallback: FakeAttempt,
    log: InvocationLog,
}

impl ScriptedBackend {
    pub fn new(script: Vec<FakeAttempt>, fallback: FakeAttempt) -> Self {
        Self {
            script: script.into(),
            fallback,
            log: InvocationLog::default(),
        }
    }

    /// Every attempt behaves the same way.
    pub fn always(attempt: FakeAttempt) -> Self {
        Self::new(Vec::new(), attempt)
    }

    pub fn log(&self) -> InvocationLog {
        self.log.clone()
    }
}

impl RendererBackend for ScriptedBackend {
    fn invoke(&mut self, command: CommandLine, limits: AttemptLimits) -> AttemptHandle {
        self.log.record(Invocation {
            started: Instant::now(),
            command,
            limits,
        });

        let attempt = self.script.pop_front().unwrap_or_else(|| self.fallback.clone());
        let (handle, mut signal) = attempt_channel();
        let log = self.log.clone();

        tokio::spawn(async move {
            let (after, outcome) = match attempt {
                FakeAttempt::Succeed { after, result } => (after, Ok(result)),
                FakeAttempt::Fail { after, error } => (after, Err(error)),
                FakeAttempt::Hang => {
                    signal.cancelled().await;
                    log.mark_canceled();
                    return;
                }
            };

            if after.is_zero() {
                signal.finish(outcome);
                return;
            }

            tokio::select! {
                _ = sleep(after) => {
                    signal.finish(outcome);
                }
                _ = signal.cancelled() => {
                    log.mark_canceled();
                }
            }
        });

        handle
    }
}

/// A backend that records the built command line but runs `sh -c <script>`
/// through the real process supervisor instead.
pub struct ShellBackend {
    script: String,
    commands: Arc<Mutex<Vec<CommandLine>>>,
}

impl ShellBackend {
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            commands: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn commands(&self) -> Arc<Mutex<Vec<CommandLine>>> {
        Arc::clone(&self.commands)
    }
}

impl RendererBackend for ShellBackend {
    fn invoke(&mut self, command: CommandLine, limits: AttemptLimits) -> AttemptHandle {
        self.commands.lock().unwrap().push(command);
        let shell = CommandLine::new("sh").arg("-c").arg(self.script.clone());
        spawn_attempt(shell, limits)
    }
}
