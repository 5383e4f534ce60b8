// src/engine/core.rs

//! Pure retry/deadline state machine.
//!
//! [`SchedulerCore`] consumes [`SchedulerEvent`]s and returns the
//! [`SchedulerCommand`]s the async shell (`engine::orchestrator`) must carry
//! out: arm or clear timers, start or cancel attempts, report, deliver.
//!
//! The core has no Tokio types, channels, timers or processes, so every
//! transition can be unit tested synchronously.

use std::time::Duration;

use crate::engine::job::Budget;
use crate::errors::AttemptError;
use crate::exec::{AttemptOutcome, AttemptResult};
use crate::validate::validate;

/// Lifecycle of one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Invoking { attempt: u32 },
    RetryPending { next_attempt: u32 },
    Succeeded,
    TimedOut,
    Canceled,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Succeeded | Phase::TimedOut | Phase::Canceled)
    }
}

/// Inputs to the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerEvent {
    Start,
    AttemptFinished {
        outcome: AttemptOutcome,
        /// Time since the attempt was started.
        elapsed: Duration,
    },
    RetryTimerFired,
    DeadlineFired,
    CancelRequested,
}

/// Side effects requested by the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerCommand {
    ArmDeadline(Duration),
    ClearDeadline,
    StartAttempt { attempt: u32, exec_timeout: Duration },
    CancelAttempt,
    ArmRetryTimer { next_attempt: u32, delay: Duration },
    ClearRetryTimer,
    AttemptFailed { attempt: u32, error: AttemptError },
    Succeed { attempt: u32, result: AttemptResult },
    Reject { reason: String, timeout: Duration },
}

/// Result of feeding one event to the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerStep {
    pub commands: Vec<SchedulerCommand>,
    /// The job reached a terminal phase; the shell should stop.
    pub finished: bool,
}

#[derive(Debug, Clone)]
pub struct SchedulerCore {
    url: String,
    budget: Budget,
    min_invoke_interval: Duration,
    phase: Phase,
}

impl SchedulerCore {
    pub fn new(url: impl Into<String>, budget: Budget, min_invoke_interval: Duration) -> Self {
        Self {
            url: url.into(),
            budget,
            min_invoke_interval,
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn budget(&self) -> Budget {
        self.budget
    }

    /// Handle a single event. Events arriving after a terminal phase produce
    /// no commands.
    pub fn step(&mut self, event: SchedulerEvent) -> SchedulerStep {
        if self.phase.is_terminal() {
            return self.emit(Vec::new());
        }

        let commands = match (self.phase, event) {
            (Phase::Idle, SchedulerEvent::Start) => self.start(),
            (Phase::Invoking { attempt }, SchedulerEvent::AttemptFinished { outcome, elapsed }) => {
                self.attempt_finished(attempt, outcome, elapsed)
            }
            (Phase::RetryPending { next_attempt }, SchedulerEvent::RetryTimerFired) => {
                self.start_attempt(next_attempt)
            }
            (_, SchedulerEvent::DeadlineFired) => self.deadline_fired(),
            (_, SchedulerEvent::CancelRequested) => self.cancel(),
            // Stale timer or completion for a phase that no longer expects it.
            _ => Vec::new(),
        };

        self.emit(commands)
    }

    fn emit(&self, commands: Vec<SchedulerCommand>) -> SchedulerStep {
        SchedulerStep {
            commands,
            finished: self.phase.is_terminal(),
        }
    }

    fn start(&mut self) -> Vec<SchedulerCommand> {
        if self.budget.remaining.is_zero() {
            self.phase = Phase::TimedOut;
            return vec![self.reject()];
        }
        let mut commands = vec![SchedulerCommand::ArmDeadline(self.budget.remaining)];
        commands.extend(self.start_attempt(1));
        commands
    }

    fn start_attempt(&mut self, attempt: u32) -> Vec<SchedulerCommand> {
        self.phase = Phase::Invoking { attempt };
        vec![SchedulerCommand::StartAttempt {
            attempt,
            exec_timeout: self.budget.per_attempt,
        }]
    }

    fn attempt_finished(
        &mut self,
        attempt: u32,
        outcome: AttemptOutcome,
        elapsed: Duration,
    ) -> Vec<SchedulerCommand> {
        let checked = outcome.and_then(|result| {
            validate(&result.content)?;
            Ok(result)
        });

        match checked {
            Ok(result) => {
                self.phase = Phase::Succeeded;
                vec![
                    SchedulerCommand::ClearDeadline,
                    SchedulerCommand::Succeed { attempt, result },
                ]
            }
            Err(error) => {
                let next_attempt = attempt.saturating_add(1);
                self.phase = Phase::RetryPending { next_attempt };
                vec![
                    SchedulerCommand::AttemptFailed { attempt, error },
                    SchedulerCommand::ArmRetryTimer {
                        next_attempt,
                        delay: self.retry_delay(elapsed),
                    },
                ]
            }
        }
    }

    /// Shortfall against the minimum spacing, or zero for the next tick.
    fn retry_delay(&self, elapsed: Duration) -> Duration {
        self.min_invoke_interval.saturating_sub(elapsed)
    }

    fn deadline_fired(&mut self) -> Vec<SchedulerCommand> {
        let mut commands = self.teardown();
        self.phase = Phase::TimedOut;
        commands.push(self.reject());
        commands
    }

    fn cancel(&mut self) -> Vec<SchedulerCommand> {
        let mut commands = vec![SchedulerCommand::ClearDeadline];
        commands.extend(self.teardown());
        self.phase = Phase::Canceled;
        commands
    }

    /// Commands that stop whatever the current phase has in flight.
    fn teardown(&self) -> Vec<SchedulerCommand> {
        match self.phase {
            Phase::Invoking { .. } => vec![SchedulerCommand::CancelAttempt],
            Phase::RetryPending { .. } => vec![SchedulerCommand::ClearRetryTimer],
            _ => Vec::new(),
        }
    }

    fn reject(&self) -> SchedulerCommand {
        let timeout = self.budget.remaining;
        SchedulerCommand::Reject {
            reason: format!(
                "FAIL page \"{}\" impress timeout {}",
                self.url,
                timeout.as_millis()
            ),
            timeout,
        }
    }
}
