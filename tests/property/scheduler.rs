use std::time::Duration;

use proptest::prelude::*;

use impress::engine::{Budget, Phase, SchedulerCommand, SchedulerCore, SchedulerEvent};
use impress::errors::AttemptError;
use impress::exec::AttemptResult;

const MIN_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
enum Input {
    Finished { valid: bool, ok: bool, elapsed_ms: u64 },
    RetryTimer,
    Deadline,
    Cancel,
}

fn input_strategy() -> impl Strategy<Value = Input> {
    prop_oneof![
        6 => (any::<bool>(), any::<bool>(), 0u64..2000).prop_map(|(valid, ok, elapsed_ms)| {
            Input::Finished { valid, ok, elapsed_ms }
        }),
        6 => Just(Input::RetryTimer),
        1 => Just(Input::Deadline),
        1 => Just(Input::Cancel),
    ]
}

fn to_event(input: &Input) -> SchedulerEvent {
    match input {
        Input::Finished { valid, ok, elapsed_ms } => {
            let outcome = if *ok {
                let content = if *valid {
                    "<html><body>ok</body></html>"
                } else {
                    "plain text"
                };
                Ok(AttemptResult {
                    content: content.to_string(),
                    ..AttemptResult::default()
                })
            } else {
                Err(AttemptError::Runtime {
                    code: Some(1),
                    message: "boom".into(),
                })
            };
            SchedulerEvent::AttemptFinished {
                outcome,
                elapsed: Duration::from_millis(*elapsed_ms),
            }
        }
        Input::RetryTimer => SchedulerEvent::RetryTimerFired,
        Input::Deadline => SchedulerEvent::DeadlineFired,
        Input::Cancel => SchedulerEvent::CancelRequested,
    }
}

/// What the shell would be holding after executing the commands.
#[derive(Debug, Default)]
struct Shadow {
    deadline: bool,
    retry: bool,
    attempt: bool,
}

impl Shadow {
    fn apply(&mut self, command: &SchedulerCommand) {
        match command {
            SchedulerCommand::ArmDeadline(_) => self.deadline = true,
            SchedulerCommand::ClearDeadline => self.deadline = false,
            SchedulerCommand::StartAttempt { .. } => {
                self.retry = false;
                self.attempt = true;
            }
            SchedulerCommand::CancelAttempt => self.attempt = false,
            SchedulerCommand::ArmRetryTimer { .. } => self.retry = true,
            SchedulerCommand::ClearRetryTimer => self.retry = false,
            SchedulerCommand::AttemptFailed { .. } => self.attempt = false,
            SchedulerCommand::Succeed { .. } => self.attempt = false,
            // Firing is what leads to a reject; the timer is spent.
            SchedulerCommand::Reject { .. } => self.deadline = false,
        }
    }
}

proptest! {
    #[test]
    fn terminal_delivery_is_unique_and_final(
        remaining_ms in 0u64..10_000,
        inputs in proptest::collection::vec(input_strategy(), 0..40),
    ) {
        let remaining = Duration::from_millis(remaining_ms);
        let budget = Budget {
            remaining,
            per_attempt: Duration::from_secs(20).min(remaining),
        };
        let mut core = SchedulerCore::new("http://x", budget, MIN_INTERVAL);
        let mut shadow = Shadow::default();
        let mut deliveries = 0;
        let mut terminal_seen = false;

        let events = std::iter::once(SchedulerEvent::Start).chain(inputs.iter().map(to_event));
        for event in events {
            let elapsed = match &event {
                SchedulerEvent::AttemptFinished { elapsed, .. } => Some(*elapsed),
                _ => None,
            };
            let step = core.step(event);

            if terminal_seen {
                prop_assert!(step.commands.is_empty(), "commands after terminal: {:?}", step.commands);
            }

            for command in &step.commands {
                match command {
                    SchedulerCommand::Succeed { .. } | SchedulerCommand::Reject { .. } => deliveries += 1,
                    SchedulerCommand::ArmRetryTimer { delay, .. } => {
                        let elapsed = elapsed.expect("retry timer armed outside attempt completion");
                        prop_assert_eq!(*delay, MIN_INTERVAL.saturating_sub(elapsed));
                    }
                    SchedulerCommand::StartAttempt { exec_timeout, .. } => {
                        prop_assert!(*exec_timeout <= remaining);
                    }
                    _ => {}
                }
                shadow.apply(command);
            }

            prop_assert_eq!(step.finished, core.phase().is_terminal());
            terminal_seen |= step.finished;
        }

        prop_assert!(deliveries <= 1);
        if core.phase().is_terminal() {
            prop_assert!(!shadow.deadline, "deadline still armed: {:?}", core.phase());
            prop_assert!(!shadow.retry, "retry timer still armed: {:?}", core.phase());
            prop_assert!(!shadow.attempt, "attempt still running: {:?}", core.phase());
        }
        if core.phase() == Phase::Canceled {
            prop_assert_eq!(deliveries, 0);
        } else if core.phase().is_terminal() {
            prop_assert_eq!(deliveries, 1);
        }
    }
}
