// src/exec/attempt.rs

//! Cancelable, single-fire completion for one engine attempt.
//!
//! [`attempt_channel`] returns the two halves:
//! - [`AttemptHandle`] is held by the scheduler. It awaits the outcome and can
//!   `cancel()` the attempt at any point.
//! - [`AttemptSignal`] is held by whatever runs the attempt (the process
//!   supervisor, or a fake in tests). `finish` consumes it, so an attempt can
//!   report at most once, and a canceled attempt never reports.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::oneshot;

use crate::errors::AttemptError;
use crate::exec::outcome::AttemptResult;

pub type AttemptOutcome = Result<AttemptResult, AttemptError>;

/// Resource limits applied to a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptLimits {
    /// Wall-clock budget; the process is killed when it elapses.
    pub exec_timeout: Duration,
    /// Cap on each buffered output stream.
    pub max_output_bytes: usize,
}

/// Create a connected handle/signal pair.
pub fn attempt_channel() -> (AttemptHandle, AttemptSignal) {
    let (outcome_tx, outcome_rx) = oneshot::channel();
    let (cancel_tx, cancel_rx) = oneshot::channel();
    let canceled = Arc::new(AtomicBool::new(false));

    let handle = AttemptHandle {
        outcome_rx: Some(outcome_rx),
        cancel_tx: Some(cancel_tx),
        canceled: Arc::clone(&canceled),
    };
    let signal = AttemptSignal {
        outcome_tx,
        cancel_rx,
        canceled,
    };
    (handle, signal)
}

/// Consumer side of an attempt.
///
/// Dropping the handle cancels the attempt.
#[derive(Debug)]
pub struct AttemptHandle {
    outcome_rx: Option<oneshot::Receiver<AttemptOutcome>>,
    cancel_tx: Option<oneshot::Sender<()>>,
    canceled: Arc<AtomicBool>,
}

impl AttemptHandle {
    /// Request cancellation. Idempotent.
    ///
    /// After this returns, [`outcome`](Self::outcome) yields `None` no matter
    /// when the runner notices the request.
    pub fn cancel(&mut self) {
        self.canceled.store(true, Ordering::SeqCst);
        self.outcome_rx = None;
        if let Some(tx) = self.cancel_tx.take() {
            // The runner may already be gone; nothing left to stop then.
            let _ = tx.send(());
        }
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::SeqCst)
    }

    /// Wait for the attempt to finish.
    ///
    /// Returns `None` once canceled or after the outcome was already taken.
    /// Cancel-safe: dropping the future before it completes loses nothing.
    pub async fn outcome(&mut self) -> Option<AttemptOutcome> {
        let rx = self.outcome_rx.as_mut()?;
        let received = rx.await;
        self.outcome_rx = None;

        if self.is_canceled() {
            return None;
        }
        match received {
            Ok(outcome) => Some(outcome),
            Err(_) => Some(Err(AttemptError::Io(
                "attempt runner ended without reporting an outcome".to_string(),
            ))),
        }
    }
}

impl Drop for AttemptHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Producer side of an attempt.
#[derive(Debug)]
pub struct AttemptSignal {
    outcome_tx: oneshot::Sender<AttemptOutcome>,
    cancel_rx: oneshot::Receiver<()>,
    canceled: Arc<AtomicBool>,
}

impl AttemptSignal {
    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::SeqCst)
    }

    /// Resolves once cancellation is requested or the handle is gone.
    pub async fn cancelled(&mut self) {
        if self.is_canceled() {
            return;
        }
        let _ = (&mut self.cancel_rx).await;
    }

    /// Deliver the outcome. Returns `false` if it was suppressed because the
    /// attempt was canceled or nobody is listening any more.
    pub fn finish(self, outcome: AttemptOutcome) -> bool {
        if self.is_canceled() {
            return false;
        }
        self.outcome_tx.send(outcome).is_ok()
    }
}
