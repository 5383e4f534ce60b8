// src/engine/job.rs

//! The job boundary: what the caller hands in and how the single terminal
//! outcome is handed back.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::exec::AttemptResult;

/// A render request owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub url: String,
    /// When the caller created the job; the overall budget counts from here.
    pub created: Instant,
    /// Total time budget for the job, across all attempts.
    pub timeout: Duration,
}

impl Job {
    /// A job created now.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            created: Instant::now(),
            timeout,
        }
    }

    pub fn with_created(mut self, created: Instant) -> Self {
        self.created = created;
        self
    }
}

/// Terminal outcome of a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Finished(AttemptResult),
    Rejected(String),
}

/// Receiver of the terminal outcome.
///
/// Both methods consume the sink, so a job can be completed at most once.
pub trait JobSink: Send {
    fn finish(self: Box<Self>, result: AttemptResult);
    fn reject(self: Box<Self>, reason: String);
}

impl JobSink for oneshot::Sender<JobOutcome> {
    fn finish(self: Box<Self>, result: AttemptResult) {
        let _ = (*self).send(JobOutcome::Finished(result));
    }

    fn reject(self: Box<Self>, reason: String) {
        let _ = (*self).send(JobOutcome::Rejected(reason));
    }
}

/// Time budget derived once when the orchestrator is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    /// Overall budget left for this job.
    pub remaining: Duration,
    /// Execution timeout for each attempt: the configured cap, never more
    /// than `remaining`.
    pub per_attempt: Duration,
}

impl Budget {
    pub fn compute(job: &Job, exec_timeout: Duration, now: Instant) -> Self {
        let spent = now.saturating_duration_since(job.created);
        let remaining = job.timeout.saturating_sub(spent);
        Self {
            remaining,
            per_attempt: exec_timeout.min(remaining),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_subtracts_time_already_spent() {
        let now = Instant::now();
        let job = Job::new("http://x", Duration::from_secs(5))
            .with_created(now - Duration::from_secs(2));

        let budget = Budget::compute(&job, Duration::from_secs(20), now);
        assert_eq!(budget.remaining, Duration::from_secs(3));
        assert_eq!(budget.per_attempt, Duration::from_secs(3));

        let budget = Budget::compute(&job, Duration::from_secs(1), now);
        assert_eq!(budget.per_attempt, Duration::from_secs(1));
    }

    #[test]
    fn expired_job_has_no_budget() {
        let now = Instant::now();
        let job = Job::new("http://x", Duration::from_secs(1))
            .with_created(now - Duration::from_secs(3));

        let budget = Budget::compute(&job, Duration::from_secs(20), now);
        assert_eq!(budget.remaining, Duration::ZERO);
        assert_eq!(budget.per_attempt, Duration::ZERO);
    }

    #[tokio::test]
    async fn oneshot_sink_forwards_outcome() {
        let (tx, rx) = oneshot::channel();
        let sink: Box<dyn JobSink> = Box::new(tx);
        sink.reject("nope".into());
        assert_eq!(rx.await.unwrap(), JobOutcome::Rejected("nope".into()));
    }
}
