use std::sync::{Arc, Mutex};
use std::time::Duration;

use impress::engine::{JobOutcome, JobSink};
use impress::errors::AttemptError;
use impress::exec::AttemptResult;
use impress::report::ImpressObserver;

/// Events captured by [`RecordingObserver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observed {
    AttemptFailed { attempt: u32, error: AttemptError },
    Retry { next_attempt: u32, delay: Duration },
    Success { attempt: u32 },
    Warnings { url: String, messages: Vec<String> },
    Notices { url: String, messages: Vec<String> },
    Timeout { timeout: Duration },
}

/// Observer that stores every event for later assertions.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<Observed>>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<Observed> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: Observed) {
        self.events.lock().unwrap().push(event);
    }
}

impl ImpressObserver for RecordingObserver {
    fn on_attempt_failed(&self, _url: &str, attempt: u32, error: &AttemptError) {
        self.push(Observed::AttemptFailed {
            attempt,
            error: error.clone(),
        });
    }

    fn on_retry(&self, _url: &str, next_attempt: u32, delay: Duration) {
        self.push(Observed::Retry {
            next_attempt,
            delay,
        });
    }

    fn on_success(&self, _url: &str, attempt: u32, _elapsed: Duration) {
        self.push(Observed::Success { attempt });
    }

    fn on_warnings(&self, url: &str, warnings: &[String]) {
        self.push(Observed::Warnings {
            url: url.to_string(),
            messages: warnings.to_vec(),
        });
    }

    fn on_notices(&self, url: &str, notices: &[String]) {
        self.push(Observed::Notices {
            url: url.to_string(),
            messages: notices.to_vec(),
        });
    }

    fn on_timeout(&self, _url: &str, timeout: Duration) {
        self.push(Observed::Timeout { timeout });
    }
}

/// Job sink that appends every delivery to a shared list.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    deliveries: Arc<Mutex<Vec<JobOutcome>>>,
}

impl RecordingSink {
    pub fn deliveries(&self) -> Vec<JobOutcome> {
        self.deliveries.lock().unwrap().clone()
    }

    pub fn boxed(&self) -> Box<dyn JobSink> {
        Box::new(self.clone())
    }
}

impl JobSink for RecordingSink {
    fn finish(self: Box<Self>, result: AttemptResult) {
        self.deliveries
            .lock()
            .unwrap()
            .push(JobOutcome::Finished(result));
    }

    fn reject(self: Box<Self>, reason: String) {
        self.deliveries
            .lock()
            .unwrap()
            .push(JobOutcome::Rejected(reason));
    }
}
