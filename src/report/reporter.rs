// src/report/reporter.rs

use std::sync::Arc;

use crate::config::ImpressConfig;
use crate::exec::AttemptResult;
use crate::report::compress::{ContentCompressor, PassThrough};
use crate::report::observer::{ImpressObserver, guarded};

/// Final step before a successful result is delivered to the job.
#[derive(Clone)]
pub struct Reporter {
    notices: bool,
    warnings: bool,
    compressor: Arc<dyn ContentCompressor>,
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter")
            .field("notices", &self.notices)
            .field("warnings", &self.warnings)
            .finish_non_exhaustive()
    }
}

impl Reporter {
    pub fn new(config: &ImpressConfig) -> Self {
        Self {
            notices: config.notices,
            warnings: config.warnings,
            compressor: Arc::new(PassThrough),
        }
    }

    pub fn with_compressor(mut self, compressor: Arc<dyn ContentCompressor>) -> Self {
        self.compressor = compressor;
        self
    }

    /// Emit warnings/notices (when enabled and present) and post-process the
    /// content.
    ///
    /// Events are keyed by the URL the engine echoed back, falling back to
    /// `job_url`.
    pub fn report(
        &self,
        job_url: &str,
        mut result: AttemptResult,
        observer: &dyn ImpressObserver,
    ) -> AttemptResult {
        let page_url = result.url.as_deref().unwrap_or(job_url);

        if self.warnings && !result.warnings.is_empty() {
            guarded("on_warnings", || observer.on_warnings(page_url, &result.warnings));
        }
        if self.notices && !result.notices.is_empty() {
            guarded("on_notices", || observer.on_notices(page_url, &result.notices));
        }

        result.content = self.compressor.compress(&result.content);
        result
    }
}
