#![allow(dead_code)]

use std::time::Duration;

use impress::config::ImpressConfig;
use impress::exec::AttemptResult;
use impress::types::ExtraArgs;

/// Builder for `ImpressConfig` to simplify test setup.
pub struct ConfigBuilder {
    config: ImpressConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        let mut config = ImpressConfig::default();
        config.binary = "phantomjs".to_string();
        config.script = "impress.js".to_string();
        Self { config }
    }

    pub fn exec_timeout(mut self, timeout: Duration) -> Self {
        self.config.exec_timeout = timeout;
        self
    }

    pub fn max_content_length(mut self, bytes: usize) -> Self {
        self.config.max_content_length = bytes;
        self
    }

    pub fn min_invoke_interval(mut self, interval: Duration) -> Self {
        self.config.min_invoke_interval = interval;
        self
    }

    pub fn notices(mut self, val: bool) -> Self {
        self.config.notices = val;
        self
    }

    pub fn warnings(mut self, val: bool) -> Self {
        self.config.warnings = val;
        self
    }

    pub fn raw_url(mut self) -> Self {
        self.config.base64_url = false;
        self
    }

    pub fn extra_args(mut self, args: ExtraArgs) -> Self {
        self.config.args.merge_extra(&args);
        self
    }

    pub fn build(self) -> ImpressConfig {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A result whose content passes structural validation.
pub fn html_result(body: &str) -> AttemptResult {
    AttemptResult {
        content: format!("<html><body>{body}</body></html>"),
        ..AttemptResult::default()
    }
}
