// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::command::ArgMap;
use crate::types::ExtraArgs;

pub const DEFAULT_BINARY: &str = "phantomjs/binary/phantomjs";
pub const DEFAULT_SCRIPT: &str = "phantomjs/impress.js";
pub const DEFAULT_EXEC_TIMEOUT: Duration = Duration::from_millis(20_000);
pub const DEFAULT_MAX_CONTENT_LENGTH: usize = 2 * 1024 * 1024;
pub const DEFAULT_JOB_TIMEOUT: Duration = Duration::from_secs(30);
/// Minimum spacing between the starts of two consecutive failed attempts.
pub const MIN_INVOKE_INTERVAL: Duration = Duration::from_millis(500);

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [engine]
/// binary = "phantomjs/binary/phantomjs"
/// script = "phantomjs/impress.js"
/// exec_timeout = "20s"
/// max_content_length = 2097152
/// notices = true
/// args = "--load-images=false"
///
/// [job]
/// timeout = "30s"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub engine: EngineSection,

    #[serde(default)]
    pub job: JobSection,
}

/// `[engine]` section: how the external renderer is invoked.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineSection {
    #[serde(default)]
    pub binary: Option<String>,

    #[serde(default)]
    pub script: Option<String>,

    /// Duration string, e.g. `"20s"`.
    #[serde(default)]
    pub exec_timeout: Option<String>,

    /// Cap in bytes on each buffered output stream.
    #[serde(default)]
    pub max_content_length: Option<usize>,

    /// Pass `--notices` and report engine notices.
    #[serde(default)]
    pub notices: bool,

    /// Pass `--warnings` and report engine warnings.
    #[serde(default)]
    pub warnings: bool,

    /// Pass the URL base64 encoded (default) or raw.
    #[serde(default)]
    pub base64_url: Option<bool>,

    /// Extra engine flags; see [`ExtraArgs`].
    #[serde(default)]
    pub args: Option<ExtraArgs>,
}

/// `[job]` section: defaults for jobs started from the CLI.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobSection {
    #[serde(default)]
    pub timeout: Option<String>,

    #[serde(default)]
    pub min_invoke_interval: Option<String>,
}

/// Validated configuration used by the builder, supervisor and scheduler.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpressConfig {
    pub binary: String,
    pub script: String,
    pub exec_timeout: Duration,
    pub max_content_length: usize,
    pub notices: bool,
    pub warnings: bool,
    pub base64_url: bool,
    /// Default flags merged with configured extra args.
    pub args: ArgMap,
    pub job_timeout: Duration,
    pub min_invoke_interval: Duration,
}

impl Default for ImpressConfig {
    fn default() -> Self {
        Self {
            binary: DEFAULT_BINARY.to_string(),
            script: DEFAULT_SCRIPT.to_string(),
            exec_timeout: DEFAULT_EXEC_TIMEOUT,
            max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
            notices: false,
            warnings: false,
            base64_url: true,
            args: ArgMap::with_defaults(),
            job_timeout: DEFAULT_JOB_TIMEOUT,
            min_invoke_interval: MIN_INVOKE_INTERVAL,
        }
    }
}
