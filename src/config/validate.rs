// src/config/validate.rs

use std::time::Duration;

use crate::command::ArgMap;
use crate::config::model::{ImpressConfig, RawConfigFile};
use crate::errors::{ImpressError, Result};
use crate::types::parse_duration;

impl TryFrom<RawConfigFile> for ImpressConfig {
    type Error = ImpressError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let defaults = ImpressConfig::default();
        let engine = raw.engine;

        let binary = non_empty("engine.binary", engine.binary, defaults.binary)?;
        let script = non_empty("engine.script", engine.script, defaults.script)?;

        let exec_timeout =
            duration_field("engine.exec_timeout", engine.exec_timeout, defaults.exec_timeout)?;
        let job_timeout = duration_field("job.timeout", raw.job.timeout, defaults.job_timeout)?;
        let min_invoke_interval = match raw.job.min_invoke_interval {
            Some(s) => parse_duration(&s).map_err(|e| {
                ImpressError::ConfigError(format!("job.min_invoke_interval: {e}"))
            })?,
            None => defaults.min_invoke_interval,
        };

        let max_content_length = engine
            .max_content_length
            .unwrap_or(defaults.max_content_length);
        if max_content_length == 0 {
            return Err(ImpressError::ConfigError(
                "engine.max_content_length must be >= 1 (got 0)".to_string(),
            ));
        }

        let mut args = ArgMap::with_defaults();
        if let Some(extra) = engine.args.as_ref() {
            args.merge_extra(extra);
        }

        Ok(ImpressConfig {
            binary,
            script,
            exec_timeout,
            max_content_length,
            notices: engine.notices,
            warnings: engine.warnings,
            base64_url: engine.base64_url.unwrap_or(defaults.base64_url),
            args,
            job_timeout,
            min_invoke_interval,
        })
    }
}

fn non_empty(field: &str, value: Option<String>, default: String) -> Result<String> {
    match value {
        Some(v) if v.trim().is_empty() => Err(ImpressError::ConfigError(format!(
            "{field} must not be empty"
        ))),
        Some(v) => Ok(v),
        None => Ok(default),
    }
}

/// Parse an optional duration field; zero is rejected.
fn duration_field(field: &str, value: Option<String>, default: Duration) -> Result<Duration> {
    let Some(s) = value else {
        return Ok(default);
    };
    let dur = parse_duration(&s).map_err(|e| ImpressError::ConfigError(format!("{field}: {e}")))?;
    if dur.is_zero() {
        return Err(ImpressError::ConfigError(format!(
            "{field} must be greater than zero (got \"{s}\")"
        )));
    }
    Ok(dur)
}
