// src/exec/outcome.rs

//! Reduction of a finished engine process to an attempt outcome.

use serde::{Deserialize, Serialize};

use crate::errors::{AttemptError, UNKNOWN_ERROR};
use crate::exec::attempt::AttemptOutcome;

pub const OK_EXIT_CODE: i32 = 0;

/// JSON payload the engine writes to stdout.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnginePayload {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub warnings: Option<Vec<String>>,
    #[serde(default)]
    pub notices: Option<Vec<String>>,
    #[serde(default)]
    pub errors: Option<Vec<String>>,
    /// Final URL as seen by the engine (after redirects).
    #[serde(default)]
    pub url: Option<String>,
}

/// A successful render, as handed to the reporter and then the job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttemptResult {
    pub content: String,
    pub warnings: Vec<String>,
    pub notices: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Turn exit code and captured streams into an outcome.
///
/// - a non-success exit (or death by signal, `code == None`) or any stderr
///   output is a runtime failure, with stderr preferred over stdout as the
///   message;
/// - otherwise stdout must hold an [`EnginePayload`];
/// - a payload with `ok: false` is an engine-reported failure.
pub fn reduce_process_output(code: Option<i32>, stdout: &[u8], stderr: &[u8]) -> AttemptOutcome {
    let stdout = String::from_utf8_lossy(stdout);
    let stderr = String::from_utf8_lossy(stderr);

    if code != Some(OK_EXIT_CODE) || !stderr.is_empty() {
        let message = [stderr.as_ref(), stdout.as_ref()]
            .into_iter()
            .find(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_ERROR)
            .to_string();
        return Err(AttemptError::Runtime { code, message });
    }

    let payload = parse_payload(&stdout)?;
    if !payload.ok {
        let errors = payload
            .errors
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| vec![UNKNOWN_ERROR.to_string()]);
        return Err(AttemptError::EngineReported(errors));
    }

    Ok(AttemptResult {
        content: payload.content.unwrap_or_default(),
        warnings: payload.warnings.unwrap_or_default(),
        notices: payload.notices.unwrap_or_default(),
        url: payload.url,
    })
}

/// Parse the payload from stdout.
///
/// The whole output is tried first; engines that print progress lines before
/// the payload are handled by falling back to the last non-empty line.
pub fn parse_payload(stdout: &str) -> Result<EnginePayload, AttemptError> {
    let whole = stdout.trim();
    match serde_json::from_str::<EnginePayload>(whole) {
        Ok(payload) => Ok(payload),
        Err(err) => {
            let last_line = whole.lines().rev().map(str::trim).find(|l| !l.is_empty());
            match last_line {
                Some(line) if line != whole => serde_json::from_str(line)
                    .map_err(|_| AttemptError::Parse(err.to_string())),
                _ => Err(AttemptError::Parse(err.to_string())),
            }
        }
    }
}
