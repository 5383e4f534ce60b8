// src/errors.rs

//! Crate-wide error aliases and helpers.
//!
//! [`AttemptError`] covers everything that can go wrong in a single engine
//! invocation; the scheduler retries all of them. [`ImpressError`] is what
//! surfaces to the binary and the configuration layer.

use std::time::Duration;

use thiserror::Error;

use crate::validate::ValidationError;

/// Marker used when neither stderr nor stdout carries a message.
pub const UNKNOWN_ERROR: &str = "Unknown Error";

#[derive(Error, Debug)]
pub enum ImpressError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Job rejected: {0}")]
    Rejected(String),

    #[error("Job canceled before delivery")]
    Canceled,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Why one attempt of the external engine did not produce usable content.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttemptError {
    /// The process could not be started.
    #[error("failed to spawn engine: {0}")]
    Spawn(String),

    /// Reading the process streams or waiting on it failed.
    #[error("engine I/O failure: {0}")]
    Io(String),

    /// Non-zero exit or output on stderr.
    #[error("engine failed (exit code {code:?}): {message}")]
    Runtime { code: Option<i32>, message: String },

    /// The per-attempt execution timeout elapsed and the process was killed.
    #[error("engine exceeded execution timeout of {}ms", .0.as_millis())]
    ExecTimeout(Duration),

    /// A stream exceeded the configured maximum content length.
    #[error("engine output exceeded {0} bytes")]
    OutputLimit(usize),

    /// stdout did not hold a valid result payload.
    #[error("could not parse engine payload: {0}")]
    Parse(String),

    /// The payload said `ok: false`.
    #[error("engine reported errors: {}", .0.join("; "))]
    EngineReported(Vec<String>),

    /// The content failed the structural document check.
    #[error("invalid content: {0}")]
    Validation(#[from] ValidationError),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ImpressError>;
