// src/logging.rs

//! Logging setup for `impress` using `tracing` + `tracing-subscriber`.
//!
//! The filter is taken from, in order:
//! 1. the `--log-level` CLI flag,
//! 2. the `IMPRESS_LOG` environment variable, which accepts full
//!    `EnvFilter` directives such as `"impress::exec=debug,info"`,
//! 3. `info`.
//!
//! Output goes to stderr; stdout carries only the rendered page.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

pub const LOG_ENV: &str = "IMPRESS_LOG";
const DEFAULT_DIRECTIVE: &str = "info";

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(LOG_ENV).ok();
    let filter = build_filter(cli_level, env.as_deref())?;

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

fn build_filter(cli_level: Option<LogLevel>, env: Option<&str>) -> Result<EnvFilter> {
    let directive = match (cli_level, env.map(str::trim)) {
        (Some(level), _) => directive_for(level),
        (None, Some(env)) if !env.is_empty() => env,
        _ => DEFAULT_DIRECTIVE,
    };
    EnvFilter::try_new(directive).with_context(|| format!("invalid log filter '{directive}'"))
}

fn directive_for(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
