// src/cli.rs

//! CLI argument parsing using `clap`.

use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::types::parse_duration;

/// Command-line arguments for `impress`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "impress",
    version,
    about = "Render a page through a headless engine, retrying until a deadline.",
    long_about = None
)]
pub struct CliArgs {
    /// URL of the page to render.
    #[arg(value_name = "URL")]
    pub url: String,

    /// Path to the config file (TOML).
    ///
    /// Default: `Impress.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Overall job timeout (e.g. "30s", "1500ms"). Overrides `[job].timeout`.
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Extra engine flags, e.g. "--load-images=false disk-cache=true".
    #[arg(long, value_name = "ARGS", allow_hyphen_values = true)]
    pub args: Option<String>,

    /// Pass the URL to the engine as-is instead of base64 encoded.
    #[arg(long)]
    pub raw_url: bool,

    /// Ask the engine for notices and report them.
    #[arg(long)]
    pub notices: bool,

    /// Ask the engine for warnings and report them.
    #[arg(long)]
    pub warnings: bool,

    /// Print the whole result as JSON instead of just the content.
    #[arg(long)]
    pub json: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `IMPRESS_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print the engine command line without running it.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
