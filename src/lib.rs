// src/lib.rs

pub mod cli;
pub mod command;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod report;
pub mod types;
pub mod validate;

use std::path::PathBuf;

use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::command::build;
use crate::config::{ImpressConfig, default_config_path, load_and_validate};
use crate::engine::{Job, JobOutcome, Orchestrator};
use crate::errors::{ImpressError, Result};
use crate::exec::{AttemptResult, ProcessBackend};
use crate::types::ExtraArgs;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (file + CLI overrides)
/// - the orchestrator with the process backend
/// - Ctrl-C handling (withdraws the job)
/// - printing the delivered result to stdout
pub async fn run(args: CliArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    let timeout = args.timeout.unwrap_or(config.job_timeout);
    let job = Job::new(args.url.clone(), timeout);

    if args.dry_run {
        print_dry_run(&config, &job);
        return Ok(());
    }

    let result = render(config, job).await?;

    if args.json {
        let json = serde_json::to_string_pretty(&result).map_err(anyhow::Error::from)?;
        println!("{json}");
    } else {
        println!("{}", result.content);
    }
    Ok(())
}

/// Render one job with the real engine and wait for its outcome.
///
/// Ctrl-C withdraws the job, in which case [`ImpressError::Canceled`] is
/// returned.
pub async fn render(config: ImpressConfig, job: Job) -> Result<AttemptResult> {
    let (tx, rx) = oneshot::channel::<JobOutcome>();
    let (orchestrator, mut cancel) = Orchestrator::new(config, job, ProcessBackend, Box::new(tx));

    let ctrl_c = tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {e}");
            return;
        }
        info!("Ctrl+C received; withdrawing job");
        cancel.cancel();
    });

    let phase = orchestrator.run().await;
    ctrl_c.abort();
    debug!(?phase, "orchestrator returned");

    match rx.await {
        Ok(JobOutcome::Finished(result)) => Ok(result),
        Ok(JobOutcome::Rejected(reason)) => Err(ImpressError::Rejected(reason)),
        Err(_) => Err(ImpressError::Canceled),
    }
}

/// Load the config file (explicit path, or `Impress.toml` if it exists,
/// else built-in defaults) and apply CLI overrides on top.
pub fn resolve_config(args: &CliArgs) -> Result<ImpressConfig> {
    let mut config = match args.config.as_ref() {
        Some(path) => load_and_validate(PathBuf::from(path))?,
        None => {
            let path = default_config_path();
            if path.is_file() {
                load_and_validate(&path)?
            } else {
                debug!(path = %path.display(), "no config file; using defaults");
                ImpressConfig::default()
            }
        }
    };

    if let Some(extra) = args.args.as_ref() {
        config.args.merge_extra(&ExtraArgs::Line(extra.clone()));
    }
    if args.raw_url {
        config.base64_url = false;
    }
    config.notices |= args.notices;
    config.warnings |= args.warnings;

    Ok(config)
}

/// Simple dry-run output: effective settings and the engine command line.
fn print_dry_run(config: &ImpressConfig, job: &Job) {
    println!("impress dry-run");
    println!("  url = {}", job.url);
    println!("  job timeout = {}ms", job.timeout.as_millis());
    println!("  exec timeout = {}ms", config.exec_timeout.as_millis());
    println!("  max content length = {} bytes", config.max_content_length);
    println!(
        "  min invoke interval = {}ms",
        config.min_invoke_interval.as_millis()
    );
    println!();
    println!("{}", build(config, &job.url));

    debug!("dry-run complete (no execution)");
}
