// src/command/builder.rs

use std::fmt;
use std::process::Stdio;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::config::ImpressConfig;

/// Flag telling the engine that the URL argument is base64 encoded.
pub const URL_BASE64_FLAG: &str = "--url-base64-encoded";
pub const NOTICES_FLAG: &str = "--notices";
pub const WARNINGS_FLAG: &str = "--warnings";

/// A fully built engine invocation.
///
/// Spawned directly as an argv (no shell in between), so URLs never need
/// quoting. `Display` renders the tokens space-separated for logs and
/// `--dry-run`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Tokio command with piped output streams, killed when dropped.
    pub fn to_command(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Build the engine command line for `url`.
///
/// Token order: configured flags (defaults first, overrides in place, new
/// flags appended), the script path, the URL (base64 plus
/// [`URL_BASE64_FLAG`] unless `config.base64_url` is off), then the optional
/// `--notices` / `--warnings` switches.
pub fn build(config: &ImpressConfig, url: &str) -> CommandLine {
    let mut line = CommandLine::new(config.binary.clone());
    line.args.extend(config.args.to_tokens());
    line.args.push(config.script.clone());

    if config.base64_url {
        line.args.push(STANDARD.encode(url.as_bytes()));
        line.args.push(URL_BASE64_FLAG.to_string());
    } else {
        line.args.push(url.to_string());
    }

    if config.notices {
        line.args.push(NOTICES_FLAG.to_string());
    }
    if config.warnings {
        line.args.push(WARNINGS_FLAG.to_string());
    }

    line
}
