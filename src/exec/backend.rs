// src/exec/backend.rs

//! Pluggable renderer backend abstraction.
//!
//! The orchestrator talks to a `RendererBackend` instead of spawning
//! processes itself. Production code uses [`ProcessBackend`]; tests can
//! provide a backend that resolves attempts from a script without touching
//! the OS.

use crate::command::CommandLine;
use crate::exec::attempt::{AttemptHandle, AttemptLimits};
use crate::exec::process::spawn_attempt;

/// Trait abstracting how one engine attempt is started.
pub trait RendererBackend: Send {
    /// Start an attempt and return its handle immediately.
    fn invoke(&mut self, command: CommandLine, limits: AttemptLimits) -> AttemptHandle;
}

/// Runs the engine as a real child process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessBackend;

impl RendererBackend for ProcessBackend {
    fn invoke(&mut self, command: CommandLine, limits: AttemptLimits) -> AttemptHandle {
        spawn_attempt(command, limits)
    }
}
