// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`attempt`] defines the cancelable single-fire attempt handle.
//! - [`process`] runs one engine process via `tokio::process::Command`.
//! - [`outcome`] reduces exit code and output streams to an outcome.
//! - [`backend`] provides the `RendererBackend` trait and the production
//!   `ProcessBackend`, which tests can replace with a fake.

pub mod attempt;
pub mod backend;
pub mod outcome;
pub mod process;

pub use attempt::{AttemptHandle, AttemptLimits, AttemptOutcome, AttemptSignal, attempt_channel};
pub use backend::{ProcessBackend, RendererBackend};
pub use outcome::{AttemptResult, EnginePayload, OK_EXIT_CODE, reduce_process_output};
pub use process::spawn_attempt;
