// src/engine/mod.rs

//! Retry/deadline orchestration for one render job.
//!
//! The pure state machine lives in [`core`]; the async/IO shell that owns the
//! timers and the in-flight attempt is [`orchestrator`]. The job boundary
//! (request, sink, budget) is in [`job`].

pub mod core;
pub mod job;
pub mod orchestrator;

pub use core::{Phase, SchedulerCommand, SchedulerCore, SchedulerEvent, SchedulerStep};
pub use job::{Budget, Job, JobOutcome, JobSink};
pub use orchestrator::{CancelHandle, Orchestrator};
