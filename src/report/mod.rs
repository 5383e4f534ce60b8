// src/report/mod.rs

//! Diagnostics and final result hand-off.
//!
//! - [`observer`] is the injected sink for retry/success/warning/notice events.
//! - [`compress`] abstracts the downstream content post-processor.
//! - [`reporter`] emits engine warnings/notices and post-processes content.

pub mod compress;
pub mod observer;
pub mod reporter;

pub use compress::{ContentCompressor, PassThrough};
pub use observer::{ImpressObserver, NoopObserver, TracingObserver};
pub use reporter::Reporter;
