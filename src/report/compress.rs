// src/report/compress.rs

/// Downstream post-processor applied to rendered content before delivery.
///
/// Failures are the implementation's concern; the orchestrator never retries
/// because of it.
pub trait ContentCompressor: Send + Sync {
    fn compress(&self, content: &str) -> String;
}

impl<F> ContentCompressor for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn compress(&self, content: &str) -> String {
        self(content)
    }
}

/// Leaves content untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl ContentCompressor for PassThrough {
    fn compress(&self, content: &str) -> String {
        content.to_string()
    }
}
