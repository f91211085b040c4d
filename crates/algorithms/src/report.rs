//! Reporters backed by `tracing`

use georegrid_core::report::Reporter;

/// Forwards notices to the active `tracing` subscriber
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn warn(&self, message: &str) {
        tracing::warn!("{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!("{}", message);
    }
}
