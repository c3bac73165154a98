//! Concrete [`FailureSink`] using the [`tracing`] crate.

use async_trait::async_trait;
use effseq_core::sink::{FailureKind, FailureReport, FailureSink};

/// A [`FailureSink`] that emits each report as an `ERROR` level
/// [`tracing`] event.
///
/// | Kind | Event |
/// |------|-------|
/// | EffectFailed | `effseq.effect.failed` |
/// | ChainFailed | `effseq.chain.failed` |
/// | CleanupFailed | `effseq.cleanup.failed` |
///
/// # Example
///
/// ```no_run
/// use effseq_sinks::TracingSink;
/// use std::sync::Arc;
///
/// let sink = Arc::new(TracingSink::new());
/// // Pass to AsyncEffectSequencer::new().with_sink(sink)
/// # drop(sink);
/// ```
pub struct TracingSink;

impl TracingSink {
    /// Create a new `TracingSink`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FailureSink for TracingSink {
    async fn report(&self, report: &FailureReport) {
        let sequencer = report.sequencer.as_str();
        let cycle = report.cycle;
        let error = &report.error;
        match report.kind() {
            FailureKind::EffectFailed => {
                tracing::error!(
                    sequencer,
                    cycle,
                    error = %error,
                    hint = "handle errors inside the effect so its cleanup can run",
                    "effseq.effect.failed"
                );
            }
            FailureKind::ChainFailed => {
                tracing::error!(sequencer, cycle, error = %error, "effseq.chain.failed");
            }
            FailureKind::CleanupFailed => {
                tracing::error!(sequencer, cycle, error = %error, "effseq.cleanup.failed");
            }
            _ => {
                tracing::error!(sequencer, cycle, error = %error, "effseq.failed");
            }
        }
    }
}
