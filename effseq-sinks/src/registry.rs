//! Ordered fan-out of failure reports to several sinks.

use async_trait::async_trait;
use effseq_core::sink::{FailureReport, FailureSink};
use std::sync::Arc;

/// A sink that forwards each report to every registered sink.
///
/// Sinks are called in the order they were added. Every sink sees every
/// report; there is no short-circuiting.
pub struct SinkRegistry {
    sinks: Vec<Arc<dyn FailureSink>>,
}

impl SinkRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    /// Add a sink to the end of the list.
    pub fn add(&mut self, sink: Arc<dyn FailureSink>) {
        self.sinks.push(sink);
    }

    /// Builder form of [`add`](SinkRegistry::add).
    pub fn with(mut self, sink: Arc<dyn FailureSink>) -> Self {
        self.add(sink);
        self
    }

    /// Number of registered sinks.
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Whether no sinks are registered.
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl Default for SinkRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FailureSink for SinkRegistry {
    async fn report(&self, report: &FailureReport) {
        for sink in &self.sinks {
            sink.report(report).await;
        }
    }
}
