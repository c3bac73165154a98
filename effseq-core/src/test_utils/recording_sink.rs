//! RecordingSink — keeps every failure report for inspection.

use crate::sink::{FailureKind, FailureReport, FailureSink};
use async_trait::async_trait;
use std::sync::Mutex;

/// A recorded failure, reduced to cloneable fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedFailure {
    /// Which kind of step failed.
    pub kind: FailureKind,
    /// Label of the reporting sequencer.
    pub sequencer: String,
    /// Cycle of the failing step.
    pub cycle: u64,
    /// Rendered error message.
    pub message: String,
}

/// A sink that records every report. Use `.failures()` to inspect them.
pub struct RecordingSink {
    failures: Mutex<Vec<RecordedFailure>>,
}

impl RecordingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self {
            failures: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of all recorded failures, in report order.
    pub fn failures(&self) -> Vec<RecordedFailure> {
        self.failures.lock().unwrap().clone()
    }

    /// Recorded failure kinds, in report order.
    pub fn kinds(&self) -> Vec<FailureKind> {
        self.failures().into_iter().map(|f| f.kind).collect()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FailureSink for RecordingSink {
    async fn report(&self, report: &FailureReport) {
        self.failures.lock().unwrap().push(RecordedFailure {
            kind: report.kind(),
            sequencer: report.sequencer.clone(),
            cycle: report.cycle,
            message: report.error.to_string(),
        });
    }
}
