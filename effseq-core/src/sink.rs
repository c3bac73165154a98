//! The FailureSink interface, where absorbed failures are reported.

use crate::error::SequenceError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which kind of step failed.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// An effect failed before producing its cleanup.
    EffectFailed,
    /// A step's predecessor never produced a value.
    ChainFailed,
    /// A cleanup failed.
    CleanupFailed,
}

impl FailureKind {
    /// Stable short name, suitable for log messages and metrics labels.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EffectFailed => "effect failed",
            Self::ChainFailed => "effect chain failed",
            Self::CleanupFailed => "cleanup failed",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One failure absorbed by a sequencer.
#[derive(Debug)]
pub struct FailureReport {
    /// Label of the sequencer that absorbed the failure.
    pub sequencer: String,
    /// Effect cycle the failing step belongs to (1-based).
    pub cycle: u64,
    /// The absorbed error.
    pub error: SequenceError,
}

impl FailureReport {
    /// Create a new report.
    pub fn new(sequencer: impl Into<String>, cycle: u64, error: SequenceError) -> Self {
        Self {
            sequencer: sequencer.into(),
            cycle,
            error,
        }
    }

    /// Classify the report by the error it carries.
    pub fn kind(&self) -> FailureKind {
        match &self.error {
            SequenceError::Effect(_) => FailureKind::EffectFailed,
            SequenceError::Cleanup(_) => FailureKind::CleanupFailed,
            SequenceError::ChainPredecessor(_) => FailureKind::ChainFailed,
        }
    }
}

/// Receives failures the sequencer absorbed.
///
/// Sinks observe; they cannot change what the chain does next. The chain
/// awaits each report before moving on, so sinks SHOULD return quickly.
///
/// A sink that panics takes down the step that was reporting to it. The
/// next step then reports that step as [`FailureKind::ChainFailed`] and
/// carries on, so the panic never reaches the host.
#[async_trait]
pub trait FailureSink: Send + Sync {
    /// Called once per absorbed failure.
    async fn report(&self, report: &FailureReport);
}
