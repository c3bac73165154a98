//! Error types for effects and for the chain that sequences them.

use std::any::Any;
use thiserror::Error;

/// Errors produced by user effect and cleanup code.
///
/// Effects return this from their futures; the step wrappers also
/// convert panics into [`EffectError::Panicked`] so both surface the same way.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EffectError {
    /// The effect or cleanup reported a failure.
    #[error("{0}")]
    Failed(String),

    /// The effect or cleanup panicked, either while building its
    /// future or while it was being polled.
    #[error("panicked: {0}")]
    Panicked(String),

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl EffectError {
    /// Shorthand for [`EffectError::Failed`].
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Build a [`EffectError::Panicked`] from a caught panic payload.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self::Panicked(message)
    }
}

/// Failures absorbed by the sequencer. One variant per place the chain
/// can break; none of them ever escapes to the host.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SequenceError {
    /// The effect failed instead of producing a cleanup. Its cleanup is
    /// replaced by a no-op.
    #[error("effect failed, its cleanup will not be executed: {0}")]
    Effect(#[source] EffectError),

    /// The cleanup failed. The step is treated as complete.
    #[error("cleanup failed: {0}")]
    Cleanup(#[source] EffectError),

    /// The step a new step was waiting on never produced a value
    /// (its task panicked outside user code or was cancelled).
    #[error("effect chain failed: {0}")]
    ChainPredecessor(String),
}
