//! Tagged outcome of one chain step.

use crate::error::SequenceError;

/// How a chain step settled.
///
/// A step never fails outright. It either completed with its real value,
/// or its failure was caught and replaced by a degenerate `fallback` the
/// next step can still consume. The recovery branch is part of the type so
/// callers must decide what to do with the error.
#[must_use]
#[derive(Debug)]
pub enum Settled<T> {
    /// The step produced its real value.
    Completed(T),
    /// The step failed; `fallback` stands in for the value it would have produced.
    Recovered {
        /// Degenerate value handed to the next step.
        fallback: T,
        /// What went wrong.
        error: SequenceError,
    },
}

impl<T> Settled<T> {
    /// Build a settled value from a step result, substituting `fallback`
    /// and wrapping the error with `wrap` on failure.
    pub fn from_result<E>(
        result: Result<T, E>,
        fallback: impl FnOnce() -> T,
        wrap: impl FnOnce(E) -> SequenceError,
    ) -> Self {
        match result {
            Ok(value) => Self::Completed(value),
            Err(e) => Self::Recovered {
                fallback: fallback(),
                error: wrap(e),
            },
        }
    }

    /// Whether the step had to recover from a failure.
    pub fn is_recovered(&self) -> bool {
        matches!(self, Self::Recovered { .. })
    }

    /// The absorbed error, if any.
    pub fn error(&self) -> Option<&SequenceError> {
        match self {
            Self::Completed(_) => None,
            Self::Recovered { error, .. } => Some(error),
        }
    }

    /// Split into the value to continue with and the absorbed error.
    pub fn into_parts(self) -> (T, Option<SequenceError>) {
        match self {
            Self::Completed(value) => (value, None),
            Self::Recovered { fallback, error } => (fallback, Some(error)),
        }
    }

    /// The value to continue with, discarding any error.
    pub fn into_value(self) -> T {
        self.into_parts().0
    }
}
