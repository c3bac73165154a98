//! # effseq-core — Protocol types for sequenced async effects
//!
//! This crate defines the vocabulary shared by every part of an effect
//! sequencer: what an effect is, what its cleanup is, how a step reports
//! that it settled, and where failures go.
//!
//! ## The Types
//!
//! | Concept | Type | What it is |
//! |---------|------|-----------|
//! | Effect | [`EffectFn`] | One-shot async setup that yields a [`Cleanup`] |
//! | Cleanup | [`Cleanup`] | One-shot async teardown for one effect run |
//! | Step outcome | [`Settled`] | Completed value, or a recovered degenerate value plus the error |
//! | Failure | [`SequenceError`], [`EffectError`] | What went wrong, and where |
//!
//! ## The Interfaces
//!
//! | Interface | Trait | What it does |
//! |-----------|-------|-------------|
//! | Scheduling | [`EffectScheduler`] | How a host submits effect cycles |
//! | Observability | [`FailureSink`] | Where absorbed failures are reported |
//!
//! ## Failure Model
//!
//! Nothing a user effect or cleanup does can break a chain. Returned errors
//! and panics are both caught at the step boundary by [`EffectFn::run`] and
//! [`Cleanup::run`], surfaced as [`EffectError`], and absorbed into a
//! [`Settled::Recovered`] value that carries a usable fallback.

#![deny(missing_docs)]

pub mod cleanup;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod settled;
pub mod sink;

#[cfg(feature = "test-utils")]
pub mod test_utils;

// Re-exports for convenience
pub use cleanup::{Cleanup, CleanupFuture, EffectFn, EffectFuture};
pub use config::SequencerConfig;
pub use error::{EffectError, SequenceError};
pub use scheduler::{ChainState, EffectScheduler};
pub use settled::Settled;
pub use sink::{FailureKind, FailureReport, FailureSink};
