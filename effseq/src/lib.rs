#![deny(missing_docs)]
//! # effseq — umbrella crate
//!
//! Single import surface for sequenced async effects. Re-exports the
//! protocol crate and the implementations behind feature flags, plus a
//! `prelude` for the happy path.

pub use effseq_core;
#[cfg(feature = "chain")]
pub use effseq_chain;
#[cfg(feature = "host")]
pub use effseq_host;
#[cfg(feature = "sinks")]
pub use effseq_sinks;

/// Happy-path imports for driving async effects.
pub mod prelude {
    pub use effseq_core::{
        ChainState, Cleanup, EffectError, EffectFn, EffectScheduler, FailureKind, FailureReport,
        FailureSink, SequenceError, SequencerConfig, Settled,
    };

    #[cfg(feature = "chain")]
    pub use effseq_chain::AsyncEffectSequencer;

    #[cfg(feature = "host")]
    pub use effseq_host::{AsyncEffectHook, DependencyKey, RenderOutcome};

    #[cfg(feature = "sinks")]
    pub use effseq_sinks::{SinkRegistry, TracingSink};
}
