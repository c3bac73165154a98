#![deny(missing_docs)]
//! Tokio-backed implementation of effseq's [`EffectScheduler`](effseq_core::EffectScheduler).
//!
//! [`AsyncEffectSequencer`] keeps one RunChain slot per instance. Each
//! `register` or `cleanup` call spawns a step that owns the previous step's
//! `JoinHandle` and awaits it before running, which gives a total order over
//! all effect and cleanup bodies of that instance. No cancellation, no
//! timeouts: a step that never settles stalls everything queued behind it.

mod sequencer;
mod step;

pub use sequencer::AsyncEffectSequencer;
