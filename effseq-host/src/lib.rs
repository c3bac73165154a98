#![deny(missing_docs)]
//! Reactive host glue for effseq.
//!
//! The sequencer only orders what it is given. Deciding *when* to give it a
//! new cycle is the host's job: [`DependencyKey`] compares successive input
//! lists position by position, and [`AsyncEffectHook`] turns mount, input
//! change and unmount into `register`/`cleanup` calls on any
//! [`EffectScheduler`](effseq_core::EffectScheduler).

mod deps;
mod hook;

pub use deps::DependencyKey;
pub use hook::{AsyncEffectHook, RenderOutcome};
