//! The EffectScheduler interface, through which a host submits effect cycles.

use crate::cleanup::EffectFn;
use serde::{Deserialize, Serialize};

/// Where a sequencer's chain currently stands.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainState {
    /// Nothing has ever been registered.
    Idle,
    /// The tail of the chain is an effect (running or queued).
    EffectPending,
    /// The tail of the chain is a cleanup (running or queued).
    CleanupPending,
}

/// Something a reactive host can drive with effect cycles.
///
/// The host calls [`register`](EffectScheduler::register) each time its
/// watched inputs change (including the first mount) and
/// [`cleanup`](EffectScheduler::cleanup) before discarding a cycle and on
/// final teardown. Both calls return immediately; the scheduler decides
/// when the work actually runs.
pub trait EffectScheduler {
    /// Submit the effect for a new cycle.
    fn register(&mut self, effect: EffectFn);

    /// Request teardown of the most recently registered cycle.
    fn cleanup(&mut self);

    /// Current position in the register/cleanup state machine.
    fn state(&self) -> ChainState;
}

impl<S: EffectScheduler + ?Sized> EffectScheduler for &mut S {
    fn register(&mut self, effect: EffectFn) {
        (**self).register(effect)
    }

    fn cleanup(&mut self) {
        (**self).cleanup()
    }

    fn state(&self) -> ChainState {
        (**self).state()
    }
}

impl<S: EffectScheduler + ?Sized> EffectScheduler for Box<S> {
    fn register(&mut self, effect: EffectFn) {
        (**self).register(effect)
    }

    fn cleanup(&mut self) {
        (**self).cleanup()
    }

    fn state(&self) -> ChainState {
        (**self).state()
    }
}
