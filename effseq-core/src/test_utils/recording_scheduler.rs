//! RecordingScheduler — records host calls without running anything.

use crate::cleanup::EffectFn;
use crate::scheduler::{ChainState, EffectScheduler};

/// A call a host made on a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerCall {
    /// `register` was called.
    Register,
    /// `cleanup` was called.
    Cleanup,
}

/// A scheduler that records calls and keeps submitted effects unrun.
///
/// Drives host-side logic in tests without a runtime. Effects can be taken
/// out with [`take_effects`](RecordingScheduler::take_effects) and run by hand.
pub struct RecordingScheduler {
    calls: Vec<SchedulerCall>,
    effects: Vec<EffectFn>,
    state: ChainState,
}

impl RecordingScheduler {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            effects: Vec::new(),
            state: ChainState::Idle,
        }
    }

    /// Calls recorded so far, in order.
    pub fn calls(&self) -> &[SchedulerCall] {
        &self.calls
    }

    /// Remove and return all submitted effects, in submission order.
    pub fn take_effects(&mut self) -> Vec<EffectFn> {
        std::mem::take(&mut self.effects)
    }
}

impl Default for RecordingScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectScheduler for RecordingScheduler {
    fn register(&mut self, effect: EffectFn) {
        self.calls.push(SchedulerCall::Register);
        self.effects.push(effect);
        self.state = ChainState::EffectPending;
    }

    fn cleanup(&mut self) {
        self.calls.push(SchedulerCall::Cleanup);
        if self.state != ChainState::Idle {
            self.state = ChainState::CleanupPending;
        }
    }

    fn state(&self) -> ChainState {
        self.state
    }
}
