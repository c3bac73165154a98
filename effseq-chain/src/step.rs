//! Chain links and the steps that run inside them.

use effseq_core::{
    Cleanup, EffectFn, FailureReport, FailureSink, SequenceError, SequencerConfig, Settled,
};
use std::sync::Arc;
use tokio::task::{JoinError, JoinHandle};

/// What the tail of the chain settles to.
pub(crate) enum Tail {
    /// An effect ran; its cleanup is still owed.
    Effect { cleanup: Cleanup },
    /// Nothing is owed.
    Cleaned,
}

/// Which step a link stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StepKind {
    Effect,
    Cleanup,
}

pub(crate) enum LinkState {
    /// The step is queued or running.
    Pending(JoinHandle<Tail>),
    /// The step finished and its value has been collected.
    Ready(Tail),
}

/// The RunChain slot's content: the most recently scheduled step.
pub(crate) struct Link {
    pub(crate) cycle: u64,
    pub(crate) kind: StepKind,
    pub(crate) state: LinkState,
}

/// A predecessor that died without a value leaves nothing owed.
pub(crate) fn settle_join(result: Result<Tail, JoinError>) -> Settled<Tail> {
    Settled::from_result(
        result,
        || Tail::Cleaned,
        |e| SequenceError::ChainPredecessor(e.to_string()),
    )
}

/// Shared, immutable context every spawned step carries.
#[derive(Clone)]
pub(crate) struct StepContext {
    pub(crate) label: String,
    pub(crate) warn_on_orphaned_cleanup: bool,
    pub(crate) sink: Arc<dyn FailureSink>,
}

impl StepContext {
    pub(crate) fn new(config: SequencerConfig, sink: Arc<dyn FailureSink>) -> Self {
        Self {
            label: config.label,
            warn_on_orphaned_cleanup: config.warn_on_orphaned_cleanup,
            sink,
        }
    }

    pub(crate) async fn report(&self, cycle: u64, error: SequenceError) {
        let report = FailureReport::new(self.label.clone(), cycle, error);
        self.sink.report(&report).await;
    }

    /// Report the error of a recovered step and hand back the value to continue with.
    async fn absorb<T>(&self, cycle: u64, settled: Settled<T>) -> T {
        let (value, error) = settled.into_parts();
        if let Some(error) = error {
            self.report(cycle, error).await;
        }
        value
    }

    async fn await_link(&self, link: Link) -> Tail {
        let settled = match link.state {
            LinkState::Ready(tail) => Settled::Completed(tail),
            LinkState::Pending(handle) => settle_join(handle.await),
        };
        self.absorb(link.cycle, settled).await
    }

    async fn run_effect(&self, cycle: u64, effect: EffectFn) -> Cleanup {
        tracing::debug!(sequencer = %self.label, cycle, "effseq.effect.start");
        let settled = Settled::from_result(effect.run().await, Cleanup::noop, SequenceError::Effect);
        tracing::debug!(
            sequencer = %self.label,
            cycle,
            recovered = settled.is_recovered(),
            "effseq.effect.done"
        );
        self.absorb(cycle, settled).await
    }

    async fn run_cleanup(&self, cycle: u64, cleanup: Cleanup) {
        tracing::debug!(
            sequencer = %self.label,
            cycle,
            noop = cleanup.is_noop(),
            "effseq.cleanup.start"
        );
        let settled = Settled::from_result(cleanup.run().await, || (), SequenceError::Cleanup);
        tracing::debug!(
            sequencer = %self.label,
            cycle,
            recovered = settled.is_recovered(),
            "effseq.cleanup.done"
        );
        self.absorb(cycle, settled).await
    }

    /// Wait for `prev`, pay any cleanup it still owes, then run `effect`.
    pub(crate) async fn effect_step(
        self: Arc<Self>,
        prev: Option<Link>,
        cycle: u64,
        effect: EffectFn,
    ) -> Tail {
        if let Some(prev) = prev {
            let prev_cycle = prev.cycle;
            if let Tail::Effect { cleanup } = self.await_link(prev).await {
                if self.warn_on_orphaned_cleanup {
                    tracing::warn!(
                        sequencer = %self.label,
                        cycle = prev_cycle,
                        "effseq.cleanup.orphaned"
                    );
                }
                self.run_cleanup(prev_cycle, cleanup).await;
            }
        }
        let cleanup = self.run_effect(cycle, effect).await;
        Tail::Effect { cleanup }
    }

    /// Wait for `prev` and run the cleanup it yields, if any.
    pub(crate) async fn cleanup_step(self: Arc<Self>, prev: Link) -> Tail {
        let cycle = prev.cycle;
        match self.await_link(prev).await {
            Tail::Effect { cleanup } => self.run_cleanup(cycle, cleanup).await,
            Tail::Cleaned => {
                tracing::debug!(sequencer = %self.label, cycle, "effseq.cleanup.skipped");
            }
        }
        Tail::Cleaned
    }
}
