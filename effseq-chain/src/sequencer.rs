use crate::step::{Link, LinkState, StepContext, StepKind, settle_join};
use effseq_core::{
    ChainState, Cleanup, EffectError, EffectFn, EffectScheduler, FailureSink, SequencerConfig,
};
use effseq_sinks::TracingSink;
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Handle;

/// Runs a host-driven sequence of effect cycles one at a time.
///
/// Owns a single RunChain slot holding the most recently scheduled step.
/// Every [`register`](Self::register) and [`cleanup`](Self::cleanup) spawns
/// a step that first waits for the step already in the slot, then takes
/// its place. Steps therefore run in call order with no overlap, however
/// fast the calls arrive, and neither call waits for anything.
///
/// Failures never escape: a failed effect is reported and its cleanup
/// becomes a no-op, a failed cleanup is reported and counts as done.
///
/// Steps are tokio tasks. Call `register`/`cleanup` from inside a runtime,
/// or attach one with [`with_handle`](Self::with_handle). A call made with
/// neither is logged at `error` and dropped, leaving the chain as it was.
/// Dropping the sequencer does not abort steps already scheduled.
///
/// ```no_run
/// use effseq_chain::AsyncEffectSequencer;
/// use effseq_core::Cleanup;
///
/// # async fn demo() {
/// let mut seq = AsyncEffectSequencer::new();
/// seq.register(|| async {
///     // start work
///     Ok(Cleanup::new(|| async {
///         // finish work
///         Ok(())
///     }))
/// });
/// seq.cleanup();
/// seq.settle().await;
/// # }
/// ```
pub struct AsyncEffectSequencer {
    ctx: Arc<StepContext>,
    chain: Option<Link>,
    cycles: u64,
    handle: Option<Handle>,
}

impl AsyncEffectSequencer {
    /// Create a sequencer with the default config, reporting to a [`TracingSink`].
    pub fn new() -> Self {
        Self {
            ctx: Arc::new(StepContext::new(
                SequencerConfig::default(),
                Arc::new(TracingSink::new()),
            )),
            chain: None,
            cycles: 0,
            handle: None,
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: SequencerConfig) -> Self {
        let sink = Arc::clone(&self.ctx.sink);
        self.ctx = Arc::new(StepContext::new(config, sink));
        self
    }

    /// Report absorbed failures to `sink` instead of the default [`TracingSink`].
    pub fn with_sink(mut self, sink: Arc<dyn FailureSink>) -> Self {
        let mut ctx = StepContext::clone(&self.ctx);
        ctx.sink = sink;
        self.ctx = Arc::new(ctx);
        self
    }

    /// Spawn steps on `handle` rather than the ambient runtime.
    pub fn with_handle(mut self, handle: Handle) -> Self {
        self.handle = Some(handle);
        self
    }

    /// Label used in log events and failure reports.
    pub fn label(&self) -> &str {
        &self.ctx.label
    }

    /// Number of effects registered so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Position in the register/cleanup state machine.
    ///
    /// Reflects the kind of the last scheduled step, whether or not it has
    /// finished running.
    pub fn state(&self) -> ChainState {
        match &self.chain {
            None => ChainState::Idle,
            Some(link) if link.kind == StepKind::Effect => ChainState::EffectPending,
            Some(_) => ChainState::CleanupPending,
        }
    }

    /// Whether nothing has ever been registered.
    pub fn is_idle(&self) -> bool {
        self.chain.is_none()
    }

    /// Schedule an effect for a new cycle. Returns immediately.
    ///
    /// With an empty chain the effect starts right away. Otherwise it starts
    /// once the current tail has settled, even if that tail failed. If the
    /// previous cycle's cleanup was never requested, it runs first.
    pub fn register<F, Fut>(&mut self, effect: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Cleanup, EffectError>> + Send + 'static,
    {
        self.register_effect(EffectFn::new(effect));
    }

    /// [`register`](Self::register) for an already boxed effect.
    pub fn register_effect(&mut self, effect: EffectFn) {
        let Some(runtime) = self.runtime("register") else {
            return;
        };
        self.cycles += 1;
        let cycle = self.cycles;
        let prev = self.chain.take();
        let handle = runtime.spawn(Arc::clone(&self.ctx).effect_step(prev, cycle, effect));
        self.chain = Some(Link {
            cycle,
            kind: StepKind::Effect,
            state: LinkState::Pending(handle),
        });
    }

    /// Schedule teardown of the most recent cycle. Returns immediately.
    ///
    /// The cleanup runs once the effect has produced it. On an empty chain
    /// this does nothing; after another `cleanup` it runs nothing.
    pub fn cleanup(&mut self) {
        if self.chain.is_none() {
            tracing::debug!(sequencer = %self.ctx.label, "effseq.cleanup.idle");
            return;
        }
        let Some(runtime) = self.runtime("cleanup") else {
            return;
        };
        let Some(prev) = self.chain.take() else {
            return;
        };
        let cycle = prev.cycle;
        let handle = runtime.spawn(Arc::clone(&self.ctx).cleanup_step(prev));
        self.chain = Some(Link {
            cycle,
            kind: StepKind::Cleanup,
            state: LinkState::Pending(handle),
        });
    }

    /// Wait until every step scheduled so far has finished.
    ///
    /// The settled tail stays in the chain, so a cleanup still owed by the
    /// last effect is run by the next `cleanup` or `register`. Safe to drop
    /// before completion.
    ///
    /// A failed tail is reported from a task of its own, so a sink that
    /// panics here is logged rather than unwinding into the caller.
    pub async fn settle(&mut self) {
        let Some(link) = self.chain.as_mut() else {
            return;
        };
        let LinkState::Pending(handle) = &mut link.state else {
            return;
        };
        let (tail, error) = settle_join(handle.await).into_parts();
        link.state = LinkState::Ready(tail);
        let Some(error) = error else {
            return;
        };
        let cycle = link.cycle;
        let Some(runtime) = self.runtime("settle") else {
            return;
        };
        let ctx = Arc::clone(&self.ctx);
        let report = runtime.spawn(async move { ctx.report(cycle, error).await });
        if let Err(e) = report.await {
            tracing::error!(
                sequencer = %self.ctx.label,
                cycle,
                error = %e,
                "effseq.sink.panicked"
            );
        }
    }

    /// The runtime steps are spawned on: the attached handle, else the ambient one.
    fn runtime(&self, op: &'static str) -> Option<Handle> {
        if let Some(handle) = &self.handle {
            return Some(handle.clone());
        }
        match Handle::try_current() {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::error!(
                    sequencer = %self.ctx.label,
                    op,
                    error = %e,
                    "effseq.runtime.missing"
                );
                None
            }
        }
    }
}

impl Default for AsyncEffectSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectScheduler for AsyncEffectSequencer {
    fn register(&mut self, effect: EffectFn) {
        self.register_effect(effect);
    }

    fn cleanup(&mut self) {
        AsyncEffectSequencer::cleanup(self);
    }

    fn state(&self) -> ChainState {
        AsyncEffectSequencer::state(self)
    }
}
