//! The mount / update / unmount hook that drives an [`EffectScheduler`].

use crate::deps::DependencyKey;
use effseq_core::{Cleanup, EffectError, EffectFn, EffectScheduler};
use std::future::Future;

/// What a render did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// First render since mount; the effect was registered.
    Mounted,
    /// Dependencies changed; the previous cycle was cleaned up and the effect registered.
    Rerun,
    /// Dependencies unchanged; the effect was dropped without running.
    Unchanged,
}

/// An async effect bound to one component instance.
///
/// Call [`render`](Self::render) every time the component renders, with the
/// current dependencies and a fresh effect closure. The effect is submitted
/// on mount and whenever the dependencies change; before every resubmission
/// and on [`unmount`](Self::unmount) the current cycle is cleaned up.
/// Dropping a mounted hook unmounts it.
pub struct AsyncEffectHook<V, S: EffectScheduler> {
    scheduler: S,
    deps: Option<DependencyKey<V>>,
}

impl<V: PartialEq, S: EffectScheduler> AsyncEffectHook<V, S> {
    /// Create an unmounted hook driving `scheduler`.
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            deps: None,
        }
    }

    /// Render with the given dependencies and effect.
    pub fn render<F, Fut>(&mut self, deps: impl Into<DependencyKey<V>>, effect: F) -> RenderOutcome
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Cleanup, EffectError>> + Send + 'static,
    {
        self.render_effect(deps, EffectFn::new(effect))
    }

    /// [`render`](Self::render) for an already boxed effect.
    pub fn render_effect(
        &mut self,
        deps: impl Into<DependencyKey<V>>,
        effect: EffectFn,
    ) -> RenderOutcome {
        let deps = deps.into();
        let outcome = match &self.deps {
            None => RenderOutcome::Mounted,
            Some(prev) if deps.changed_from(prev) => RenderOutcome::Rerun,
            Some(_) => RenderOutcome::Unchanged,
        };
        tracing::debug!(?outcome, "effseq.host.render");

        match outcome {
            RenderOutcome::Mounted => {
                self.scheduler.register(effect);
                self.deps = Some(deps);
            }
            RenderOutcome::Rerun => {
                self.scheduler.cleanup();
                self.scheduler.register(effect);
                self.deps = Some(deps);
            }
            RenderOutcome::Unchanged => {}
        }
        outcome
    }

    /// Clean up the current cycle. Returns `false` if the hook was not mounted.
    ///
    /// A later [`render`](Self::render) mounts again.
    pub fn unmount(&mut self) -> bool {
        unmount(&mut self.scheduler, &mut self.deps)
    }

    /// Whether the hook has rendered since it was created or last unmounted.
    pub fn is_mounted(&self) -> bool {
        self.deps.is_some()
    }

    /// Dependencies of the current cycle.
    pub fn deps(&self) -> Option<&DependencyKey<V>> {
        self.deps.as_ref()
    }

    /// The driven scheduler.
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// The driven scheduler, mutably (e.g. to await a sequencer's `settle`).
    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}

fn unmount<V, S: EffectScheduler>(scheduler: &mut S, deps: &mut Option<DependencyKey<V>>) -> bool {
    if deps.take().is_none() {
        return false;
    }
    tracing::debug!("effseq.host.unmount");
    scheduler.cleanup();
    true
}

impl<V, S: EffectScheduler> Drop for AsyncEffectHook<V, S> {
    fn drop(&mut self) {
        unmount(&mut self.scheduler, &mut self.deps);
    }
}
