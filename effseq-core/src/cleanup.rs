//! Effects and cleanups: the one-shot async units a sequencer orders.

use crate::error::EffectError;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::panic::{AssertUnwindSafe, catch_unwind};

/// Future returned by a cleanup.
pub type CleanupFuture = BoxFuture<'static, Result<(), EffectError>>;

/// Future returned by an effect. Resolves to the cleanup for that run.
pub type EffectFuture = BoxFuture<'static, Result<Cleanup, EffectError>>;

/// Teardown for one effect run. Runs at most once.
///
/// A cleanup built with [`Cleanup::noop`] is the degenerate cleanup the
/// sequencer substitutes when an effect fails.
pub struct Cleanup {
    f: Option<Box<dyn FnOnce() -> CleanupFuture + Send>>,
}

impl Cleanup {
    /// Wrap an async teardown closure.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), EffectError>> + Send + 'static,
    {
        Self {
            f: Some(Box::new(move || f().boxed())),
        }
    }

    /// A cleanup that does nothing.
    pub fn noop() -> Self {
        Self { f: None }
    }

    /// Whether this is a no-op cleanup.
    pub fn is_noop(&self) -> bool {
        self.f.is_none()
    }

    /// Invoke the cleanup and wait for it.
    ///
    /// Panics raised while building or polling the cleanup future are
    /// caught and returned as [`EffectError::Panicked`].
    pub async fn run(self) -> Result<(), EffectError> {
        let Some(f) = self.f else {
            return Ok(());
        };
        let fut = catch_unwind(AssertUnwindSafe(f)).map_err(EffectError::from_panic)?;
        AssertUnwindSafe(fut)
            .catch_unwind()
            .await
            .map_err(EffectError::from_panic)?
    }
}

impl Default for Cleanup {
    fn default() -> Self {
        Self::noop()
    }
}

impl fmt::Debug for Cleanup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_noop() {
            f.write_str("Cleanup::noop")
        } else {
            f.write_str("Cleanup(..)")
        }
    }
}

/// Setup for one effect cycle. Invoked once; resolves to that cycle's [`Cleanup`].
pub struct EffectFn {
    f: Box<dyn FnOnce() -> EffectFuture + Send>,
}

impl EffectFn {
    /// Wrap an async effect closure.
    ///
    /// ```
    /// use effseq_core::{Cleanup, EffectFn};
    ///
    /// let effect = EffectFn::new(|| async {
    ///     // subscribe, open, start...
    ///     Ok(Cleanup::new(|| async { Ok(()) }))
    /// });
    /// # drop(effect);
    /// ```
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Cleanup, EffectError>> + Send + 'static,
    {
        Self {
            f: Box::new(move || f().boxed()),
        }
    }

    /// Invoke the effect and wait for its cleanup.
    ///
    /// A panic before the future exists and a panic while it is polled are
    /// both reported as [`EffectError::Panicked`]; callers see one failure
    /// shape regardless of when the effect broke.
    pub async fn run(self) -> Result<Cleanup, EffectError> {
        let fut = catch_unwind(AssertUnwindSafe(self.f)).map_err(EffectError::from_panic)?;
        AssertUnwindSafe(fut)
            .catch_unwind()
            .await
            .map_err(EffectError::from_panic)?
    }
}

impl fmt::Debug for EffectFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EffectFn(..)")
    }
}
