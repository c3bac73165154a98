//! Dependency keys: the positional comparison that decides when a cycle reruns.

use serde::{Deserialize, Serialize};

/// Ordered list of values an effect depends on.
///
/// Two keys are the same when they have the same length and are equal at
/// every position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyKey<V>(Vec<V>);

impl<V> DependencyKey<V> {
    /// Create a key from its values.
    pub fn new(values: Vec<V>) -> Self {
        Self(values)
    }

    /// A key with no values. Never differs from another empty key, so an
    /// effect rendered with it runs once per mount.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// The values, in order.
    pub fn as_slice(&self) -> &[V] {
        &self.0
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the key has no values.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V: PartialEq> DependencyKey<V> {
    /// Whether this key should trigger a new cycle after `prev`.
    ///
    /// A change in length always counts as a change. Hosts are expected to
    /// keep the length fixed, so it is also logged.
    pub fn changed_from(&self, prev: &Self) -> bool {
        if self.0.len() != prev.0.len() {
            tracing::warn!(
                previous = prev.0.len(),
                current = self.0.len(),
                "effseq.host.deps_length_changed"
            );
            return true;
        }
        self.0.iter().zip(&prev.0).any(|(a, b)| a != b)
    }
}

impl<V> Default for DependencyKey<V> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<V> From<Vec<V>> for DependencyKey<V> {
    fn from(values: Vec<V>) -> Self {
        Self(values)
    }
}

impl<V, const N: usize> From<[V; N]> for DependencyKey<V> {
    fn from(values: [V; N]) -> Self {
        Self(values.into())
    }
}
