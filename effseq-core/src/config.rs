//! Sequencer configuration.

use serde::{Deserialize, Serialize};

/// Per-sequencer settings. Missing fields take their defaults when
/// deserialized, so partial configs are valid.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerConfig {
    /// Name attached to every log event and failure report.
    pub label: String,

    /// Log a warning when `register` is called while the previous cycle's
    /// cleanup was never requested. The orphaned cleanup runs either way.
    pub warn_on_orphaned_cleanup: bool,
}

impl SequencerConfig {
    /// Default configuration with a custom label.
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            label: "effseq".to_string(),
            warn_on_orphaned_cleanup: true,
        }
    }
}
