//! In-memory implementations for testing.
//!
//! Available behind the `test-utils` feature flag.

mod recording_scheduler;
mod recording_sink;

pub use recording_scheduler::{RecordingScheduler, SchedulerCall};
pub use recording_sink::{RecordedFailure, RecordingSink};
