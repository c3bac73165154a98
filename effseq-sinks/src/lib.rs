#![deny(missing_docs)]
//! Failure sinks for effseq.
//!
//! [`TracingSink`] turns absorbed failures into `tracing` events and is what
//! a sequencer reports to unless told otherwise. [`SinkRegistry`] fans one
//! report out to an ordered list of sinks.

mod registry;
mod tracing_sink;

pub use registry::SinkRegistry;
pub use tracing_sink::TracingSink;
