//! # mallea-telemetry
//!
//! Event bus for warp telemetry. The editing session emits structured
//! events (pin changes, matrix rebuilds, per-iteration solver progress)
//! that pluggable sinks consume: an in-memory buffer for tests and tools,
//! or `tracing` for logs.

pub mod bus;
pub mod events;
pub mod sinks;

pub use bus::EventBus;
pub use events::{EventKind, WarpEvent};
pub use sinks::{EventSink, TracingSink, VecSink};
