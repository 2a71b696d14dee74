//! Pluggable event sinks.

use std::sync::{Arc, Mutex, PoisonError};

use crate::events::WarpEvent;

/// Trait for event consumers.
///
/// Implement this to create custom telemetry outputs.
pub trait EventSink: Send {
    /// Process a single event.
    fn handle(&mut self, event: &WarpEvent);

    /// Process one frame's events, in emission order.
    fn handle_batch(&mut self, events: &[WarpEvent]) {
        for event in events {
            self.handle(event);
        }
    }

    /// Called when the session ends. Flush buffers, close files, etc.
    fn finalize(&mut self) {}

    /// Returns a human-readable name for this sink.
    fn name(&self) -> &str;
}

/// Collects events into a buffer shared with its clones.
///
/// Register one clone on the bus and keep another to read the events back.
#[derive(Debug, Clone, Default)]
pub struct VecSink {
    events: Arc<Mutex<Vec<WarpEvent>>>,
}

impl VecSink {
    /// Creates an empty vec sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the events collected so far.
    pub fn events(&self) -> Vec<WarpEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of events collected so far.
    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns true if no events were collected.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops collected events.
    pub fn clear(&self) {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl EventSink for VecSink {
    fn handle(&mut self, event: &WarpEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }

    fn handle_batch(&mut self, events: &[WarpEvent]) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(events);
    }

    fn name(&self) -> &str {
        "vec_sink"
    }
}

/// Logs events through `tracing` at a fixed level.
#[derive(Debug, Clone, Copy)]
pub struct TracingSink {
    level: tracing::Level,
}

impl TracingSink {
    /// Creates a new tracing sink at the given log level.
    pub fn new(level: tracing::Level) -> Self {
        Self { level }
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new(tracing::Level::DEBUG)
    }
}

impl EventSink for TracingSink {
    fn handle(&mut self, event: &WarpEvent) {
        match self.level {
            tracing::Level::ERROR => {
                tracing::error!(frame = event.frame, event = ?event.kind, "warp_event")
            }
            tracing::Level::WARN => {
                tracing::warn!(frame = event.frame, event = ?event.kind, "warp_event")
            }
            tracing::Level::INFO => {
                tracing::info!(frame = event.frame, event = ?event.kind, "warp_event")
            }
            tracing::Level::DEBUG => {
                tracing::debug!(frame = event.frame, event = ?event.kind, "warp_event")
            }
            _ => {
                tracing::trace!(frame = event.frame, event = ?event.kind, "warp_event")
            }
        }
    }

    fn name(&self) -> &str {
        "tracing_sink"
    }
}
