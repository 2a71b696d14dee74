//! Frame-batched event bus.
//!
//! The session queues events while it edits pins and solves, then calls
//! [`EventBus::flush`] once per frame. Each sink receives the whole batch in
//! one [`EventSink::handle_batch`] call, so a frame's events reach a sink
//! contiguously and in emission order.

use crate::events::WarpEvent;
use crate::sinks::EventSink;

/// Queue of pending warp events plus the sinks they are delivered to.
pub struct EventBus {
    pending: Vec<WarpEvent>,
    sinks: Vec<Box<dyn EventSink>>,
    enabled: bool,
    delivered: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            sinks: Vec::new(),
            enabled: true,
            delivered: 0,
        }
    }

    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    /// Disabling drops the pending batch and ignores later events.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.pending.clear();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Queues an event for the next flush.
    pub fn emit(&mut self, event: WarpEvent) {
        if self.enabled {
            self.pending.push(event);
        }
    }

    /// Events queued since the last flush.
    pub fn pending(&self) -> &[WarpEvent] {
        &self.pending
    }

    /// Hands the pending batch to every sink and returns its size.
    ///
    /// Without sinks the batch is discarded.
    pub fn flush(&mut self) -> usize {
        let batch = std::mem::take(&mut self.pending);
        if batch.is_empty() {
            return 0;
        }
        for sink in &mut self.sinks {
            sink.handle_batch(&batch);
        }
        self.delivered += batch.len() as u64;
        batch.len()
    }

    /// Flushes, then lets every sink finalize.
    pub fn finish(&mut self) {
        self.flush();
        for sink in &mut self.sinks {
            sink.finalize();
        }
    }

    /// Total events flushed over the bus's lifetime.
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("sinks", &self.sinks.iter().map(|s| s.name()).collect::<Vec<_>>())
            .field("pending", &self.pending.len())
            .field("delivered", &self.delivered)
            .field("enabled", &self.enabled)
            .finish()
    }
}
