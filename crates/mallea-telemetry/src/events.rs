//! Warp event types.
//!
//! Lightweight value types emitted at fixed points of each frame. They
//! carry just enough data for monitoring and debugging.

use serde::{Deserialize, Serialize};

/// An event emitted by the warp session, tagged with the frame it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarpEvent {
    /// Frame number (count of completed `update` calls).
    pub frame: u64,
    /// Event payload.
    pub kind: EventKind,
}

/// Event payload variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// Pin set re-applied to the graph.
    PinsApplied {
        pins: usize,
        /// Nodes carrying non-zero pin weight.
        influenced_nodes: usize,
    },

    /// System matrix rebuilt (and refactored, for direct solvers).
    SystemRebuilt {
        nodes: usize,
        nnz: usize,
    },

    /// Solve started.
    SolveBegin {
        /// ARAP iterations requested.
        iterations: u32,
    },

    /// One local/global iteration finished.
    ArapIteration {
        iteration: u32,
        /// CG iterations spent on both channels.
        cg_iterations: usize,
        /// Largest node movement during the iteration.
        max_step: f64,
    },

    /// Solve finished.
    SolveEnd {
        iterations: u32,
        /// Wall-clock time for the whole solve (seconds).
        wall_time: f64,
    },

    /// Custom event for extensibility.
    Custom {
        /// Arbitrary label.
        label: String,
        /// JSON-encoded payload.
        payload: String,
    },
}

impl WarpEvent {
    /// Creates a new event for the given frame.
    pub fn new(frame: u64, kind: EventKind) -> Self {
        Self { frame, kind }
    }
}
