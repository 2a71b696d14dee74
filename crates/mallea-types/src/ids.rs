//! Strongly-typed identifiers for warp entities.
//!
//! Newtype wrappers keep control-node indices, render-vertex indices and
//! pin ids from being mixed up at API boundaries.

use serde::{Deserialize, Serialize};

/// Index into the control graph's node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Index into the render mesh's vertex buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexId(pub u32);

/// Identifier of a user pin, unique within one editing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PinId(pub u32);

impl NodeId {
    /// Returns the raw index as `usize` for array indexing.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl VertexId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for NodeId {
    fn from(val: usize) -> Self {
        Self(val as u32)
    }
}

impl From<usize> for VertexId {
    fn from(val: usize) -> Self {
        Self(val as u32)
    }
}

impl std::fmt::Display for PinId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pin#{}", self.0)
    }
}

/// Per-session pin id counter.
///
/// Each editing session owns one allocator, so two editors living in the
/// same process hand out overlapping ids without colliding.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PinIdAllocator {
    next: u32,
}

impl PinIdAllocator {
    /// Creates an allocator whose first id is `PinId(0)`.
    pub fn new() -> Self {
        Self { next: 0 }
    }

    /// Returns a fresh id.
    pub fn allocate(&mut self) -> PinId {
        let id = PinId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u32 {
        self.next
    }
}
