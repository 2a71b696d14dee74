//! Control nodes and the edges between them.

use mallea_math::{DMat2, DVec2};
use serde::{Deserialize, Serialize};

/// A coupling between a node and one of its neighbours.
///
/// Edges are stored on both endpoints. Indices and rest vectors are fixed
/// once the graph is built; only `weight` changes (seam barriers).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Index of the neighbour in the graph's node arena.
    pub neighbor: usize,
    /// Distance weight `1 / (d + 1)` assigned at build time.
    pub base_weight: f64,
    /// Current coupling weight (base weight after seam attenuation).
    pub weight: f64,
    /// Rest displacement from this node to the neighbour (`p_j − p_i`).
    pub rest_vector: DVec2,
}

/// One solver node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlNode {
    /// Rest position in image coordinates.
    pub rest: DVec2,
    /// Current solved position.
    pub position: DVec2,
    /// Current best-fit local rotation.
    pub rotation: DMat2,
    /// Outgoing edges.
    pub edges: Vec<GraphEdge>,
    /// Sum of pin weights acting on this node.
    pub pin_weight: f64,
    /// Sum of weight-scaled pin targets acting on this node.
    pub pin_target: DVec2,
    /// Stiffness multiplier applied to this node's couplings.
    pub stiffness: f64,
    /// Whether the node sits on the image border (never jittered).
    pub border: bool,
}

impl ControlNode {
    /// Creates an unpinned node at rest.
    pub fn new(rest: DVec2, border: bool) -> Self {
        Self {
            rest,
            position: rest,
            rotation: DMat2::IDENTITY,
            edges: Vec::new(),
            pin_weight: 0.0,
            pin_target: DVec2::ZERO,
            stiffness: 1.0,
            border,
        }
    }

    /// Current displacement from rest.
    #[inline]
    pub fn displacement(&self) -> DVec2 {
        self.position - self.rest
    }

    /// Applies this node's rigid map to a rest-space point:
    /// `R·(point − rest) + position`.
    #[inline]
    pub fn transform_point(&self, point: DVec2) -> DVec2 {
        self.rotation * (point - self.rest) + self.position
    }

    /// Number of neighbours.
    #[inline]
    pub fn degree(&self) -> usize {
        self.edges.len()
    }
}
