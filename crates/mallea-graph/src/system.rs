//! Assembly of the global-step system matrix.
//!
//! `A = L_w + diag(pin_weight) + diag(damping on border nodes)` where `L_w`
//! is the coupling-weighted graph Laplacian. The same matrix serves the x
//! and y channels. It is symmetric positive semi-definite; it is positive
//! definite only when some node carries pin weight or boundary damping.

use mallea_math::sparse::CsrMatrix;
use mallea_math::DVec2;
use serde::{Deserialize, Serialize};

use crate::graph::ControlGraph;
use crate::node::ControlNode;

/// Extra diagonal terms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemOptions {
    /// Weight tying border nodes to their rest positions. 0 disables it.
    pub boundary_damping: f64,
}

/// Assembles the N×N system matrix from graph couplings and pin weights.
pub fn build_system_matrix(graph: &ControlGraph, options: &SystemOptions) -> CsrMatrix {
    let n = graph.node_count();
    let nnz: usize = graph.nodes.iter().map(|node| node.edges.len() + 1).sum();
    let mut triplets: Vec<(usize, usize, f64)> = Vec::with_capacity(nnz);

    for (i, node) in graph.nodes.iter().enumerate() {
        let mut diagonal = node.pin_weight + damping_for(node, options);
        for edge in &node.edges {
            let w = graph.coupling(i, edge);
            triplets.push((i, edge.neighbor, -w));
            diagonal += w;
        }
        triplets.push((i, i, diagonal));
    }

    let matrix = CsrMatrix::from_triplets(n, n, &triplets);
    tracing::trace!(n, nnz = matrix.nnz(), "system matrix assembled");
    matrix
}

/// Constant part of a node's right-hand side: pin targets plus damping pull.
#[inline]
pub fn constraint_term(node: &ControlNode, options: &SystemOptions) -> DVec2 {
    node.pin_target + node.rest * damping_for(node, options)
}

#[inline]
fn damping_for(node: &ControlNode, options: &SystemOptions) -> f64 {
    if node.border {
        options.boundary_damping
    } else {
        0.0
    }
}
