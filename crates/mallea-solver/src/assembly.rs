//! Global-step right-hand side.
//!
//! For node `i` with rest position `p_i`:
//!
//! ```text
//! b_i = Σ_j c_ij · ½(R_i + R_j) · (p_i − p_j) + pin_target_i + damping_i · p_i
//! ```
//!
//! where `c_ij` is the symmetric edge coupling. Paired with the system
//! matrix this is the normal equation of the ARAP energy with the local
//! rotations held fixed.

use mallea_graph::{constraint_term, ControlGraph, SystemOptions};

/// Fills `rhs_x` / `rhs_y` from the graph's current rotations.
///
/// Both slices must have length `graph.node_count()`.
pub fn assemble_rhs(
    graph: &ControlGraph,
    system: &SystemOptions,
    rhs_x: &mut [f64],
    rhs_y: &mut [f64],
) {
    for (i, node) in graph.nodes.iter().enumerate() {
        let mut b = constraint_term(node, system);
        for edge in &node.edges {
            let other = &graph.nodes[edge.neighbor];
            let avg = (node.rotation + other.rotation) * 0.5;
            // rest_vector is p_j − p_i
            b -= avg * edge.rest_vector * graph.coupling(i, edge);
        }
        rhs_x[i] = b.x;
        rhs_y[i] = b.y;
    }
}
