//! Linear blend skinning against the control graph.
//!
//! Every render vertex blends the rigid maps `R_i(p − rest_i) + x_i` of its
//! k nearest control nodes, weighted by inverse squared rest distance.
//! Neighbours are found by brute force; skin data is computed once per
//! graph/mesh pairing and reused every frame.

use mallea_graph::ControlGraph;
use mallea_math::{DMat2, DVec2};
use mallea_types::constants::COINCIDENT_DISTANCE_SQ;
use mallea_types::{WarpError, WarpResult};

use crate::mesh::RenderMesh;

/// Fills `mesh`'s skin arrays with the `k` nearest control nodes of each
/// vertex and their normalized weights.
///
/// `k` is clamped to the graph's node count. A vertex that coincides with a
/// node takes that node with weight 1.
pub fn compute_skin_weights(mesh: &mut RenderMesh, graph: &ControlGraph, k: usize) -> WarpResult<()> {
    if k == 0 {
        return Err(WarpError::InvalidConfig("skin neighbour count must be at least 1".into()));
    }
    if graph.node_count() == 0 {
        return Err(WarpError::InvalidGraph("cannot skin against an empty graph".into()));
    }

    let k = k.min(graph.node_count());
    let n = mesh.vertex_count();
    mesh.skin_k = k;
    mesh.skin_nodes.clear();
    mesh.skin_weights.clear();
    mesh.skin_nodes.reserve(n * k);
    mesh.skin_weights.reserve(n * k);

    let mut nearest = Vec::with_capacity(k);
    for i in 0..n {
        let p = mesh.rest_position(i);
        nearest_weights(graph, p, k, &mut nearest);
        for &(node, w) in &nearest {
            mesh.skin_nodes.push(node as u32);
            mesh.skin_weights.push(w);
        }
    }

    tracing::debug!(vertices = n, k, "skin weights computed");
    Ok(())
}

/// Writes the blended position of every vertex into the deformed buffer.
pub fn deform_mesh(mesh: &mut RenderMesh, graph: &ControlGraph) -> WarpResult<()> {
    if !mesh.is_skinned() {
        return Err(WarpError::NotInitialized("render mesh has no skin weights".into()));
    }
    if let Some(&max) = mesh.skin_nodes.iter().max() {
        if max as usize >= graph.node_count() {
            return Err(WarpError::DimensionMismatch {
                expected: graph.node_count(),
                actual: max as usize + 1,
            });
        }
    }

    let n = mesh.vertex_count();
    mesh.deformed_x.resize(n, 0.0);
    mesh.deformed_y.resize(n, 0.0);

    for i in 0..n {
        let p = mesh.rest_position(i);
        let offset: DVec2 = mesh
            .skin(i)
            .map(|(node, w)| node_offset(graph, node, p) * w)
            .sum();
        mesh.deformed_x[i] = p.x + offset.x;
        mesh.deformed_y[i] = p.y + offset.y;
    }
    Ok(())
}

/// Deformed location of an arbitrary rest-space point.
///
/// Recomputes the `k` nearest nodes on every call. Returns `point`
/// unchanged for an empty graph.
pub fn deform_point(graph: &ControlGraph, point: DVec2, k: usize) -> DVec2 {
    let k = k.max(1).min(graph.node_count());
    if k == 0 {
        return point;
    }
    let mut nearest = Vec::with_capacity(k);
    nearest_weights(graph, point, k, &mut nearest);
    let offset: DVec2 = nearest
        .iter()
        .map(|&(node, w)| node_offset(graph, node, point) * w)
        .sum();
    point + offset
}

/// Displacement node `node`'s rigid map applies to rest point `p`.
///
/// Blending offsets rather than absolute positions keeps an undeformed
/// graph an exact identity.
#[inline]
fn node_offset(graph: &ControlGraph, node: usize, p: DVec2) -> DVec2 {
    let n = &graph.nodes[node];
    (n.rotation - DMat2::IDENTITY) * (p - n.rest) + n.displacement()
}

/// The `k` nodes nearest to `p` with normalized inverse-squared weights.
fn nearest_weights(graph: &ControlGraph, p: DVec2, k: usize, out: &mut Vec<(usize, f64)>) {
    out.clear();

    // Sorted insertion into a k-sized buffer of (distance², node).
    let mut best: Vec<(f64, usize)> = Vec::with_capacity(k + 1);
    for (idx, node) in graph.nodes.iter().enumerate() {
        let d2 = node.rest.distance_squared(p);
        if best.len() == k && d2 >= best[k - 1].0 {
            continue;
        }
        let at = best.partition_point(|&(d, _)| d <= d2);
        best.insert(at, (d2, idx));
        best.truncate(k);
    }

    if let Some(&(d2, idx)) = best.first() {
        if d2 < COINCIDENT_DISTANCE_SQ {
            out.push((idx, 1.0));
            out.extend(best[1..].iter().map(|&(_, j)| (j, 0.0)));
            return;
        }
    }

    let total: f64 = best.iter().map(|&(d2, _)| 1.0 / d2).sum();
    out.extend(best.iter().map(|&(d2, j)| (j, (1.0 / d2) / total)));
}
