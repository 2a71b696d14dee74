//! Per-node stiffness multipliers.

use crate::field::ScalarField;
use crate::graph::ControlGraph;
use mallea_types::{WarpError, WarpResult};

/// Sets every node's stiffness multiplier to `base`.
pub fn set_uniform_stiffness(graph: &mut ControlGraph, base: f64) -> WarpResult<()> {
    check_base(base)?;
    for node in &mut graph.nodes {
        node.stiffness = base;
    }
    graph.bump_revision();
    Ok(())
}

/// Sets each node's multiplier to `base · (1 + field(rest))`, floored at zero.
pub fn apply_stiffness_field(
    graph: &mut ControlGraph,
    field: &ScalarField,
    base: f64,
) -> WarpResult<()> {
    check_base(base)?;
    field.check_aligned(graph.width, graph.height)?;
    for node in &mut graph.nodes {
        node.stiffness = (base * (1.0 + field.sample(node.rest))).max(0.0);
    }
    graph.bump_revision();
    tracing::debug!(base, "stiffness field applied");
    Ok(())
}

fn check_base(base: f64) -> WarpResult<()> {
    if base.is_finite() && base >= 0.0 {
        Ok(())
    } else {
        Err(WarpError::InvalidMaterial(format!(
            "stiffness multiplier must be non-negative, got {base}"
        )))
    }
}
