//! Seam barriers: weaken edges that cross strong image boundaries.
//!
//! Each edge samples the boundary field at evenly spaced points along its
//! rest segment and is scaled by `exp(−kappa · mean)`. Weights are always
//! recomputed from the edge's base weight, so applying a new field replaces
//! the previous one instead of compounding.

use mallea_types::constants::{DEFAULT_SEAM_KAPPA, SEAM_SAMPLES};
use mallea_types::{WarpError, WarpResult};
use serde::{Deserialize, Serialize};

use crate::field::ScalarField;
use crate::graph::ControlGraph;

/// Seam barrier parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeamOptions {
    /// Attenuation strength. 0 disables the barrier.
    pub kappa: f64,
    /// Samples taken along each edge.
    pub samples: usize,
}

impl Default for SeamOptions {
    fn default() -> Self {
        Self {
            kappa: DEFAULT_SEAM_KAPPA,
            samples: SEAM_SAMPLES,
        }
    }
}

/// Scales every edge by the boundary strength along it.
pub fn apply_seam_barriers(
    graph: &mut ControlGraph,
    boundary: &ScalarField,
    options: &SeamOptions,
) -> WarpResult<()> {
    boundary.check_aligned(graph.width, graph.height)?;
    if options.samples == 0 {
        return Err(WarpError::InvalidConfig("seam samples must be at least 1".into()));
    }
    if !(options.kappa.is_finite() && options.kappa >= 0.0) {
        return Err(WarpError::InvalidConfig(format!(
            "seam kappa must be non-negative, got {}",
            options.kappa
        )));
    }

    let mut attenuated = 0usize;
    for i in 0..graph.nodes.len() {
        for e in 0..graph.nodes[i].edges.len() {
            let edge = graph.nodes[i].edges[e];
            let j = edge.neighbor;
            if j < i {
                continue;
            }

            let start = graph.nodes[i].rest;
            let mean = (0..options.samples)
                .map(|k| {
                    let t = (k as f64 + 0.5) / options.samples as f64;
                    boundary.sample(start + edge.rest_vector * t)
                })
                .sum::<f64>()
                / options.samples as f64;

            let weight = edge.base_weight * (-options.kappa * mean.max(0.0)).exp();
            if weight < edge.base_weight {
                attenuated += 1;
            }
            set_pair_weight(graph, i, e, weight);
        }
    }

    graph.bump_revision();
    tracing::debug!(attenuated, kappa = options.kappa, "seam barriers applied");
    Ok(())
}

/// Restores every edge to its base weight.
pub fn clear_seam_barriers(graph: &mut ControlGraph) {
    for node in &mut graph.nodes {
        for edge in &mut node.edges {
            edge.weight = edge.base_weight;
        }
    }
    graph.bump_revision();
}

/// Writes `weight` on edge `e` of node `i` and on its mirror edge.
fn set_pair_weight(graph: &mut ControlGraph, i: usize, e: usize, weight: f64) {
    let j = graph.nodes[i].edges[e].neighbor;
    graph.nodes[i].edges[e].weight = weight;
    if let Some(mirror) = graph.nodes[j].edges.iter_mut().find(|m| m.neighbor == i) {
        mirror.weight = weight;
    }
}
