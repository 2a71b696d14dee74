//! Pins: soft positional constraints folded into per-node accumulators.
//!
//! Each pin touches the nodes within its radius with a smoothstep falloff
//! `1 − t²(3 − 2t)`, `t = distance / radius`. A node's `pin_weight` is the
//! sum of `stiffness · falloff` over pins and its `pin_target` the sum of
//! `target · weight`; the solve divides them out implicitly.

use mallea_math::geometry::closest_point_on_polyline;
use mallea_math::{DMat2, DVec2};
use mallea_types::{PinId, WarpError, WarpResult};
use serde::{Deserialize, Serialize};

use crate::graph::ControlGraph;

/// The constraint a pin expresses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PinKind {
    /// Pulls nearby nodes toward one point.
    Anchor {
        /// Where the pin was placed.
        rest: DVec2,
        /// Where it has been dragged to.
        target: DVec2,
    },
    /// Moves nearby nodes rigidly: rotate and scale about `rest`, then
    /// translate to `target`.
    Pose {
        rest: DVec2,
        target: DVec2,
        /// Rotation in radians.
        angle: f64,
        scale: f64,
    },
    /// Snaps nearby nodes onto a polyline.
    Rail {
        points: Vec<DVec2>,
    },
}

/// A user pin. Owned by the caller; the graph only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    pub id: PinId,
    pub kind: PinKind,
    /// Constraint strength in `[0, 1]`.
    pub stiffness: f64,
    /// Influence radius in image units.
    pub radius: f64,
}

impl Pin {
    pub fn new(id: PinId, kind: PinKind, stiffness: f64, radius: f64) -> Self {
        Self {
            id,
            kind,
            stiffness,
            radius,
        }
    }

    /// An anchor that has not been dragged yet.
    pub fn anchor(id: PinId, at: DVec2, stiffness: f64, radius: f64) -> Self {
        Self::new(id, PinKind::Anchor { rest: at, target: at }, stiffness, radius)
    }

    /// Moves the pin's target. Rails ignore this (edit their points instead).
    pub fn set_target(&mut self, to: DVec2) {
        match &mut self.kind {
            PinKind::Anchor { target, .. } | PinKind::Pose { target, .. } => *target = to,
            PinKind::Rail { .. } => {}
        }
    }

    /// Checks stiffness, radius and geometry.
    pub fn validate(&self) -> WarpResult<()> {
        if !(0.0..=1.0).contains(&self.stiffness) {
            return Err(WarpError::InvalidPin(format!(
                "{}: stiffness must be in [0, 1], got {}",
                self.id, self.stiffness
            )));
        }
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(WarpError::InvalidPin(format!(
                "{}: radius must be positive, got {}",
                self.id, self.radius
            )));
        }
        let finite = match &self.kind {
            PinKind::Anchor { rest, target } => rest.is_finite() && target.is_finite(),
            PinKind::Pose {
                rest,
                target,
                angle,
                scale,
            } => rest.is_finite() && target.is_finite() && angle.is_finite() && scale.is_finite(),
            PinKind::Rail { points } => {
                if points.len() < 2 {
                    return Err(WarpError::InvalidPin(format!(
                        "{}: rail needs at least 2 points, got {}",
                        self.id,
                        points.len()
                    )));
                }
                points.iter().all(|p| p.is_finite())
            }
        };
        if !finite {
            return Err(WarpError::InvalidPin(format!("{}: non-finite geometry", self.id)));
        }
        Ok(())
    }

    /// Weight and target this pin contributes to a node at rest position `p`,
    /// or `None` if the node is outside the radius.
    pub fn influence(&self, p: DVec2) -> Option<(f64, DVec2)> {
        match &self.kind {
            PinKind::Anchor { rest, target } => {
                let w = self.weight_at(p.distance(*rest))?;
                Some((w, *target))
            }
            PinKind::Pose {
                rest,
                target,
                angle,
                scale,
            } => {
                let w = self.weight_at(p.distance(*rest))?;
                let posed = *target + DMat2::from_angle(*angle) * (p - *rest) * *scale;
                Some((w, posed))
            }
            PinKind::Rail { points } => {
                let (closest, d) = closest_point_on_polyline(p, points)?;
                let w = self.weight_at(d)?;
                Some((w, closest))
            }
        }
    }

    fn weight_at(&self, distance: f64) -> Option<f64> {
        if distance >= self.radius {
            return None;
        }
        Some(self.stiffness * falloff(distance / self.radius))
    }
}

/// Smoothstep falloff `1 − t²(3 − 2t)` on `[0, 1]`, zero beyond.
#[inline]
pub fn falloff(t: f64) -> f64 {
    if t >= 1.0 {
        return 0.0;
    }
    let t = t.max(0.0);
    1.0 - t * t * (3.0 - 2.0 * t)
}

/// Summary of one `apply_pins` call.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PinStats {
    /// Pins applied.
    pub pins: usize,
    /// Nodes with non-zero pin weight afterwards.
    pub influenced_nodes: usize,
    /// Sum of all node pin weights.
    pub total_weight: f64,
}

/// Resets every node's pin accumulators, then folds in `pins`.
///
/// Idempotent: calling it twice with the same pins leaves the same state.
/// The graph is untouched if any pin fails validation.
pub fn apply_pins(graph: &mut ControlGraph, pins: &[Pin]) -> WarpResult<PinStats> {
    for pin in pins {
        pin.validate()?;
    }

    for node in &mut graph.nodes {
        node.pin_weight = 0.0;
        node.pin_target = DVec2::ZERO;
    }

    for pin in pins {
        for node in &mut graph.nodes {
            if let Some((w, target)) = pin.influence(node.rest) {
                node.pin_weight += w;
                node.pin_target += target * w;
            }
        }
    }

    graph.bump_revision();

    let stats = PinStats {
        pins: pins.len(),
        influenced_nodes: graph.nodes.iter().filter(|n| n.pin_weight > 0.0).count(),
        total_weight: graph.nodes.iter().map(|n| n.pin_weight).sum(),
    };
    tracing::debug!(
        pins = stats.pins,
        influenced = stats.influenced_nodes,
        total_weight = stats.total_weight,
        "pins applied"
    );
    Ok(stats)
}
