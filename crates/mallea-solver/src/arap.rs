//! As-Rigid-As-Possible local/global iteration.
//!
//! Each pass:
//! 1. **Local step**: fit, per node, the rotation that best explains how
//!    its neighbourhood moved: `R_i = polar(Σ_j c_ij (x_i − x_j)(p_i − p_j)ᵀ)`
//! 2. **Global step**: hold rotations fixed and solve `A·x = b` for the x
//!    and y channels, warm-started from the previous solution
//!
//! Passes are capped per call; a truncated solve is the normal outcome.

use std::time::{Duration, Instant};

use mallea_graph::ControlGraph;
use mallea_math::decomposition::{outer, polar_decomposition};
use mallea_math::{DMat2, DVec2};
use mallea_types::constants::DEGENERATE_LENGTH;
use mallea_types::{WarpError, WarpResult};

use crate::assembly::assemble_rhs;
use crate::config::SolveOptions;
use crate::state::ArapState;

/// Outcome of one local/global pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationReport {
    /// CG iterations spent on the x and y channels together (0 for Cholesky).
    pub cg_iterations: usize,
    /// Worse of the two channels' final relative residuals.
    pub cg_residual: f64,
    /// Largest node movement during the pass.
    pub max_step: f64,
}

/// Outcome of a `solve` call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolveReport {
    /// Passes performed.
    pub iterations: u32,
    /// CG iterations over all passes and both channels.
    pub cg_iterations: usize,
    /// Largest node movement during the last pass.
    pub max_step: f64,
    /// Wall-clock time for the call.
    pub wall_time: Duration,
    /// Per-pass details, in order.
    pub history: Vec<IterationReport>,
}

/// Fits every node's rotation to its current neighbourhood.
///
/// Edges with a (near) zero rest or current length carry no orientation
/// and are skipped; a node with no usable edge gets the identity.
pub fn local_step(graph: &mut ControlGraph) {
    for i in 0..graph.node_count() {
        let rotation = {
            let node = &graph.nodes[i];
            let mut covariance = DMat2::ZERO;
            for edge in &node.edges {
                let rest = -edge.rest_vector;
                let current = node.position - graph.nodes[edge.neighbor].position;
                if rest.length() < DEGENERATE_LENGTH || current.length() < DEGENERATE_LENGTH {
                    continue;
                }
                covariance += outer(current, rest) * graph.coupling(i, edge);
            }
            polar_decomposition(covariance)
        };
        graph.nodes[i].rotation = rotation;
    }
}

/// Runs one local/global pass and overwrites node positions.
///
/// Fails only if the state has no system matrix, was sized for a different
/// graph, or the Cholesky backend cannot factor the matrix.
pub fn arap_iteration(
    graph: &mut ControlGraph,
    state: &mut ArapState,
    options: &SolveOptions,
) -> WarpResult<IterationReport> {
    check_ready(graph, state)?;

    local_step(graph);

    assemble_rhs(graph, &state.system, &mut state.rhs_x, &mut state.rhs_y);
    let (cg_iterations, cg_residual) = state.solve_channels(options)?;

    let mut max_step = 0.0_f64;
    for (i, node) in graph.nodes.iter_mut().enumerate() {
        let solved = DVec2::new(state.sol_x[i], state.sol_y[i]);
        max_step = max_step.max(solved.distance(node.position));
        node.position = solved;
    }

    Ok(IterationReport {
        cg_iterations,
        cg_residual,
        max_step,
    })
}

/// Runs `options.iterations` local/global passes.
///
/// A matrix built before the latest pin or stiffness edit is still used,
/// with a warning: the result honours the old constraint set.
pub fn solve(
    graph: &mut ControlGraph,
    state: &mut ArapState,
    options: &SolveOptions,
) -> WarpResult<SolveReport> {
    check_ready(graph, state)?;
    if state.is_stale(graph) {
        tracing::warn!(
            revision = graph.revision(),
            "solving against a stale system matrix; call update_system_matrix after editing pins"
        );
    }

    let start = Instant::now();
    let mut report = SolveReport {
        history: Vec::with_capacity(options.iterations as usize),
        ..Default::default()
    };

    for _ in 0..options.iterations {
        let pass = arap_iteration(graph, state, options)?;
        report.iterations += 1;
        report.cg_iterations += pass.cg_iterations;
        report.max_step = pass.max_step;
        report.history.push(pass);
    }

    report.wall_time = start.elapsed();
    tracing::trace!(
        iterations = report.iterations,
        cg_iterations = report.cg_iterations,
        max_step = report.max_step,
        "solve finished"
    );
    Ok(report)
}

fn check_ready(graph: &ControlGraph, state: &ArapState) -> WarpResult<()> {
    if !state.is_initialized() {
        return Err(WarpError::NotInitialized(
            "call update_system_matrix before solving".into(),
        ));
    }
    if state.node_count() != graph.node_count() {
        return Err(WarpError::DimensionMismatch {
            expected: state.node_count(),
            actual: graph.node_count(),
        });
    }
    Ok(())
}
