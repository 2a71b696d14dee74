//! ARAP solver state.
//!
//! Owns the system matrix and the per-channel buffers reused across
//! frames. Solution buffers double as the CG warm start: each frame starts
//! from the previous frame's answer.

use mallea_graph::{build_system_matrix, ControlGraph, SystemOptions};
use mallea_math::cg::{CgResult, CgWorkspace};
use mallea_math::faer_solver::FaerSolver;
use mallea_math::sparse::{CsrMatrix, SparseSolver};
use mallea_types::{WarpError, WarpResult};

use crate::config::{LinearSolverKind, SolveOptions};

/// Mutable solver buffers for one control graph.
///
/// # Layout
///
/// All buffers have length `node_count`; x and y are solved as two
/// independent scalar systems against the same matrix.
#[derive(Debug, Default)]
pub struct ArapState {
    /// System matrix; `None` until [`update_system_matrix`](Self::update_system_matrix).
    matrix: Option<CsrMatrix>,
    /// Damping terms the matrix was built with.
    pub(crate) system: SystemOptions,

    // ─── Solution (warm start) ───
    pub sol_x: Vec<f64>,
    pub sol_y: Vec<f64>,

    // ─── Right-hand side ───
    pub rhs_x: Vec<f64>,
    pub rhs_y: Vec<f64>,

    /// Scratch vectors shared by both channels.
    pub(crate) workspace: CgWorkspace,
    /// Cholesky factor of `matrix`, built on first use after each rebuild.
    pub(crate) direct: Option<FaerSolver>,
    /// Graph revision the matrix was built from.
    built_revision: Option<u64>,
}

impl ArapState {
    /// Creates an empty state. Nothing can be solved until the system
    /// matrix has been built.
    pub fn new(system: SystemOptions) -> Self {
        Self {
            system,
            ..Default::default()
        }
    }

    /// Creates a state and builds its matrix for `graph`.
    pub fn for_graph(graph: &ControlGraph, system: SystemOptions) -> Self {
        let mut state = Self::new(system);
        state.update_system_matrix(graph);
        state
    }

    /// Rebuilds the system matrix from the graph's current couplings and
    /// pin weights.
    ///
    /// Must be called after every pin, stiffness or seam change; solving
    /// against the old matrix uses the old constraint set. Buffers are
    /// (re)seeded from node positions when the node count changes.
    pub fn update_system_matrix(&mut self, graph: &ControlGraph) {
        let n = graph.node_count();
        if self.sol_x.len() != n {
            self.sync_positions(graph);
            self.rhs_x = vec![0.0; n];
            self.rhs_y = vec![0.0; n];
            self.workspace = CgWorkspace::new(n);
        }

        let matrix = build_system_matrix(graph, &self.system);
        tracing::debug!(
            nodes = n,
            nnz = matrix.nnz(),
            revision = graph.revision(),
            "system matrix rebuilt"
        );
        self.matrix = Some(matrix);
        self.direct = None;
        self.built_revision = Some(graph.revision());
    }

    /// Changes the damping terms. Takes effect at the next matrix rebuild.
    pub fn set_system_options(&mut self, system: SystemOptions) {
        self.system = system;
    }

    /// Damping terms in use.
    pub fn system_options(&self) -> &SystemOptions {
        &self.system
    }

    /// Copies current node positions into the warm-start buffers.
    pub fn sync_positions(&mut self, graph: &ControlGraph) {
        self.sol_x = graph.nodes.iter().map(|n| n.position.x).collect();
        self.sol_y = graph.nodes.iter().map(|n| n.position.y).collect();
    }

    /// Whether a system matrix exists.
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.matrix.is_some()
    }

    /// Whether the graph's constraints changed since the matrix was built.
    pub fn is_stale(&self, graph: &ControlGraph) -> bool {
        self.built_revision != Some(graph.revision())
    }

    /// Current system matrix.
    pub fn matrix(&self) -> Option<&CsrMatrix> {
        self.matrix.as_ref()
    }

    /// Number of nodes the buffers are sized for.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.sol_x.len()
    }

    /// Solves `A·sol = rhs` for both channels in place.
    ///
    /// Returns the CG iterations spent and the worse relative residual
    /// (`0, 0.0` for the direct backend).
    pub(crate) fn solve_channels(&mut self, options: &SolveOptions) -> WarpResult<(usize, f64)> {
        let Self {
            matrix,
            sol_x,
            sol_y,
            rhs_x,
            rhs_y,
            workspace,
            direct,
            ..
        } = self;
        let a = matrix
            .as_ref()
            .ok_or_else(|| WarpError::NotInitialized("system matrix not built".into()))?;

        let run = |ws: &mut CgWorkspace, b: &[f64], x: &mut [f64]| -> CgResult {
            match options.linear_solver {
                LinearSolverKind::JacobiConjugateGradient => ws.solve_preconditioned(
                    a,
                    b,
                    x,
                    options.cg_max_iterations,
                    options.cg_tolerance,
                ),
                _ => ws.solve(a, b, x, options.cg_max_iterations, options.cg_tolerance),
            }
        };

        match options.linear_solver {
            LinearSolverKind::Cholesky => {
                if direct.is_none() {
                    let mut solver = FaerSolver::new();
                    solver.factorize(a)?;
                    *direct = Some(solver);
                }
                let solver = direct
                    .as_ref()
                    .ok_or_else(|| WarpError::NotInitialized("direct solver missing".into()))?;
                solver.solve(rhs_x, sol_x)?;
                solver.solve(rhs_y, sol_y)?;
                Ok((0, 0.0))
            }
            LinearSolverKind::ConjugateGradient | LinearSolverKind::JacobiConjugateGradient => {
                let rx = run(&mut *workspace, rhs_x.as_slice(), sol_x.as_mut_slice());
                let ry = run(&mut *workspace, rhs_y.as_slice(), sol_y.as_mut_slice());
                Ok((
                    rx.iterations + ry.iterations,
                    rx.relative_residual.max(ry.relative_residual),
                ))
            }
        }
    }
}
