//! Numeric defaults and degeneracy thresholds.

/// Default number of ARAP local/global passes per `solve()` call.
pub const DEFAULT_ARAP_ITERATIONS: u32 = 3;

/// ARAP passes used by the "final quality" preset.
pub const FINAL_QUALITY_ARAP_ITERATIONS: u32 = 20;

/// Default cap on conjugate gradient iterations per coordinate channel.
pub const DEFAULT_CG_MAX_ITERATIONS: usize = 100;

/// Default relative residual tolerance for conjugate gradient.
pub const DEFAULT_CG_TOLERANCE: f64 = 1.0e-6;

/// Curvature (`pᵀAp`) below which CG stops instead of dividing.
pub const CG_CURVATURE_EPSILON: f64 = 1.0e-20;

/// Initial squared residual below which CG reports immediate convergence.
pub const CG_RESIDUAL_EPSILON: f64 = 1.0e-24;

/// Floor applied to eigenvalues of `MᵀM` before inversion in polar decomposition.
pub const EIGEN_EPSILON: f64 = 1.0e-12;

/// Length below which an edge or displacement is treated as zero.
pub const DEGENERATE_LENGTH: f64 = 1.0e-9;

/// Squared distance below which a render vertex is bound rigidly to one node.
pub const COINCIDENT_DISTANCE_SQ: f64 = 1.0e-12;

/// Default control-graph node count.
pub const DEFAULT_NODE_COUNT: usize = 200;

/// Default interior jitter, as a fraction of grid spacing.
pub const DEFAULT_JITTER_RATIO: f64 = 0.1;

/// Default edge radius, as a multiple of grid spacing.
pub const DEFAULT_MAX_EDGE_DISTANCE_RATIO: f64 = 1.5;

/// Number of samples taken along an edge when applying seam barriers.
pub const SEAM_SAMPLES: usize = 8;

/// Default seam barrier strength (`kappa`).
pub const DEFAULT_SEAM_KAPPA: f64 = 6.0;

/// Default render-mesh vertex spacing in pixels.
pub const DEFAULT_MESH_RESOLUTION: f64 = 16.0;

/// Default number of control nodes blended per render vertex.
pub const DEFAULT_SKIN_NEIGHBORS: usize = 4;
