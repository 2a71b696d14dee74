//! Solver and session configuration.
//!
//! [`SolveOptions`] controls a single `solve` call. [`WarpConfig`] holds
//! everything needed to start an editing session and round-trips through
//! TOML.

use std::path::Path;

use mallea_graph::{GraphOptions, SeamOptions, SystemOptions};
use mallea_material::WarpMaterial;
use mallea_types::constants::{
    DEFAULT_ARAP_ITERATIONS, DEFAULT_CG_MAX_ITERATIONS, DEFAULT_CG_TOLERANCE,
    DEFAULT_MESH_RESOLUTION, DEFAULT_SKIN_NEIGHBORS, FINAL_QUALITY_ARAP_ITERATIONS,
};
use mallea_types::{WarpError, WarpResult};
use serde::{Deserialize, Serialize};

/// Linear solver used for the global step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinearSolverKind {
    /// Plain conjugate gradient, warm-started from the previous solution.
    #[default]
    ConjugateGradient,
    /// Jacobi-preconditioned conjugate gradient.
    JacobiConjugateGradient,
    /// Sparse Cholesky via `faer`, refactored after every matrix rebuild.
    /// Needs a strictly positive definite matrix (some pin or damping).
    Cholesky,
}

/// Settings for one `solve` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolveOptions {
    /// Local/global passes per call.
    pub iterations: u32,
    /// CG iteration cap per coordinate channel.
    pub cg_max_iterations: usize,
    /// CG relative residual tolerance.
    pub cg_tolerance: f64,
    /// Global-step backend.
    pub linear_solver: LinearSolverKind,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ARAP_ITERATIONS,
            cg_max_iterations: DEFAULT_CG_MAX_ITERATIONS,
            cg_tolerance: DEFAULT_CG_TOLERANCE,
            linear_solver: LinearSolverKind::default(),
        }
    }
}

impl SolveOptions {
    /// Per-frame settings for interactive dragging (the defaults).
    pub fn interactive() -> Self {
        Self::default()
    }

    /// Many more passes and a tighter CG tolerance, for a settle pass after
    /// the user lets go.
    pub fn final_quality() -> Self {
        Self {
            iterations: FINAL_QUALITY_ARAP_ITERATIONS,
            cg_max_iterations: 4 * DEFAULT_CG_MAX_ITERATIONS,
            cg_tolerance: 1e-9,
            ..Default::default()
        }
    }

    /// Interactive settings with the material's iteration count.
    pub fn for_material(material: &WarpMaterial) -> Self {
        Self {
            iterations: material.solve_iterations(),
            ..Default::default()
        }
    }

    /// Checks ranges.
    pub fn validate(&self) -> WarpResult<()> {
        if self.iterations == 0 {
            return Err(WarpError::InvalidConfig("iterations must be at least 1".into()));
        }
        if self.cg_max_iterations == 0 {
            return Err(WarpError::InvalidConfig(
                "cg_max_iterations must be at least 1".into(),
            ));
        }
        if !(self.cg_tolerance.is_finite() && self.cg_tolerance > 0.0) {
            return Err(WarpError::InvalidConfig(format!(
                "cg_tolerance must be positive, got {}",
                self.cg_tolerance
            )));
        }
        Ok(())
    }
}

/// Everything needed to start a [`WarpSession`](crate::WarpSession).
///
/// ```toml
/// width = 640.0
/// height = 480.0
/// material = "rubber"
///
/// [graph]
/// node_count = 200
///
/// [solve]
/// linear_solver = "jacobi_conjugate_gradient"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarpConfig {
    /// Image width in pixels.
    pub width: f64,
    /// Image height in pixels.
    pub height: f64,
    /// Control graph layout.
    pub graph: GraphOptions,
    /// Render mesh vertex spacing in pixels.
    pub mesh_resolution: f64,
    /// Control nodes blended per render vertex.
    pub skin_neighbors: usize,
    /// Material preset name.
    pub material: String,
    /// Take the ARAP iteration count from the material instead of `solve`.
    pub iterations_from_material: bool,
    /// Seam barrier strength, used when a boundary field is supplied.
    pub seam: SeamOptions,
    /// Extra diagonal terms of the system matrix.
    pub system: SystemOptions,
    /// Per-frame solve settings.
    pub solve: SolveOptions,
}

impl Default for WarpConfig {
    fn default() -> Self {
        Self {
            width: 512.0,
            height: 512.0,
            graph: GraphOptions::default(),
            mesh_resolution: DEFAULT_MESH_RESOLUTION,
            skin_neighbors: DEFAULT_SKIN_NEIGHBORS,
            material: "balanced".into(),
            iterations_from_material: true,
            seam: SeamOptions::default(),
            system: SystemOptions::default(),
            solve: SolveOptions::default(),
        }
    }
}

impl WarpConfig {
    /// Default config for an image of the given size.
    pub fn for_image(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Parses a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> WarpResult<Self> {
        toml::from_str(source).map_err(|e| WarpError::Serialization(e.to_string()))
    }

    /// Reads and parses a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> WarpResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Serializes to TOML.
    pub fn to_toml_string(&self) -> WarpResult<String> {
        toml::to_string(self).map_err(|e| WarpError::Serialization(e.to_string()))
    }

    /// Checks every section. The material name is resolved by the session.
    pub fn validate(&self) -> WarpResult<()> {
        if !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0)
        {
            return Err(WarpError::InvalidConfig(format!(
                "image size must be positive, got {}×{}",
                self.width, self.height
            )));
        }
        self.graph.validate()?;
        if !(self.mesh_resolution.is_finite() && self.mesh_resolution > 0.0) {
            return Err(WarpError::InvalidConfig(format!(
                "mesh_resolution must be positive, got {}",
                self.mesh_resolution
            )));
        }
        if self.skin_neighbors == 0 {
            return Err(WarpError::InvalidConfig("skin_neighbors must be at least 1".into()));
        }
        if self.material.trim().is_empty() {
            return Err(WarpError::InvalidConfig("material name is empty".into()));
        }
        if !(self.seam.kappa.is_finite() && self.seam.kappa >= 0.0) || self.seam.samples == 0 {
            return Err(WarpError::InvalidConfig(format!(
                "seam options out of range: kappa {}, samples {}",
                self.seam.kappa, self.seam.samples
            )));
        }
        let damping = self.system.boundary_damping;
        if !(damping.is_finite() && damping >= 0.0) {
            return Err(WarpError::InvalidConfig(format!(
                "boundary_damping must be non-negative, got {damping}"
            )));
        }
        self.solve.validate()
    }
}
