//! # mallea-solver
//!
//! As-Rigid-As-Possible solve over the control graph, and the editing
//! session that ties graph, pins, render mesh and telemetry together.
//!
//! ## Key Types
//!
//! - [`ArapState`]: system matrix, per-channel solution/RHS buffers, CG
//!   workspace and optional direct factorization
//! - [`SolveOptions`] / [`WarpConfig`]: per-frame solve settings and the
//!   TOML-loadable session configuration
//! - [`WarpSession`]: pins in, deformed node positions and mesh out
//!
//! ## Frame
//!
//! ```text
//! apply_pins → update_system_matrix → solve (local step → global step) × N
//!            → deform_mesh
//! ```

pub mod arap;
pub mod assembly;
pub mod config;
pub mod session;
pub mod state;

pub use arap::{arap_iteration, local_step, solve, IterationReport, SolveReport};
pub use config::{LinearSolverKind, SolveOptions, WarpConfig};
pub use session::WarpSession;
pub use state::ArapState;
