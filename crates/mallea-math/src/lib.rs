//! # mallea-math
//!
//! Linear algebra primitives for the Mallea warp engine.
//!
//! Provides:
//! - Re-exports of `glam` double-precision types (`DVec2`, `DMat2`)
//! - Closed-form 2×2 polar decomposition (nearest rotation)
//! - Point/segment/polyline distance queries
//! - Sparse matrix representation (CSR), conjugate gradient, and a
//!   direct Cholesky backend behind the [`sparse::SparseSolver`] trait

pub mod cg;
pub mod decomposition;
pub mod faer_solver;
pub mod geometry;
pub mod sparse;

// Re-export glam types as the canonical math types for Mallea.
pub use glam::{DMat2, DVec2};
