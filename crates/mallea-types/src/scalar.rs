//! Scalar type alias for the warp engine.
//!
//! The solver runs on the CPU inside the host's frame loop, so it works in
//! `f64` throughout. Render buffers are narrowed to `f32` only at upload time.

/// The floating-point type used by the graph, solver and skinning layers.
pub type Scalar = f64;
