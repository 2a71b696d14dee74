//! # mallea-mesh
//!
//! Dense render mesh driven by the coarse control graph.
//!
//! ## Key Types
//!
//! - [`RenderMesh`]: vertex grid in Structure-of-Arrays layout with rest
//!   positions, UVs, a fixed index buffer, the deformed buffer and skin data.
//! - [`generate_render_mesh`]: uniform grid at a fixed pixel spacing.
//! - [`compute_skin_weights`] / [`deform_mesh`] / [`deform_point`]: linear
//!   blend of control-node rigid maps.

pub mod generators;
pub mod mesh;
pub mod skinning;

pub use generators::generate_render_mesh;
pub use mesh::RenderMesh;
pub use skinning::{compute_skin_weights, deform_mesh, deform_point};
