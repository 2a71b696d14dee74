//! # mallea-graph
//!
//! The coarse control graph the warp solver runs on.
//!
//! ## Key Types
//!
//! - [`ControlGraph`]: arena of [`ControlNode`]s with index-based adjacency
//! - [`Pin`] / [`PinKind`]: Anchor, Pose and Rail constraints
//! - [`ScalarField`]: per-pixel boundary or stiffness data
//!
//! ## Pipeline
//!
//! ```text
//! ControlGraph::new → apply_seam_barriers / apply_stiffness_field
//!                   → apply_pins → build_system_matrix
//! ```

pub mod field;
pub mod graph;
pub mod node;
pub mod pins;
pub mod seams;
pub mod stiffness;
pub mod system;

pub use field::ScalarField;
pub use graph::{create_control_graph, ControlGraph, GraphOptions};
pub use node::{ControlNode, GraphEdge};
pub use pins::{apply_pins, Pin, PinKind, PinStats};
pub use seams::{apply_seam_barriers, clear_seam_barriers, SeamOptions};
pub use stiffness::{apply_stiffness_field, set_uniform_stiffness};
pub use system::{build_system_matrix, constraint_term, SystemOptions};
