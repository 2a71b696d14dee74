//! # mallea-types
//!
//! Shared types, identifiers, error types, and numeric constants
//! for the Mallea image-warp engine.
//!
//! This crate has zero domain logic: it defines the vocabulary
//! that all other Mallea crates share.

pub mod constants;
pub mod error;
pub mod ids;
pub mod scalar;

pub use error::{WarpError, WarpResult};
pub use ids::{NodeId, PinId, PinIdAllocator, VertexId};
pub use scalar::Scalar;
