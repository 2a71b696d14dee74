//! # mallea-material
//!
//! Named presets describing how an image region resists warping.
//!
//! A [`WarpMaterial`] is a handful of normalized knobs; the solver reads two
//! derived quantities from it: the base stiffness multiplier applied to
//! every graph coupling and the number of ARAP iterations per frame. The
//! [`MaterialDatabase`] holds the built-in presets and any registered at
//! runtime.

pub mod database;
pub mod properties;

pub use database::MaterialDatabase;
pub use properties::WarpMaterial;
