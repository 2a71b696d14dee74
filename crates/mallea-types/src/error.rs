//! Error types for the Mallea warp engine.
//!
//! All crates return `WarpResult<T>` from fallible operations. Numeric
//! degeneracies (zero-length edges, singular covariance, vanishing CG
//! curvature) are clamped in place and never surface here.

use thiserror::Error;

/// Unified error type for the warp engine.
#[derive(Debug, Error)]
pub enum WarpError {
    /// Control graph parameters or structure are invalid.
    #[error("Invalid control graph: {0}")]
    InvalidGraph(String),

    /// Render mesh data is malformed or inconsistent.
    #[error("Invalid render mesh: {0}")]
    InvalidMesh(String),

    /// A pin has out-of-range parameters.
    #[error("Invalid pin: {0}")]
    InvalidPin(String),

    /// Material preset is unknown or has out-of-range knobs.
    #[error("Invalid material: {0}")]
    InvalidMaterial(String),

    /// Configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An operation ran before the state it depends on was built.
    #[error("Not initialized: {0}")]
    NotInitialized(String),

    /// Buffer or matrix sizes disagree.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        expected: usize,
        actual: usize,
    },

    /// Direct sparse factorization failed (matrix not positive definite).
    #[error("Factorization failed: {0}")]
    Factorization(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias for `Result<T, WarpError>`.
pub type WarpResult<T> = Result<T, WarpError>;
