//! Matrix decompositions for the ARAP local step.
//!
//! The local step fits, for every control node, the rotation that best
//! explains how its neighbourhood moved. That rotation is the orthogonal
//! factor of the polar decomposition `M = R·S` of a 2×2 covariance matrix.

use glam::{DMat2, DVec2};
use mallea_types::constants::EIGEN_EPSILON;

/// Outer product `a·bᵀ` as a 2×2 matrix.
#[inline]
pub fn outer(a: DVec2, b: DVec2) -> DMat2 {
    DMat2::from_cols(a * b.x, a * b.y)
}

/// Counter-clockwise perpendicular of `v`.
#[inline]
pub fn perp(v: DVec2) -> DVec2 {
    DVec2::new(-v.y, v.x)
}

/// Angle (radians) of a rotation matrix.
#[inline]
pub fn rotation_angle(r: DMat2) -> f64 {
    r.x_axis.y.atan2(r.x_axis.x)
}

/// Eigen-decomposition of a symmetric 2×2 matrix `[a b; b d]`.
///
/// Returns `(λ0, λ1, v0)` with `λ0 ≥ λ1`; the second eigenvector is
/// `perp(v0)`, so `[v0, perp(v0)]` always has determinant +1.
pub fn symmetric_eigen(a: f64, b: f64, d: f64) -> (f64, f64, DVec2) {
    // λ = (a+d)/2 ± sqrt(((a-d)/2)² + b²)
    let half_trace = 0.5 * (a + d);
    let half_diff = 0.5 * (a - d);
    let disc = (half_diff * half_diff + b * b).sqrt();

    let lambda0 = half_trace + disc;
    let lambda1 = half_trace - disc;

    let v0 = if b.abs() > f64::EPSILON * lambda0.abs().max(1.0) {
        DVec2::new(lambda0 - d, b).normalize()
    } else if a >= d {
        DVec2::X
    } else {
        DVec2::Y
    };

    (lambda0, lambda1, v0)
}

/// Returns the rotation `R` minimizing `‖R − M‖_F`.
///
/// 1. Eigendecompose `C = MᵀM = V·D·Vᵀ` in closed form
/// 2. Floor the eigenvalues at [`EIGEN_EPSILON`] and form `V·D^{-1/2}·Vᵀ`
/// 3. `R = M·V·D^{-1/2}·Vᵀ`
/// 4. If `det R < 0`, flip the minor eigen-axis and recompute
///
/// Rank-deficient inputs get their missing axis completed orthogonally,
/// and a zero matrix maps to the identity, so the result is always a
/// proper rotation.
pub fn polar_decomposition(m: DMat2) -> DMat2 {
    let c = m.transpose() * m;
    let (lambda0, lambda1, v0) = symmetric_eigen(c.x_axis.x, c.y_axis.x, c.y_axis.y);

    if lambda0 <= EIGEN_EPSILON {
        return DMat2::IDENTITY;
    }

    let v1 = perp(v0);
    let p0 = outer(v0, v0);
    let p1 = outer(v1, v1);

    if lambda1 <= EIGEN_EPSILON * lambda0 {
        // Only one axis carries information; complete it.
        let u0 = (m * v0).normalize_or_zero();
        if u0 == DVec2::ZERO {
            return DMat2::IDENTITY;
        }
        return outer(u0, v0) + outer(perp(u0), v1);
    }

    let inv_s0 = 1.0 / lambda0.max(EIGEN_EPSILON).sqrt();
    let inv_s1 = 1.0 / lambda1.max(EIGEN_EPSILON).sqrt();

    let r = m * (p0 * inv_s0 + p1 * inv_s1);
    if r.determinant() >= 0.0 {
        return r;
    }

    // Reflection: flip the minor axis.
    m * (p0 * inv_s0 - p1 * inv_s1)
}
