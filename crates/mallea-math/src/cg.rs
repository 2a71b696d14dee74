//! Conjugate gradient for symmetric positive (semi-)definite CSR systems.
//!
//! Both variants start from the caller's `x` (warm start), mutate it in
//! place, and stop on whichever comes first: the relative residual drops
//! below `tol`, the curvature `pᵀAp` vanishes, or `max_iters` is reached.
//! A truncated solve is a valid approximation, not an error.

use mallea_types::constants::{CG_CURVATURE_EPSILON, CG_RESIDUAL_EPSILON};

use crate::sparse::CsrMatrix;

/// Outcome of one CG solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CgResult {
    /// Iterations performed (0 if `x` already satisfied the system).
    pub iterations: usize,
    /// Final residual norm relative to the initial residual norm.
    pub relative_residual: f64,
    /// Whether the tolerance was reached.
    pub converged: bool,
}

impl CgResult {
    fn immediate() -> Self {
        Self {
            iterations: 0,
            relative_residual: 0.0,
            converged: true,
        }
    }
}

#[inline]
fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Scratch buffers for repeated CG solves of the same dimension.
///
/// Buffers are reallocated only when the dimension changes.
#[derive(Debug, Clone, Default)]
pub struct CgWorkspace {
    r: Vec<f64>,
    p: Vec<f64>,
    ap: Vec<f64>,
    z: Vec<f64>,
}

impl CgWorkspace {
    /// Creates a workspace for systems of dimension `n`.
    pub fn new(n: usize) -> Self {
        Self {
            r: vec![0.0; n],
            p: vec![0.0; n],
            ap: vec![0.0; n],
            z: vec![0.0; n],
        }
    }

    fn ensure(&mut self, n: usize) {
        if self.r.len() != n {
            *self = Self::new(n);
        }
    }

    /// Plain conjugate gradient.
    pub fn solve(
        &mut self,
        a: &CsrMatrix,
        b: &[f64],
        x: &mut [f64],
        max_iters: usize,
        tol: f64,
    ) -> CgResult {
        let n = b.len();
        self.ensure(n);
        let Self { r, p, ap, .. } = self;

        // r = b - A x
        a.mul_vec_into(x, ap);
        for i in 0..n {
            r[i] = b[i] - ap[i];
        }
        p.copy_from_slice(r);

        let rr0 = dot(r, r);
        if rr0 < CG_RESIDUAL_EPSILON {
            return CgResult::immediate();
        }
        let threshold = tol * tol * rr0;
        let mut rr = rr0;

        for iter in 0..max_iters {
            a.mul_vec_into(p, ap);
            let curvature = dot(p, ap);
            if curvature.abs() < CG_CURVATURE_EPSILON {
                return finish(iter, rr, rr0, threshold);
            }

            let alpha = rr / curvature;
            for i in 0..n {
                x[i] += alpha * p[i];
                r[i] -= alpha * ap[i];
            }

            let rr_next = dot(r, r);
            if rr_next <= threshold {
                return finish(iter + 1, rr_next, rr0, threshold);
            }

            let beta = rr_next / rr;
            for i in 0..n {
                p[i] = r[i] + beta * p[i];
            }
            rr = rr_next;
        }

        finish(max_iters, rr, rr0, threshold)
    }

    /// Jacobi-preconditioned conjugate gradient (`M⁻¹ = diag(A)⁻¹`).
    ///
    /// Rows with a non-positive diagonal are left unpreconditioned.
    pub fn solve_preconditioned(
        &mut self,
        a: &CsrMatrix,
        b: &[f64],
        x: &mut [f64],
        max_iters: usize,
        tol: f64,
    ) -> CgResult {
        let n = b.len();
        self.ensure(n);
        let inv_diag: Vec<f64> = a
            .diagonal()
            .into_iter()
            .map(|d| if d > 0.0 { 1.0 / d } else { 1.0 })
            .collect();
        let Self { r, p, ap, z } = self;

        a.mul_vec_into(x, ap);
        for i in 0..n {
            r[i] = b[i] - ap[i];
            z[i] = inv_diag[i] * r[i];
        }
        p.copy_from_slice(z);

        let rr0 = dot(r, r);
        if rr0 < CG_RESIDUAL_EPSILON {
            return CgResult::immediate();
        }
        let threshold = tol * tol * rr0;
        let mut rz = dot(r, z);
        let mut rr = rr0;

        for iter in 0..max_iters {
            a.mul_vec_into(p, ap);
            let curvature = dot(p, ap);
            if curvature.abs() < CG_CURVATURE_EPSILON {
                return finish(iter, rr, rr0, threshold);
            }

            let alpha = rz / curvature;
            for i in 0..n {
                x[i] += alpha * p[i];
                r[i] -= alpha * ap[i];
            }

            rr = dot(r, r);
            if rr <= threshold {
                return finish(iter + 1, rr, rr0, threshold);
            }

            for i in 0..n {
                z[i] = inv_diag[i] * r[i];
            }
            let rz_next = dot(r, z);
            let beta = rz_next / rz;
            for i in 0..n {
                p[i] = z[i] + beta * p[i];
            }
            rz = rz_next;
        }

        finish(max_iters, rr, rr0, threshold)
    }
}

fn finish(iterations: usize, rr: f64, rr0: f64, threshold: f64) -> CgResult {
    CgResult {
        iterations,
        relative_residual: (rr / rr0).sqrt(),
        converged: rr <= threshold,
    }
}

/// Solves `A·x = b` with plain CG, warm-started from `x`.
pub fn cg_solve(a: &CsrMatrix, b: &[f64], x: &mut [f64], max_iters: usize, tol: f64) -> CgResult {
    CgWorkspace::new(b.len()).solve(a, b, x, max_iters, tol)
}

/// Solves `A·x = b` with Jacobi-preconditioned CG, warm-started from `x`.
pub fn cg_solve_preconditioned(
    a: &CsrMatrix,
    b: &[f64],
    x: &mut [f64],
    max_iters: usize,
    tol: f64,
) -> CgResult {
    CgWorkspace::new(b.len()).solve_preconditioned(a, b, x, max_iters, tol)
}
