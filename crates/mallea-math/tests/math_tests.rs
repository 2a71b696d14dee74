//! Integration tests for mallea-math.

use mallea_math::cg::{cg_solve, cg_solve_preconditioned, CgWorkspace};
use mallea_math::decomposition::{outer, polar_decomposition, rotation_angle, symmetric_eigen};
use mallea_math::faer_solver::FaerSolver;
use mallea_math::geometry::{closest_point_on_polyline, closest_point_on_segment};
use mallea_math::sparse::{CsrMatrix, SparseSolver};
use mallea_math::{DMat2, DVec2};

fn assert_mat_close(a: DMat2, b: DMat2, tol: f64) {
    let d = a - b;
    let err = d.x_axis.length() + d.y_axis.length();
    assert!(err < tol, "matrices differ: {a:?} vs {b:?}");
}

fn assert_rotation(r: DMat2) {
    assert!((r.determinant() - 1.0).abs() < 1e-9, "det = {}", r.determinant());
    assert_mat_close(r.transpose() * r, DMat2::IDENTITY, 1e-9);
}

// ─── Polar Decomposition Tests ────────────────────────────────

#[test]
fn polar_identity() {
    assert_mat_close(polar_decomposition(DMat2::IDENTITY), DMat2::IDENTITY, 1e-12);
}

#[test]
fn polar_returns_pure_rotations_unchanged() {
    for k in 0..24 {
        let angle = -3.0 + 0.25 * k as f64;
        let r = DMat2::from_angle(angle);
        assert_mat_close(polar_decomposition(r), r, 1e-9);
    }
}

#[test]
fn polar_strips_uniform_scale() {
    let r = DMat2::from_angle(0.7);
    let m = r * 3.5;
    assert_mat_close(polar_decomposition(m), r, 1e-9);
}

#[test]
fn polar_strips_anisotropic_stretch() {
    let r = DMat2::from_angle(-1.2);
    let stretch = DMat2::from_cols(DVec2::new(2.0, 0.3), DVec2::new(0.3, 0.5));
    let result = polar_decomposition(r * stretch);
    assert_mat_close(result, r, 1e-9);
}

#[test]
fn polar_reflection_yields_proper_rotation() {
    let inputs = [
        DMat2::from_cols(DVec2::new(1.0, 0.0), DVec2::new(0.0, -1.0)),
        DMat2::from_cols(DVec2::new(-2.0, 0.1), DVec2::new(0.4, 1.0)),
        DMat2::from_cols(DVec2::new(0.3, 0.9), DVec2::new(0.8, 0.1)),
    ];
    for m in inputs {
        assert!(m.determinant() < 0.0);
        let r = polar_decomposition(m);
        assert!(r.determinant() >= 0.0);
        assert_rotation(r);
    }
}

#[test]
fn polar_rank_deficient_is_still_rotation() {
    // Every column parallel: MᵀM has a zero eigenvalue.
    let m = outer(DVec2::new(0.0, 2.0), DVec2::new(1.0, 0.0));
    let r = polar_decomposition(m);
    assert_rotation(r);
    // The informative axis (x) must map onto the column direction (y).
    let mapped = r * DVec2::X;
    assert!((mapped - DVec2::Y).length() < 1e-9);
}

#[test]
fn polar_degenerate_does_not_panic() {
    let r = polar_decomposition(DMat2::ZERO);
    assert!(!r.x_axis.x.is_nan());
    assert_mat_close(r, DMat2::IDENTITY, 1e-12);
}

#[test]
fn rotation_angle_roundtrip() {
    let r = DMat2::from_angle(0.42);
    assert!((rotation_angle(r) - 0.42).abs() < 1e-12);
}

#[test]
fn symmetric_eigen_orders_eigenvalues() {
    let (l0, l1, v0) = symmetric_eigen(3.0, 1.0, 3.0);
    assert!((l0 - 4.0).abs() < 1e-12);
    assert!((l1 - 2.0).abs() < 1e-12);
    assert!((v0.x.abs() - v0.y.abs()).abs() < 1e-12);
}

// ─── Geometry Tests ───────────────────────────────────────────

#[test]
fn segment_projection_clamps() {
    let a = DVec2::new(0.0, 0.0);
    let b = DVec2::new(10.0, 0.0);
    assert_eq!(closest_point_on_segment(DVec2::new(4.0, 3.0), a, b), DVec2::new(4.0, 0.0));
    assert_eq!(closest_point_on_segment(DVec2::new(-5.0, 1.0), a, b), a);
    assert_eq!(closest_point_on_segment(DVec2::new(15.0, 1.0), a, b), b);
}

#[test]
fn polyline_closest_picks_nearest_segment() {
    let line = [DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0), DVec2::new(10.0, 10.0)];
    let (q, d) = closest_point_on_polyline(DVec2::new(12.0, 6.0), &line).unwrap();
    assert_eq!(q, DVec2::new(10.0, 6.0));
    assert!((d - 2.0).abs() < 1e-12);
}

#[test]
fn polyline_empty_is_none() {
    assert!(closest_point_on_polyline(DVec2::ZERO, &[]).is_none());
}

// ─── Sparse Matrix Tests ─────────────────────────────────────

fn dense_mul(dense: &[[f64; 4]; 4], x: &[f64]) -> Vec<f64> {
    dense
        .iter()
        .map(|row| row.iter().zip(x).map(|(a, b)| a * b).sum())
        .collect()
}

#[test]
fn empty_csr() {
    let m = CsrMatrix::new(3, 3);
    assert_eq!(m.nnz(), 0);
    assert_eq!(m.row_ptr.len(), 4);
    assert_eq!(m.mul_vec(&[1.0, 2.0, 3.0]), vec![0.0, 0.0, 0.0]);
}

#[test]
fn csr_from_triplets_unordered() {
    let triplets = vec![(0, 2, 3.0), (0, 0, 1.0), (0, 1, 2.0)];
    let m = CsrMatrix::from_triplets(1, 3, &triplets);
    assert_eq!(m.col_idx, vec![0, 1, 2]);
    assert_eq!(m.values, vec![1.0, 2.0, 3.0]);
}

#[test]
fn csr_sums_duplicates() {
    let triplets = vec![(1, 1, 1.5), (0, 0, 1.0), (1, 1, 2.5), (1, 0, -1.0)];
    let m = CsrMatrix::from_triplets(2, 2, &triplets);
    assert_eq!(m.nnz(), 3);
    assert_eq!(m.get(1, 1), 4.0);
    assert_eq!(m.get(0, 1), 0.0);
    assert_eq!(m.row_ptr, vec![0, 1, 3]);
}

#[test]
fn csr_mul_matches_dense_4x4() {
    let dense = [
        [4.0, -1.0, 0.0, -1.0],
        [-1.0, 4.0, -1.0, 0.0],
        [0.0, -1.0, 4.0, -1.0],
        [-1.0, 0.0, -1.0, 4.0],
    ];
    let mut triplets = Vec::new();
    for (i, row) in dense.iter().enumerate() {
        for (j, &v) in row.iter().enumerate() {
            if v != 0.0 {
                triplets.push((i, j, v));
            }
        }
    }
    let m = CsrMatrix::from_triplets(4, 4, &triplets);
    let x = [1.0, -2.0, 0.5, 3.0];

    let expected = dense_mul(&dense, &x);
    let got = m.mul_vec(&x);
    for i in 0..4 {
        assert!((got[i] - expected[i]).abs() < 1e-12);
    }
    assert!(m.is_symmetric(0.0));
    assert_eq!(m.diagonal(), vec![4.0; 4]);
}

#[test]
fn csr_detects_asymmetry() {
    let m = CsrMatrix::from_triplets(2, 2, &[(0, 0, 1.0), (0, 1, 2.0), (1, 1, 1.0)]);
    assert!(!m.is_symmetric(1e-12));
}

// ─── Conjugate Gradient Tests ────────────────────────────────

fn spd_3x3() -> CsrMatrix {
    //   [4 1 0]
    //   [1 3 1]
    //   [0 1 2]
    CsrMatrix::from_triplets(
        3,
        3,
        &[
            (0, 0, 4.0),
            (0, 1, 1.0),
            (1, 0, 1.0),
            (1, 1, 3.0),
            (1, 2, 1.0),
            (2, 1, 1.0),
            (2, 2, 2.0),
        ],
    )
}

#[test]
fn cg_converges_to_analytic_solution() {
    let a = spd_3x3();
    let expected = [1.0, -2.0, 3.0];
    let b = a.mul_vec(&expected);
    let mut x = [0.0; 3];

    let result = cg_solve(&a, &b, &mut x, 50, 1e-10);
    assert!(result.converged);
    assert!(result.iterations <= 3, "took {} iterations", result.iterations);
    for i in 0..3 {
        assert!((x[i] - expected[i]).abs() < 1e-8);
    }
}

#[test]
fn preconditioned_cg_converges_to_analytic_solution() {
    let a = spd_3x3();
    let expected = [0.5, 0.25, -1.0];
    let b = a.mul_vec(&expected);
    let mut x = [0.0; 3];

    let result = cg_solve_preconditioned(&a, &b, &mut x, 50, 1e-10);
    assert!(result.converged);
    assert!(result.iterations <= 3);
    for i in 0..3 {
        assert!((x[i] - expected[i]).abs() < 1e-8);
    }
}

#[test]
fn cg_warm_start_at_solution_returns_immediately() {
    let a = spd_3x3();
    let expected = [1.0, 1.0, 1.0];
    let b = a.mul_vec(&expected);
    let mut x = expected;

    let result = cg_solve(&a, &b, &mut x, 50, 1e-8);
    assert_eq!(result.iterations, 0);
    assert!(result.converged);
    assert_eq!(x, expected);
}

#[test]
fn cg_respects_iteration_cap() {
    let n = 50;
    let mut triplets = Vec::new();
    for i in 0..n {
        triplets.push((i, i, 2.01));
        if i > 0 {
            triplets.push((i, i - 1, -1.0));
        }
        if i < n - 1 {
            triplets.push((i, i + 1, -1.0));
        }
    }
    let a = CsrMatrix::from_triplets(n, n, &triplets);
    let b = vec![1.0; n];
    let mut x = vec![0.0; n];

    let result = cg_solve(&a, &b, &mut x, 2, 1e-12);
    assert_eq!(result.iterations, 2);
    assert!(!result.converged);
}

#[test]
fn cg_zero_curvature_stops_without_nan() {
    // Singular (all-zero) matrix with a non-zero RHS.
    let a = CsrMatrix::from_triplets(2, 2, &[(0, 0, 0.0), (1, 1, 0.0)]);
    let mut x = [0.0, 0.0];
    let result = cg_solve(&a, &[1.0, 1.0], &mut x, 10, 1e-8);
    assert_eq!(result.iterations, 0);
    assert!(!result.converged);
    assert!(x.iter().all(|v| v.is_finite()));
}

#[test]
fn cg_workspace_reuse_matches_fresh_solve() {
    let a = spd_3x3();
    let b = [1.0, 2.0, 3.0];
    let mut ws = CgWorkspace::new(3);

    let mut x1 = [0.0; 3];
    ws.solve(&a, &b, &mut x1, 50, 1e-12);
    let mut x2 = [0.0; 3];
    ws.solve(&a, &b, &mut x2, 50, 1e-12);
    let mut x3 = [0.0; 3];
    cg_solve(&a, &b, &mut x3, 50, 1e-12);

    for i in 0..3 {
        assert!((x1[i] - x2[i]).abs() < 1e-12);
        assert!((x1[i] - x3[i]).abs() < 1e-10);
    }
}

// ─── FaerSolver Tests ────────────────────────────────────────

#[test]
fn faer_matches_cg_on_laplacian() {
    // 1D graph Laplacian plus a diagonal shift for strict positive-definiteness.
    let n = 40;
    let mut triplets = Vec::new();
    for i in 0..n {
        triplets.push((i, i, 2.1));
        if i > 0 {
            triplets.push((i, i - 1, -1.0));
        }
        if i < n - 1 {
            triplets.push((i, i + 1, -1.0));
        }
    }
    let matrix = CsrMatrix::from_triplets(n, n, &triplets);

    let mut solver = FaerSolver::new();
    assert!(!solver.is_factorized());
    solver.factorize(&matrix).unwrap();
    assert!(solver.is_factorized());

    let rhs: Vec<f64> = (0..n).map(|i| (i as f64 * 0.3).sin()).collect();
    let mut direct = vec![0.0; n];
    solver.solve(&rhs, &mut direct).unwrap();

    let mut iterative = vec![0.0; n];
    cg_solve_preconditioned(&matrix, &rhs, &mut iterative, 200, 1e-12);

    for i in 0..n {
        assert!((direct[i] - iterative[i]).abs() < 1e-8, "mismatch at {i}");
    }
}

#[test]
fn faer_solve_before_factorize_fails() {
    let solver = FaerSolver::new();
    let mut sol = [0.0; 3];
    assert!(solver.solve(&[1.0; 3], &mut sol).is_err());
}

#[test]
fn faer_wrong_rhs_length_fails() {
    let matrix = CsrMatrix::from_triplets(2, 2, &[(0, 0, 1.0), (1, 1, 1.0)]);
    let mut solver = FaerSolver::new();
    solver.factorize(&matrix).unwrap();
    let mut sol = [0.0; 2];
    assert!(solver.solve(&[1.0; 3], &mut sol).is_err());
}

#[test]
fn faer_non_square_fails() {
    let matrix = CsrMatrix::from_triplets(2, 3, &[(0, 0, 1.0)]);
    let mut solver = FaerSolver::new();
    assert!(solver.factorize(&matrix).is_err());
}

#[test]
fn faer_empty_matrix_fails() {
    let matrix = CsrMatrix::new(0, 0);
    let mut solver = FaerSolver::new();
    assert!(solver.factorize(&matrix).is_err());
}
