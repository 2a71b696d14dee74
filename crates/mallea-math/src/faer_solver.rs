//! Sparse Cholesky solver backed by `faer`.
//!
//! Implements the [`SparseSolver`] trait using faer's supernodal LLᵀ
//! factorization. Used for the direct global step and as a reference
//! solution when checking the iterative solvers.
//!
//! ## Workflow
//! 1. `factorize(matrix)`: converts CSR→CSC, computes symbolic + numeric LLᵀ
//! 2. `solve(rhs, solution)`: forward/backward substitution (cached factorization)
//! 3. Repeat `solve()` with different RHS until the matrix is rebuilt

use faer::Side;
use faer::linalg::solvers::Solve;
use faer::sparse::SparseColMat;
use faer::sparse::Triplet;
use faer::sparse::linalg::solvers::{Llt, SymbolicLlt};

use mallea_types::{WarpError, WarpResult};

use crate::sparse::{CsrMatrix, SparseSolver};

/// Sparse Cholesky (LLᵀ) solver using `faer`.
///
/// The warp system matrix only changes when pins or stiffness change, so
/// one factorization serves every frame in between.
pub struct FaerSolver {
    /// Cached LLᵀ factorization.
    factorization: Option<Llt<usize, f64>>,
    /// Matrix dimension (N×N).
    dimension: usize,
}

impl FaerSolver {
    /// Creates a new solver (unfactorized).
    pub fn new() -> Self {
        Self {
            factorization: None,
            dimension: 0,
        }
    }

    /// Convert our CSR matrix to faer's CSC matrix.
    fn csr_to_csc(matrix: &CsrMatrix) -> WarpResult<SparseColMat<usize, f64>> {
        let mut triplets: Vec<Triplet<usize, usize, f64>> = Vec::with_capacity(matrix.nnz());
        for row in 0..matrix.rows {
            for idx in matrix.row_ptr[row]..matrix.row_ptr[row + 1] {
                triplets.push(Triplet {
                    row,
                    col: matrix.col_idx[idx],
                    val: matrix.values[idx],
                });
            }
        }

        SparseColMat::try_new_from_triplets(matrix.rows, matrix.cols, &triplets).map_err(|e| {
            WarpError::Factorization(format!("failed to construct CSC matrix: {e:?}"))
        })
    }
}

impl Default for FaerSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FaerSolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaerSolver")
            .field("dimension", &self.dimension)
            .field("factorized", &self.factorization.is_some())
            .finish()
    }
}

impl SparseSolver for FaerSolver {
    fn factorize(&mut self, matrix: &CsrMatrix) -> WarpResult<()> {
        if matrix.rows != matrix.cols {
            return Err(WarpError::Factorization(format!(
                "matrix must be square, got {}×{}",
                matrix.rows, matrix.cols
            )));
        }
        if matrix.rows == 0 {
            return Err(WarpError::Factorization("cannot factorize empty matrix".into()));
        }

        self.factorization = None;
        self.dimension = matrix.rows;

        let csc = Self::csr_to_csc(matrix)?;

        // Symbolic analysis (ordering, fill-in prediction)
        let symbolic = SymbolicLlt::try_new(csc.symbolic().as_ref(), Side::Upper)
            .map_err(|e| WarpError::Factorization(format!("symbolic analysis failed: {e:?}")))?;

        // Numeric factorization; fails if the matrix is only semi-definite
        let llt = Llt::try_new_with_symbolic(symbolic, csc.as_ref(), Side::Upper)
            .map_err(|e| WarpError::Factorization(format!("cholesky failed: {e:?}")))?;

        self.factorization = Some(llt);
        Ok(())
    }

    fn solve(&self, rhs: &[f64], solution: &mut [f64]) -> WarpResult<()> {
        let llt = self
            .factorization
            .as_ref()
            .ok_or_else(|| WarpError::NotInitialized("solver not factorized".into()))?;

        if rhs.len() != self.dimension {
            return Err(WarpError::DimensionMismatch {
                expected: self.dimension,
                actual: rhs.len(),
            });
        }
        if solution.len() != self.dimension {
            return Err(WarpError::DimensionMismatch {
                expected: self.dimension,
                actual: solution.len(),
            });
        }

        let rhs_mat: faer::Mat<f64> = faer::Mat::from_fn(self.dimension, 1, |i, _| rhs[i]);

        // L Lᵀ x = b
        let sol = llt.solve(&rhs_mat);

        for (i, out) in solution.iter_mut().enumerate() {
            *out = sol[(i, 0)];
        }

        Ok(())
    }

    fn is_factorized(&self) -> bool {
        self.factorization.is_some()
    }
}
