//! Direct solve of the assembled scattering system
//!
//! The PML system is complex non-Hermitian and is re-factorized for every
//! shape realization, so the solve path is a dense LU factorization of the
//! sparse matrix. This is the right trade-off for the mesh sizes the
//! observation operator runs at; it is not suitable for very fine meshes.

use helmscat_solvers::{CsrMatrix, LuError, lu_solve};
use ndarray::Array1;
use num_complex::Complex64;
use std::time::Instant;
use thiserror::Error;

/// Degrees of freedom beyond which the dense factorization gets expensive
const DENSE_WARN_DOFS: usize = 20_000;

/// Solver errors
#[derive(Debug, Error)]
pub enum SolveError {
    #[error("direct solver failed: singular matrix")]
    SingularMatrix,
    #[error("matrix dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Solution of the linear system
#[derive(Debug, Clone)]
pub struct Solution {
    /// Nodal solution values
    pub values: Array1<Complex64>,
    /// Mean residual norm |Ax - b| / n
    pub residual: f64,
}

/// Solve A x = b by direct factorization
pub fn solve_direct(
    matrix: &CsrMatrix<Complex64>,
    rhs: &Array1<Complex64>,
) -> Result<Solution, SolveError> {
    if matrix.num_rows != rhs.len() {
        return Err(SolveError::DimensionMismatch {
            expected: matrix.num_rows,
            actual: rhs.len(),
        });
    }
    if matrix.num_rows > DENSE_WARN_DOFS {
        log::warn!(
            "dense LU factorization of {} dofs; consider a coarser mesh",
            matrix.num_rows
        );
    }

    let start = Instant::now();
    let dense = matrix.to_dense();
    let values = lu_solve(&dense, rhs).map_err(|err| match err {
        LuError::SingularMatrix => SolveError::SingularMatrix,
        LuError::DimensionMismatch { expected, got } => SolveError::DimensionMismatch {
            expected,
            actual: got,
        },
    })?;

    let residual_vec = matrix.matvec(&values);
    let residual: f64 = residual_vec
        .iter()
        .zip(rhs.iter())
        .map(|(r, b)| (r - b).norm())
        .sum::<f64>()
        / rhs.len() as f64;

    log::info!(
        "direct solve: {} dofs, {} nnz, sparsity {:.4}%, residual {:.2e}, {:.1}ms",
        matrix.num_rows,
        matrix.nnz(),
        matrix.sparsity() * 100.0,
        residual,
        start.elapsed().as_secs_f64() * 1000.0
    );

    Ok(Solution { values, residual })
}
