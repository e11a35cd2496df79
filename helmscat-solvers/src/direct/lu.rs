//! LU decomposition with partial pivoting
//!
//! Pure-Rust factorization for the complex non-Hermitian systems produced by
//! the PML Helmholtz formulation. The factorization is computed once per
//! shape realization and reused if several right-hand sides are needed.

use crate::traits::ComplexField;
use ndarray::{Array1, Array2};
use num_traits::FromPrimitive;
use thiserror::Error;

/// Pivot magnitudes below this threshold are treated as singular.
const SINGULARITY_TOLERANCE: f64 = 1e-30;

/// Errors that can occur during LU factorization
#[derive(Error, Debug)]
pub enum LuError {
    #[error("matrix is singular or nearly singular")]
    SingularMatrix,
    #[error("matrix dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// LU factorization result
///
/// L is unit lower triangular and stored below the diagonal of `lu`;
/// U occupies the diagonal and above.
#[derive(Debug, Clone)]
pub struct LuFactorization<T: ComplexField> {
    /// Combined L and U factors
    pub lu: Array2<T>,
    /// Pivot row for each elimination step
    pub pivots: Vec<usize>,
    /// Matrix dimension
    pub n: usize,
}

impl<T: ComplexField> LuFactorization<T> {
    /// Solve Ax = b using the pre-computed factorization
    pub fn solve(&self, b: &Array1<T>) -> Result<Array1<T>, LuError> {
        if b.len() != self.n {
            return Err(LuError::DimensionMismatch {
                expected: self.n,
                got: b.len(),
            });
        }

        let mut x = b.clone();

        // Apply the recorded row swaps
        for i in 0..self.n {
            let pivot = self.pivots[i];
            if pivot != i {
                x.swap(i, pivot);
            }
        }

        // Forward substitution: Ly = Pb
        for i in 0..self.n {
            for j in 0..i {
                let l_ij = self.lu[[i, j]];
                x[i] = x[i] - l_ij * x[j];
            }
        }

        // Backward substitution: Ux = y
        for i in (0..self.n).rev() {
            for j in (i + 1)..self.n {
                let u_ij = self.lu[[i, j]];
                x[i] = x[i] - u_ij * x[j];
            }
            let u_ii = self.lu[[i, i]];
            if u_ii.norm() < T::Real::from_f64(SINGULARITY_TOLERANCE).unwrap() {
                return Err(LuError::SingularMatrix);
            }
            x[i] *= u_ii.inv();
        }

        Ok(x)
    }
}

/// Compute the LU factorization of a square matrix with partial pivoting
pub fn lu_factorize<T: ComplexField>(a: &Array2<T>) -> Result<LuFactorization<T>, LuError> {
    let n = a.nrows();
    if n != a.ncols() {
        return Err(LuError::DimensionMismatch {
            expected: n,
            got: a.ncols(),
        });
    }

    let mut lu = a.clone();
    let mut pivots: Vec<usize> = (0..n).collect();

    for k in 0..n {
        let mut max_val = lu[[k, k]].norm();
        let mut max_row = k;
        for i in (k + 1)..n {
            let val = lu[[i, k]].norm();
            if val > max_val {
                max_val = val;
                max_row = i;
            }
        }

        if max_val < T::Real::from_f64(SINGULARITY_TOLERANCE).unwrap() {
            return Err(LuError::SingularMatrix);
        }

        if max_row != k {
            for j in 0..n {
                let tmp = lu[[k, j]];
                lu[[k, j]] = lu[[max_row, j]];
                lu[[max_row, j]] = tmp;
            }
            pivots.swap(k, max_row);
        }

        let pivot = lu[[k, k]];
        for i in (k + 1)..n {
            let mult = lu[[i, k]] * pivot.inv();
            lu[[i, k]] = mult;
            for j in (k + 1)..n {
                let update = mult * lu[[k, j]];
                lu[[i, j]] -= update;
            }
        }
    }

    Ok(LuFactorization { lu, pivots, n })
}

/// Solve Ax = b by factorizing and substituting in one call
pub fn lu_solve<T: ComplexField>(a: &Array2<T>, b: &Array1<T>) -> Result<Array1<T>, LuError> {
    let factorization = lu_factorize(a)?;
    factorization.solve(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use num_complex::Complex64;

    #[test]
    fn test_lu_solve_real() {
        let a = array![[4.0_f64, 1.0], [1.0, 3.0]];
        let b = array![1.0_f64, 2.0];

        let x = lu_solve(&a, &b).expect("LU solve should succeed");

        let ax = a.dot(&x);
        for i in 0..2 {
            assert_relative_eq!(ax[i], b[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_lu_solve_complex_nonhermitian() {
        // Complex symmetric (not Hermitian), like the PML system
        let a = array![
            [Complex64::new(2.0, 1.0), Complex64::new(0.5, -0.3)],
            [Complex64::new(0.5, -0.3), Complex64::new(1.0, -2.0)],
        ];
        let b = array![Complex64::new(1.0, 1.0), Complex64::new(-1.0, 0.5)];

        let x = lu_solve(&a, &b).expect("LU solve should succeed");

        let ax = a.dot(&x);
        for i in 0..2 {
            assert_relative_eq!((ax[i] - b[i]).norm(), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_lu_singular_reported() {
        let a = array![[1.0_f64, 2.0], [2.0, 4.0]];
        let b = array![1.0_f64, 2.0];

        assert!(matches!(lu_solve(&a, &b), Err(LuError::SingularMatrix)));
    }

    #[test]
    fn test_lu_factorize_multiple_rhs() {
        let a = array![[4.0_f64, 1.0, 0.0], [1.0, 3.0, 1.0], [0.0, 1.0, 2.0]];
        let factorization = lu_factorize(&a).expect("factorization should succeed");

        for b in [array![1.0_f64, 2.0, 3.0], array![4.0_f64, 5.0, 6.0]] {
            let x = factorization.solve(&b).expect("solve should succeed");
            let ax = a.dot(&x);
            for i in 0..3 {
                assert_relative_eq!(ax[i], b[i], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_lu_dimension_mismatch() {
        let a = array![[1.0_f64, 0.0], [0.0, 1.0]];
        let b = array![1.0_f64, 2.0, 3.0];
        assert!(matches!(
            lu_solve(&a, &b),
            Err(LuError::DimensionMismatch { .. })
        ));
    }
}
