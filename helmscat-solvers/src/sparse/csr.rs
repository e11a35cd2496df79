//! Compressed Sparse Row (CSR) matrix format
//!
//! CSR stores:
//! - `values`: non-zero entries in row-major order
//! - `col_indices`: column index for each value
//! - `row_ptrs`: index into values/col_indices where each row starts
//!
//! Finite-element assembly produces unsorted triplets with duplicates
//! (one contribution per element per local dof pair); `from_triplets`
//! sorts and sums them into canonical CSR.

use crate::traits::ComplexField;
use ndarray::{Array1, Array2};

/// Compressed Sparse Row (CSR) matrix
///
/// O(nnz) storage; matrix-vector products are O(nnz).
#[derive(Debug, Clone)]
pub struct CsrMatrix<T: ComplexField> {
    /// Number of rows
    pub num_rows: usize,
    /// Number of columns
    pub num_cols: usize,
    /// Non-zero values in row-major order
    pub values: Vec<T>,
    /// Column indices for each value
    pub col_indices: Vec<usize>,
    /// Row pointers; `row_ptrs[num_rows]` equals nnz
    pub row_ptrs: Vec<usize>,
}

impl<T: ComplexField> CsrMatrix<T> {
    /// Create an empty CSR matrix
    pub fn new(num_rows: usize, num_cols: usize) -> Self {
        Self {
            num_rows,
            num_cols,
            values: Vec::new(),
            col_indices: Vec::new(),
            row_ptrs: vec![0; num_rows + 1],
        }
    }

    /// Build a CSR matrix from COO triplets `(row, col, value)`.
    ///
    /// Duplicate entries are summed.
    pub fn from_triplets(
        num_rows: usize,
        num_cols: usize,
        mut triplets: Vec<(usize, usize, T)>,
    ) -> Self {
        if triplets.is_empty() {
            return Self::new(num_rows, num_cols);
        }

        triplets.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut values: Vec<T> = Vec::with_capacity(triplets.len());
        let mut col_indices = Vec::with_capacity(triplets.len());
        let mut row_ptrs = vec![0usize; num_rows + 1];

        let mut prev_row = usize::MAX;
        let mut prev_col = usize::MAX;

        for (row, col, val) in triplets {
            if row == prev_row && col == prev_col {
                if let Some(last) = values.last_mut() {
                    *last += val;
                }
            } else {
                values.push(val);
                col_indices.push(col);

                if row != prev_row {
                    let start = if prev_row == usize::MAX { 0 } else { prev_row + 1 };
                    for ptr in row_ptrs.iter_mut().take(row + 1).skip(start) {
                        *ptr = values.len() - 1;
                    }
                }

                prev_row = row;
                prev_col = col;
            }
        }

        let tail_start = if prev_row == usize::MAX { 0 } else { prev_row + 1 };
        for ptr in row_ptrs.iter_mut().take(num_rows + 1).skip(tail_start) {
            *ptr = values.len();
        }

        Self {
            num_rows,
            num_cols,
            values,
            col_indices,
            row_ptrs,
        }
    }

    /// Number of stored non-zero entries
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Fraction of entries that are stored
    pub fn sparsity(&self) -> f64 {
        let total = self.num_rows * self.num_cols;
        if total == 0 {
            0.0
        } else {
            self.nnz() as f64 / total as f64
        }
    }

    /// Matrix-vector product y = A x
    pub fn matvec(&self, x: &Array1<T>) -> Array1<T> {
        assert_eq!(x.len(), self.num_cols, "matvec dimension mismatch");
        let mut y = Array1::from_elem(self.num_rows, T::zero());
        for row in 0..self.num_rows {
            let mut acc = T::zero();
            for k in self.row_ptrs[row]..self.row_ptrs[row + 1] {
                acc += self.values[k] * x[self.col_indices[k]];
            }
            y[row] = acc;
        }
        y
    }

    /// Expand into a dense matrix (for the direct solver)
    pub fn to_dense(&self) -> Array2<T> {
        let mut dense = Array2::from_elem((self.num_rows, self.num_cols), T::zero());
        for row in 0..self.num_rows {
            for k in self.row_ptrs[row]..self.row_ptrs[row + 1] {
                dense[[row, self.col_indices[k]]] += self.values[k];
            }
        }
        dense
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use num_complex::Complex64;

    #[test]
    fn test_from_triplets_sums_duplicates() {
        let triplets = vec![(0, 0, 1.0_f64), (0, 0, 2.0), (1, 1, 4.0), (0, 1, -1.0)];
        let csr = CsrMatrix::from_triplets(2, 2, triplets);

        assert_eq!(csr.nnz(), 3);
        let dense = csr.to_dense();
        assert_relative_eq!(dense[[0, 0]], 3.0);
        assert_relative_eq!(dense[[0, 1]], -1.0);
        assert_relative_eq!(dense[[1, 1]], 4.0);
        assert_relative_eq!(dense[[1, 0]], 0.0);
    }

    #[test]
    fn test_from_triplets_skips_empty_rows() {
        let triplets = vec![(2, 0, 1.0_f64)];
        let csr = CsrMatrix::from_triplets(4, 3, triplets);
        assert_eq!(csr.row_ptrs, vec![0, 0, 0, 1, 1]);
    }

    #[test]
    fn test_matvec_complex() {
        let triplets = vec![
            (0, 0, Complex64::new(1.0, 1.0)),
            (0, 1, Complex64::new(0.0, -1.0)),
            (1, 1, Complex64::new(2.0, 0.0)),
        ];
        let csr = CsrMatrix::from_triplets(2, 2, triplets);
        let x = Array1::from_vec(vec![Complex64::new(1.0, 0.0), Complex64::new(0.0, 1.0)]);
        let y = csr.matvec(&x);

        // Row 0: (1+i)*1 + (-i)*(i) = 1 + i + 1 = 2 + i
        assert_relative_eq!(y[0].re, 2.0, epsilon = 1e-14);
        assert_relative_eq!(y[0].im, 1.0, epsilon = 1e-14);
        // Row 1: 2*i
        assert_relative_eq!(y[1].re, 0.0, epsilon = 1e-14);
        assert_relative_eq!(y[1].im, 2.0, epsilon = 1e-14);
    }

    #[test]
    fn test_sparsity() {
        let csr = CsrMatrix::from_triplets(10, 10, vec![(0, 0, 1.0_f64)]);
        assert_relative_eq!(csr.sparsity(), 0.01);
    }
}
