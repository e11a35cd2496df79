//! Linear-algebra support for the helmscat scattering solver
//!
//! This crate provides the small set of numerical-linear-algebra building
//! blocks the forward operator needs:
//!
//! - **Scalar abstraction**: [`ComplexField`] over `Complex64` and `f64`
//! - **Sparse matrices**: CSR format built from assembly triplets
//! - **Direct solver**: LU factorization with partial pivoting
//!
//! The Helmholtz system produced by the PML formulation is complex symmetric
//! but not Hermitian, so everything here works over a general complex field
//! and no solver assumes (conjugate) symmetry.

pub mod direct;
pub mod sparse;
pub mod traits;

pub use direct::{LuError, LuFactorization, lu_factorize, lu_solve};
pub use sparse::CsrMatrix;
pub use traits::ComplexField;
