//! Triangular P1 finite elements on tagged disk meshes
//!
//! This crate is the finite-element collaborator of the helmscat forward
//! operator. It provides exactly the narrow surface the scattering core
//! consumes:
//!
//! - **Tagged meshes**: triangulated disks with per-cell material tags and
//!   per-edge facet tags (interface circle, outer Dirichlet circle)
//! - **Assembly**: bilinear forms with per-cell complex tensor gradient
//!   coefficients and complex scalar mass coefficients, interface flux and
//!   lifted-field linear forms
//! - **Boundary conditions**: homogeneous Dirichlet elimination
//! - **Solving**: direct sparse solve through `helmscat-solvers`
//! - **Postprocessing**: nodal interpolation and weighted scalar integrals
//!
//! Solution fields are continuous piecewise-linear (P1); coefficient fields
//! are piecewise-constant per cell.

pub mod assembly;
pub mod basis;
pub mod boundary;
pub mod mesh;
pub mod quadrature;
pub mod solver;

pub use assembly::{
    CellTensor, assemble_interface_flux, assemble_lifted_field, assemble_system,
    integrate_weighted, interpolate_nodal,
};
pub use boundary::{apply_homogeneous_dirichlet, dirichlet_nodes, zero_dirichlet_rows};
pub use mesh::{Cell, DiskMeshSpec, Facet, Point2, TaggedMesh, disk_mesh, tags};
pub use solver::{SolveError, Solution, solve_direct};
