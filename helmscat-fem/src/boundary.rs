//! Homogeneous Dirichlet elimination
//!
//! The outer truncation circle carries u = 0. Elimination works on the
//! assembly triplets before CSR conversion: constrained rows and columns are
//! dropped and replaced by a unit diagonal. Because the condition is
//! homogeneous, dropping columns requires no right-hand-side correction;
//! the load vector just has its constrained rows zeroed once.

use crate::mesh::TaggedMesh;
use ndarray::Array1;
use num_complex::Complex64;
use std::collections::HashSet;

/// Nodes constrained by the Dirichlet condition on facets with `tag`
pub fn dirichlet_nodes(mesh: &TaggedMesh, tag: u8) -> Vec<usize> {
    mesh.nodes_with_facet_tag(tag)
}

/// Eliminate constrained rows and columns from assembly triplets,
/// inserting a unit diagonal for each constrained node.
pub fn apply_homogeneous_dirichlet(
    triplets: &mut Vec<(usize, usize, Complex64)>,
    nodes: &[usize],
) {
    let constrained: HashSet<usize> = nodes.iter().copied().collect();

    triplets.retain(|(i, j, _)| !constrained.contains(i) && !constrained.contains(j));
    for &node in nodes {
        triplets.push((node, node, Complex64::new(1.0, 0.0)));
    }
}

/// Zero the constrained entries of a load vector
pub fn zero_dirichlet_rows(rhs: &mut Array1<Complex64>, nodes: &[usize]) {
    for &node in nodes {
        rhs[node] = Complex64::new(0.0, 0.0);
    }
}
