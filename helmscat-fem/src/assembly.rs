//! Assembly of the scattering weak form
//!
//! The bilinear form assembled here is
//!
//! ```text
//! a(u, v) = ∫ (C ∇u) · ∇v dx − ∫ m u v dx
//! ```
//!
//! with a per-cell complex 2×2 gradient coefficient C (material constant ×
//! pulled-back tensor × PML tensor) and a per-cell complex scalar mass
//! coefficient m (wavenumber × pulled-back determinant × PML scale). C is in
//! general not symmetric, so trial and test indices are kept distinct.
//!
//! Linear forms cover the two incident-field contributions: a flux integral
//! over the tagged coupling circle and the lifted boundary-trace terms over
//! a tagged cell region.

use crate::basis::{ElementGeometry, p1_values};
use crate::mesh::TaggedMesh;
use crate::quadrature::{edge_rule, triangle_rule};
use ndarray::Array1;
use num_complex::Complex64;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Per-cell 2×2 gradient coefficient, row-major
pub type CellTensor = [[Complex64; 2]; 2];

/// Element contribution to the bilinear form, as triplets (test, trial, value)
fn element_system(
    mesh: &TaggedMesh,
    cell: usize,
    grad_coeff: &CellTensor,
    mass_coeff: Complex64,
) -> Vec<(usize, usize, Complex64)> {
    let geom = ElementGeometry::from_cell(mesh, cell);
    let g = geom.gradients;
    let nodes = mesh.cells[cell].nodes;

    let mut local = [[Complex64::new(0.0, 0.0); 3]; 3];

    // Gradient term: constant integrand, one-point exact
    for (i, gi) in g.iter().enumerate() {
        for (j, gj) in g.iter().enumerate() {
            // (C ∇N_j) · ∇N_i, test index i, trial index j
            let cg_x = grad_coeff[0][0] * gj[0] + grad_coeff[0][1] * gj[1];
            let cg_y = grad_coeff[1][0] * gj[0] + grad_coeff[1][1] * gj[1];
            local[i][j] += (cg_x * gi[0] + cg_y * gi[1]) * geom.area;
        }
    }

    // Mass term: P1 × P1 needs a degree-2 rule
    let scale = 2.0 * geom.area;
    for qp in triangle_rule(2) {
        let n = p1_values(qp.xi, qp.eta);
        let w = qp.weight * scale;
        for i in 0..3 {
            for j in 0..3 {
                local[i][j] -= mass_coeff * (n[i] * n[j] * w);
            }
        }
    }

    let mut triplets = Vec::with_capacity(9);
    for i in 0..3 {
        for j in 0..3 {
            triplets.push((nodes[i], nodes[j], local[i][j]));
        }
    }
    triplets
}

/// Assemble the bilinear form into COO triplets.
///
/// `grad_coeff` and `mass_coeff` hold one entry per cell.
pub fn assemble_system(
    mesh: &TaggedMesh,
    grad_coeff: &[CellTensor],
    mass_coeff: &[Complex64],
) -> Vec<(usize, usize, Complex64)> {
    assert_eq!(grad_coeff.len(), mesh.num_cells());
    assert_eq!(mass_coeff.len(), mesh.num_cells());

    #[cfg(feature = "parallel")]
    {
        let per_cell: Vec<Vec<(usize, usize, Complex64)>> = (0..mesh.num_cells())
            .into_par_iter()
            .map(|cell| element_system(mesh, cell, &grad_coeff[cell], mass_coeff[cell]))
            .collect();
        per_cell.into_iter().flatten().collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        let mut triplets = Vec::with_capacity(9 * mesh.num_cells());
        for cell in 0..mesh.num_cells() {
            triplets.extend(element_system(
                mesh,
                cell,
                &grad_coeff[cell],
                mass_coeff[cell],
            ));
        }
        triplets
    }
}

/// Assemble the flux linear form `∫_Γ α f v ds` over facets with `tag`.
///
/// `alpha` holds one material constant per cell; the value of the adjacent
/// inner-side cell is used on each facet, matching the one-sided restriction
/// of the continuous form.
pub fn assemble_interface_flux<F>(
    mesh: &TaggedMesh,
    tag: u8,
    alpha: &[f64],
    flux: F,
) -> Array1<Complex64>
where
    F: Fn(f64, f64) -> Complex64,
{
    let mut rhs = Array1::from_elem(mesh.num_nodes(), Complex64::new(0.0, 0.0));

    for facet in mesh.facets_with_tag(tag) {
        let [na, nb] = facet.nodes;
        let (a, b) = (mesh.nodes[na], mesh.nodes[nb]);
        let length = a.distance(&b);
        let alpha_inner = alpha[facet.cell];

        for (t, w) in edge_rule() {
            let shape_a = 0.5 * (1.0 - t);
            let shape_b = 0.5 * (1.0 + t);
            let x = shape_a * a.x + shape_b * b.x;
            let y = shape_a * a.y + shape_b * b.y;
            let value = flux(x, y) * (alpha_inner * w * 0.5 * length);
            rhs[na] += value * shape_a;
            rhs[nb] += value * shape_b;
        }
    }

    rhs
}

/// Assemble the lifted-field linear form over cells with `region_tag`:
///
/// ```text
/// b_i += Σ_j ( −α K_ij + κ² M_ij ) lift_j
/// ```
///
/// where K and M are the plain (unit-coefficient) element stiffness and mass
/// matrices and `lift` is a nodal field supported on the coupling circle.
pub fn assemble_lifted_field(
    mesh: &TaggedMesh,
    region_tag: u8,
    lift: &Array1<Complex64>,
    alpha: &[f64],
    kappa_sqrd: &[f64],
) -> Array1<Complex64> {
    assert_eq!(lift.len(), mesh.num_nodes());

    let mut rhs = Array1::from_elem(mesh.num_nodes(), Complex64::new(0.0, 0.0));

    for cell in 0..mesh.num_cells() {
        if mesh.cells[cell].tag != region_tag {
            continue;
        }
        let geom = ElementGeometry::from_cell(mesh, cell);
        let g = geom.gradients;
        let nodes = mesh.cells[cell].nodes;

        let lift_local = [lift[nodes[0]], lift[nodes[1]], lift[nodes[2]]];
        if lift_local.iter().all(|v| v.norm() == 0.0) {
            continue;
        }

        let mut stiffness = [[0.0_f64; 3]; 3];
        let mut mass = [[0.0_f64; 3]; 3];

        for (i, gi) in g.iter().enumerate() {
            for (j, gj) in g.iter().enumerate() {
                stiffness[i][j] = (gi[0] * gj[0] + gi[1] * gj[1]) * geom.area;
            }
        }
        let scale = 2.0 * geom.area;
        for qp in triangle_rule(2) {
            let n = p1_values(qp.xi, qp.eta);
            let w = qp.weight * scale;
            for i in 0..3 {
                for j in 0..3 {
                    mass[i][j] += n[i] * n[j] * w;
                }
            }
        }

        for i in 0..3 {
            let mut acc = Complex64::new(0.0, 0.0);
            for j in 0..3 {
                acc += lift_local[j]
                    * Complex64::new(
                        -alpha[cell] * stiffness[i][j] + kappa_sqrd[cell] * mass[i][j],
                        0.0,
                    );
            }
            rhs[nodes[i]] += acc;
        }
    }

    rhs
}

/// Interpolate a pointwise function into the nodal (P1) space
pub fn interpolate_nodal<F>(mesh: &TaggedMesh, f: F) -> Array1<Complex64>
where
    F: Fn(f64, f64) -> Complex64,
{
    Array1::from_iter(mesh.nodes.iter().map(|p| f(p.x, p.y)))
}

/// Evaluate `Σ_cells s_c ∫_cell u_h(x) w(x) dx` with a P1 field `nodal`, a
/// per-cell scale `cell_scale`, and a pointwise weight `w`.
///
/// This is the observation functional of the scattering operator; the sum
/// over cells is accumulated sequentially so the reduction is exact and
/// reproducible.
pub fn integrate_weighted<F>(
    mesh: &TaggedMesh,
    nodal: &Array1<Complex64>,
    cell_scale: &[f64],
    weight: F,
) -> Complex64
where
    F: Fn(f64, f64) -> f64,
{
    assert_eq!(nodal.len(), mesh.num_nodes());
    assert_eq!(cell_scale.len(), mesh.num_cells());

    let rule = triangle_rule(3);
    let mut total = Complex64::new(0.0, 0.0);

    for cell in 0..mesh.num_cells() {
        let geom = ElementGeometry::from_cell(mesh, cell);
        let nodes = mesh.cells[cell].nodes;
        let values = [nodal[nodes[0]], nodal[nodes[1]], nodal[nodes[2]]];

        let scale = 2.0 * geom.area;
        let mut cell_total = Complex64::new(0.0, 0.0);
        for qp in &rule {
            let n = p1_values(qp.xi, qp.eta);
            let p = geom.point_at(qp.xi, qp.eta);
            let u = values[0] * n[0] + values[1] * n[1] + values[2] * n[2];
            cell_total += u * (weight(p.x, p.y) * qp.weight * scale);
        }
        total += cell_total * cell_scale[cell];
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{DiskMeshSpec, disk_mesh};
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn small_disk() -> TaggedMesh {
        disk_mesh(&DiskMeshSpec {
            r_core: 0.25,
            r_scatterer: 1.0,
            r_map: 2.0,
            r_pml_start: 2.25,
            r_outer: 3.0,
            cell_size: 0.3,
        })
    }

    fn identity_tensor() -> CellTensor {
        [
            [Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)],
            [Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)],
        ]
    }

    #[test]
    fn test_pure_stiffness_rows_sum_to_zero() {
        // With m = 0, constants are in the kernel: K · 1 = 0
        let mesh = small_disk();
        let grad = vec![identity_tensor(); mesh.num_cells()];
        let mass = vec![Complex64::new(0.0, 0.0); mesh.num_cells()];

        let triplets = assemble_system(&mesh, &grad, &mass);
        let mut row_sums = vec![Complex64::new(0.0, 0.0); mesh.num_nodes()];
        for (i, _, v) in triplets {
            row_sums[i] += v;
        }
        for (i, sum) in row_sums.iter().enumerate() {
            assert!(sum.norm() < 1e-10, "row {} sums to {}", i, sum);
        }
    }

    #[test]
    fn test_mass_totals_domain_area() {
        // With C = 0 and m = -1, summing all entries gives ∫ 1 dx = π r²
        let mesh = small_disk();
        let grad = vec![[[Complex64::new(0.0, 0.0); 2]; 2]; mesh.num_cells()];
        let mass = vec![Complex64::new(-1.0, 0.0); mesh.num_cells()];

        let triplets = assemble_system(&mesh, &grad, &mass);
        let total: Complex64 = triplets.iter().map(|&(_, _, v)| v).sum();

        // Polygonal approximation of the disk is slightly smaller than π r²
        let exact = PI * 3.0 * 3.0;
        assert_relative_eq!(total.re, exact, max_relative = 0.02);
        assert!(total.im.abs() < 1e-12);
    }

    #[test]
    fn test_nonsymmetric_tensor_transposes() {
        // An antisymmetric C must produce A_ij = -A_ji in the gradient part
        let mesh = small_disk();
        let c: CellTensor = [
            [Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)],
            [Complex64::new(-1.0, 0.0), Complex64::new(0.0, 0.0)],
        ];
        let grad = vec![c; mesh.num_cells()];
        let mass = vec![Complex64::new(0.0, 0.0); mesh.num_cells()];

        let triplets = assemble_system(&mesh, &grad, &mass);
        let mut dense = std::collections::HashMap::new();
        for (i, j, v) in triplets {
            *dense.entry((i, j)).or_insert(Complex64::new(0.0, 0.0)) += v;
        }
        for (&(i, j), &v) in &dense {
            let vt = dense
                .get(&(j, i))
                .copied()
                .unwrap_or(Complex64::new(0.0, 0.0));
            assert!(
                (v + vt).norm() < 1e-10,
                "entries ({}, {}) not antisymmetric",
                i,
                j
            );
        }
    }

    #[test]
    fn test_interface_flux_constant_integrates_circumference() {
        // f = 1 on the interface circle: Σ b_i = α · 2π r_map (chord length)
        let mesh = small_disk();
        let alpha = vec![2.0; mesh.num_cells()];
        let rhs = assemble_interface_flux(&mesh, crate::mesh::tags::INTERFACE, &alpha, |_, _| {
            Complex64::new(1.0, 0.0)
        });

        let total: Complex64 = rhs.iter().sum();
        // Chord polygon circumference is slightly below 2πr
        assert_relative_eq!(total.re, 2.0 * 2.0 * PI * 2.0, max_relative = 0.01);
    }

    #[test]
    fn test_lifted_field_zero_for_zero_lift() {
        let mesh = small_disk();
        let alpha = vec![1.0; mesh.num_cells()];
        let kappa = vec![1.0; mesh.num_cells()];
        let lift = Array1::from_elem(mesh.num_nodes(), Complex64::new(0.0, 0.0));

        let rhs = assemble_lifted_field(&mesh, crate::mesh::tags::MEDIUM, &lift, &alpha, &kappa);
        assert!(rhs.iter().all(|v| v.norm() == 0.0));
    }

    #[test]
    fn test_integrate_weighted_constant() {
        // u_h = 1, scale = 1, w = 1 integrates to the mesh area
        let mesh = small_disk();
        let nodal = Array1::from_elem(mesh.num_nodes(), Complex64::new(1.0, 0.0));
        let scale = vec![1.0; mesh.num_cells()];

        let total = integrate_weighted(&mesh, &nodal, &scale, |_, _| 1.0);
        assert_relative_eq!(total.re, PI * 9.0, max_relative = 0.02);
    }

    #[test]
    fn test_integrate_weighted_linear_field() {
        // u_h = x integrates to zero over the centered disk by symmetry
        let mesh = small_disk();
        let nodal = interpolate_nodal(&mesh, |x, _| Complex64::new(x, 0.0));
        let scale = vec![1.0; mesh.num_cells()];

        let total = integrate_weighted(&mesh, &nodal, &scale, |_, _| 1.0);
        assert!(total.norm() < 1e-10);
    }
}
