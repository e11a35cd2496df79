//! Simulation contexts and the observation operator
//!
//! A [`SimulationContext`] owns everything one pipeline instance needs:
//! the tagged reference mesh, the per-cell material and PML coefficient
//! fields, the constrained load vector (all independent of the shape
//! realization), and the per-realization scratch that [`observe`] rebuilds.
//! The data and inversion pipelines are two independently constructed
//! contexts differing only in mesh resolution; nothing is shared through
//! globals, so several contexts can evaluate different realizations
//! concurrently.
//!
//! [`observe`]: SimulationContext::observe

use crate::config::{ForwardConfig, PipelineKind, reference_cell_size};
use crate::error::ForwardError;
use crate::expansion::{Expansion, truncate_expansion};
use crate::incident::IncidentWave;
use crate::mapping::{DomainMap, PulledBackCoefficients};
use crate::pml::{PmlStretching, PmlTensor};
use helmscat_fem::{
    CellTensor, DiskMeshSpec, TaggedMesh, apply_homogeneous_dirichlet, assemble_interface_flux,
    assemble_lifted_field, assemble_system, dirichlet_nodes, disk_mesh, integrate_weighted,
    interpolate_nodal, solve_direct, tags, zero_dirichlet_rows,
};
use helmscat_solvers::CsrMatrix;
use ndarray::Array1;
use num_complex::Complex64;
use std::f64::consts::PI;

/// One forward-operator instance bound to a mesh resolution
#[derive(Debug)]
pub struct SimulationContext {
    kind: PipelineKind,
    config: ForwardConfig,
    expansion: Expansion,
    mesh: TaggedMesh,
    /// Per-cell material constant α from the region tags
    alpha: Vec<f64>,
    /// Per-cell squared wavenumber κ₀²·n from the region tags
    kappa_sqrd: Vec<f64>,
    /// Per-cell PML tensor at the cell centroid
    pml_tensor: Vec<PmlTensor>,
    /// Per-cell PML scalar d·d̄ at the cell centroid
    pml_scale: Vec<Complex64>,
    /// Nodes constrained to zero on the outer circle
    constrained: Vec<usize>,
    /// Shape-independent load vector, Dirichlet rows zeroed
    load: Array1<Complex64>,
    /// Incident field interpolated at the mesh nodes
    incident_nodal: Array1<Complex64>,
    /// Measurement kernel width
    sigma_smooth: f64,
    /// Detector angles, equally spaced on [0, 2π)
    angles: Vec<f64>,
    /// Per-cell pulled-back coefficients of the latest realization
    pullback: Vec<PulledBackCoefficients>,
}

impl SimulationContext {
    /// Build a context for one pipeline.
    ///
    /// Validates the configuration, truncates the mode expansion, meshes
    /// the reference disk, and assembles the shape-independent load vector.
    pub fn new(kind: PipelineKind, config: ForwardConfig) -> Result<Self, ForwardError> {
        config.validate()?;

        let expansion = truncate_expansion(&config.correlation)?;
        let sigma_smooth = match config.sigma_smooth {
            Some(sigma) => sigma,
            None => solve_sigma_smooth(config.field.frequency)?,
        };

        let geometry = &config.geometry;
        let mesh = disk_mesh(&DiskMeshSpec {
            r_core: geometry.r_scatterer / 4.0,
            r_scatterer: geometry.r_scatterer,
            r_map: geometry.r_map,
            r_pml_start: config.field.r_pml_start,
            r_outer: config.field.r_pml_outer,
            cell_size: config.cell_size_for(kind),
        });

        // Piecewise-constant material fields from the region tags
        let field = &config.field;
        let kappa0_sqr = field.wavenumber().powi(2);
        let mut alpha = Vec::with_capacity(mesh.num_cells());
        let mut kappa_sqrd = Vec::with_capacity(mesh.num_cells());
        for cell in &mesh.cells {
            let interior = matches!(cell.tag, tags::CORE | tags::MANTLE);
            if interior {
                alpha.push(field.alpha_in);
                kappa_sqrd.push(kappa0_sqr * field.n_in);
            } else {
                alpha.push(field.alpha_out);
                kappa_sqrd.push(kappa0_sqr * field.n_out);
            }
        }

        // PML fields at the cell centroids
        let pml = PmlStretching::new(
            field.sigma_pml,
            field.r_pml_start,
            field.r_pml_outer,
            field.frequency,
        );
        let mut pml_tensor = Vec::with_capacity(mesh.num_cells());
        let mut pml_scale = Vec::with_capacity(mesh.num_cells());
        for cell in 0..mesh.num_cells() {
            let c = mesh.centroid(cell);
            pml_tensor.push(pml.tensor(c.x, c.y));
            pml_scale.push(pml.scale(c.radius()));
        }

        let constrained = dirichlet_nodes(&mesh, tags::OUTER_BOUNDARY);

        // Shape-independent load: incident flux through the coupling circle
        // plus the lifted incident trace on the adjacent medium cells
        let incident = IncidentWave::new(field);
        let mut load =
            assemble_interface_flux(&mesh, tags::INTERFACE, &alpha, |x, y| {
                incident.radial_derivative(x, y)
            });

        let interface_nodes = mesh.nodes_with_facet_tag(tags::INTERFACE);
        let mut lift = Array1::from_elem(mesh.num_nodes(), Complex64::new(0.0, 0.0));
        for &node in &interface_nodes {
            let p = mesh.nodes[node];
            lift[node] = incident.value(p.x, p.y);
        }
        load += &assemble_lifted_field(&mesh, tags::MEDIUM, &lift, &alpha, &kappa_sqrd);
        zero_dirichlet_rows(&mut load, &constrained);

        let incident_nodal = interpolate_nodal(&mesh, |x, y| incident.value(x, y));

        let detectors = config.num_detectors;
        let angles = (0..detectors)
            .map(|k| 2.0 * PI * k as f64 / detectors as f64)
            .collect();

        log::info!(
            "{:?} context ready: {} dofs, {} modes, sigma_smooth = {:.4}",
            kind,
            mesh.num_nodes(),
            expansion.modes,
            sigma_smooth
        );

        let pullback = Vec::new();
        Ok(Self {
            kind,
            config,
            expansion,
            mesh,
            alpha,
            kappa_sqrd,
            pml_tensor,
            pml_scale,
            constrained,
            load,
            incident_nodal,
            sigma_smooth,
            angles,
            pullback,
        })
    }

    /// Pipeline this context runs
    pub fn kind(&self) -> PipelineKind {
        self.kind
    }

    /// Number of retained expansion modes J; shape vectors have length 2J
    pub fn mode_count(&self) -> usize {
        self.expansion.modes
    }

    /// Number of detector points K
    pub fn num_detectors(&self) -> usize {
        self.angles.len()
    }

    /// Width of the measurement smoothing kernel
    pub fn sigma_smooth(&self) -> f64 {
        self.sigma_smooth
    }

    /// The reference mesh
    pub fn mesh(&self) -> &TaggedMesh {
        &self.mesh
    }

    /// Evaluate the observation operator for one shape realization.
    ///
    /// Rebuilds the pulled-back coefficient fields, reassembles and solves
    /// the linear system (the load vector is reused), and integrates the
    /// scattered field against the detector kernels. The result always has
    /// length `num_detectors()`.
    pub fn observe(&mut self, shape: &[f64]) -> Result<Vec<f64>, ForwardError> {
        let geometry = self.config.geometry;
        let map = DomainMap::new(
            &self.expansion,
            geometry.r_scatterer,
            geometry.r_map,
            shape,
        )?;

        // The detector ring must stay strictly between the perturbed
        // boundary and the edge of the mapping domain for every detector.
        for &angle in &self.angles {
            let boundary = map.radial().boundary_radius(angle);
            if geometry.r_measure <= boundary {
                return Err(ForwardError::Configuration(format!(
                    "detector radius {} is inside the perturbed boundary {:.4} \
                     at angle {:.4}",
                    geometry.r_measure, boundary, angle
                )));
            }
        }

        // Per-realization coefficient fields supersede the previous ones
        self.pullback = build_pullback(&self.mesh, &map)?;

        // Coefficient-dependent matrix: C = α (α̂ · A), m = κ² κ̂² d·d̄
        let mut grad_coeff = Vec::with_capacity(self.mesh.num_cells());
        let mut mass_coeff = Vec::with_capacity(self.mesh.num_cells());
        for cell in 0..self.mesh.num_cells() {
            let pb = &self.pullback[cell];
            let a = &self.pml_tensor[cell];
            let scale = self.alpha[cell];

            let tensor: CellTensor = [
                [
                    (pb.alpha_xx * a.xx + pb.alpha_xy * a.xy) * scale,
                    (pb.alpha_xx * a.xy + pb.alpha_xy * a.yy) * scale,
                ],
                [
                    (pb.alpha_xy * a.xx + pb.alpha_yy * a.xy) * scale,
                    (pb.alpha_xy * a.xy + pb.alpha_yy * a.yy) * scale,
                ],
            ];
            grad_coeff.push(tensor);
            mass_coeff
                .push(self.pml_scale[cell] * (self.kappa_sqrd[cell] * pb.kappa_sqrd));
        }

        let mut triplets = assemble_system(&self.mesh, &grad_coeff, &mass_coeff);
        apply_homogeneous_dirichlet(&mut triplets, &self.constrained);

        let n = self.mesh.num_nodes();
        let matrix = CsrMatrix::from_triplets(n, n, triplets);
        let solution = solve_direct(&matrix, &self.load)?;

        // Scattered field at the nodes
        let scattered = &solution.values - &self.incident_nodal;

        let kappa_hat: Vec<f64> = self.pullback.iter().map(|pb| pb.kappa_sqrd).collect();
        let normalization = 1.0 / (2.0 * PI * self.sigma_smooth * self.sigma_smooth);
        let spread = 2.0 * self.sigma_smooth * self.sigma_smooth;

        let mut measurements = Vec::with_capacity(self.angles.len());
        for &angle in &self.angles {
            let physical = [
                geometry.r_measure * angle.cos(),
                geometry.r_measure * angle.sin(),
            ];
            let [cx, cy] = map.to_reference(physical[0], physical[1]);

            let value = integrate_weighted(&self.mesh, &scattered, &kappa_hat, |x, y| {
                let dist_sqr = (x - cx).powi(2) + (y - cy).powi(2);
                normalization * (-dist_sqr / spread).exp()
            });
            measurements.push(value.re);
        }

        Ok(measurements)
    }
}

/// Pulled-back coefficient fields at the cell centroids, failing fast on a
/// folded map
fn build_pullback(
    mesh: &TaggedMesh,
    map: &DomainMap<'_>,
) -> Result<Vec<PulledBackCoefficients>, ForwardError> {
    let mut fields = Vec::with_capacity(mesh.num_cells());
    for cell in 0..mesh.num_cells() {
        let c = mesh.centroid(cell);
        let jacobian = map.jacobian(c.x, c.y);
        match jacobian.pullback() {
            Some(pb) => fields.push(pb),
            None => {
                return Err(ForwardError::DegenerateMap {
                    det: jacobian.det(),
                    x: c.x,
                    y: c.y,
                });
            }
        }
    }
    Ok(fields)
}

/// One-time synthesis of ground-truth measurements on the fine mesh
pub fn synthesize_data(
    shape_true: &[f64],
    config: &ForwardConfig,
) -> Result<Vec<f64>, ForwardError> {
    let mut context = SimulationContext::new(PipelineKind::Data, config.clone())?;
    context.observe(shape_true)
}

/// Solve for the kernel width at which the normalized Gaussian, one
/// characteristic length away from its center, has decayed to the 0.1
/// absolute level:
///
/// ```text
/// 1/(2πσ²) · exp(−ℓ²/(2σ²)) = 0.1,   ℓ = h(2f)/2
/// ```
///
/// The root on the decreasing branch is found by bisection.
fn solve_sigma_smooth(frequency: f64) -> Result<f64, ForwardError> {
    let length = 0.5 * reference_cell_size(2.0 * frequency);
    let residual = |sigma: f64| {
        (-length * length / (2.0 * sigma * sigma)).exp() / (2.0 * PI * sigma * sigma) - 0.1
    };

    let mut lo = length;
    let mut hi = 100.0;
    if residual(lo) <= 0.0 || residual(hi) >= 0.0 {
        return Err(ForwardError::Configuration(format!(
            "cannot bracket the smoothing-width equation for frequency {frequency}; \
             set sigma_smooth explicitly"
        )));
    }

    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        if residual(mid) > 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Ok(0.5 * (lo + hi))
}
