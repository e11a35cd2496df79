//! Disk mesh generator with concentric material rings
//!
//! Builds a triangulation of the full disk of radius `r_outer` from a center
//! vertex fan and concentric node rings. Ring radii are snapped onto the five
//! material interfaces, so every material band is resolved exactly and the
//! tagged facet circles are unions of mesh edges.

use super::types::{Cell, Facet, Point2, TaggedMesh};
use std::f64::consts::PI;

/// Cell and facet tags used by the scattering formulation.
///
/// Cell tags partition the disk into concentric bands (innermost to
/// outermost); facet tags mark the two circles the weak form needs.
pub mod tags {
    /// Scatterer core, ρ ≤ r_core (the mollifier identity region)
    pub const CORE: u8 = 5;
    /// Scatterer mantle, r_core < ρ ≤ r_scatterer
    pub const MANTLE: u8 = 4;
    /// Exterior medium annulus, r_scatterer < ρ ≤ r_map
    pub const MEDIUM: u8 = 3;
    /// Buffer between the mapping region and the absorbing layer
    pub const BUFFER: u8 = 2;
    /// Absorbing layer, r_pml_start < ρ ≤ r_outer
    pub const PML: u8 = 1;

    /// Facet tag for the coupling circle at ρ = r_map
    pub const INTERFACE: u8 = 8;
    /// Facet tag for the outer Dirichlet circle at ρ = r_outer
    pub const OUTER_BOUNDARY: u8 = 6;
}

/// Geometry and resolution of a disk mesh
///
/// Radii must be strictly increasing:
/// `0 < r_core < r_scatterer < r_map <= r_pml_start < r_outer`.
#[derive(Debug, Clone, Copy)]
pub struct DiskMeshSpec {
    /// Radius of the innermost identity region (r0/4)
    pub r_core: f64,
    /// Reference scatterer radius (r0)
    pub r_scatterer: f64,
    /// Outer radius of the coordinate-mapping domain (R)
    pub r_map: f64,
    /// Inner radius of the absorbing layer (R̃)
    pub r_pml_start: f64,
    /// Outer truncation radius (R_PML)
    pub r_outer: f64,
    /// Characteristic cell size
    pub cell_size: f64,
}

impl DiskMeshSpec {
    fn breakpoints(&self) -> [f64; 6] {
        [
            0.0,
            self.r_core,
            self.r_scatterer,
            self.r_map,
            self.r_pml_start,
            self.r_outer,
        ]
    }

    /// Cell tag for a point at radius `rho` (taken at cell centroids, which
    /// never fall on a band boundary because rings are snapped onto them)
    fn tag_at(&self, rho: f64) -> u8 {
        if rho <= self.r_core {
            tags::CORE
        } else if rho <= self.r_scatterer {
            tags::MANTLE
        } else if rho <= self.r_map {
            tags::MEDIUM
        } else if rho <= self.r_pml_start {
            tags::BUFFER
        } else {
            tags::PML
        }
    }
}

/// Ring radii with spacing close to `cell_size`, each breakpoint hit exactly
fn ring_radii(spec: &DiskMeshSpec) -> Vec<f64> {
    let breaks = spec.breakpoints();
    let mut radii = Vec::new();
    for pair in breaks.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if b <= a {
            continue;
        }
        let n = ((b - a) / spec.cell_size).round().max(1.0) as usize;
        for i in 1..=n {
            let r = if i == n {
                b
            } else {
                a + (b - a) * i as f64 / n as f64
            };
            radii.push(r);
        }
    }
    radii
}

/// Triangulate the disk described by `spec`.
///
/// Node layout: node 0 is the center, followed by the rings from innermost
/// to outermost, each with the same angular resolution. Cells are tagged by
/// centroid radius; facet tags are attached to the edges lying on the
/// coupling circle (tag [`tags::INTERFACE`]) and the outer circle
/// (tag [`tags::OUTER_BOUNDARY`]), each recording the adjacent cell on the
/// side facing the origin.
pub fn disk_mesh(spec: &DiskMeshSpec) -> TaggedMesh {
    let radii = ring_radii(spec);
    let n_theta = ((2.0 * PI * spec.r_outer / spec.cell_size).ceil() as usize).max(16);

    let mut nodes = Vec::with_capacity(1 + radii.len() * n_theta);
    nodes.push(Point2::new(0.0, 0.0));
    for &r in &radii {
        for a in 0..n_theta {
            let theta = 2.0 * PI * a as f64 / n_theta as f64;
            nodes.push(Point2::new(r * theta.cos(), r * theta.sin()));
        }
    }

    let ring_node = |ring: usize, a: usize| 1 + ring * n_theta + (a % n_theta);

    let mut cells = Vec::new();
    let mut facets = Vec::new();

    // Center fan to the innermost ring
    for a in 0..n_theta {
        let n0 = ring_node(0, a);
        let n1 = ring_node(0, a + 1);
        cells.push(Cell {
            nodes: [0, n0, n1],
            tag: tags::CORE,
        });
    }

    // Bands between consecutive rings, two triangles per quad
    let tol = 1e-9 * spec.r_outer;
    for ring in 1..radii.len() {
        let outer_is_interface = (radii[ring] - spec.r_map).abs() < tol;
        let outer_is_boundary = (radii[ring] - spec.r_outer).abs() < tol;
        for a in 0..n_theta {
            let n00 = ring_node(ring - 1, a);
            let n10 = ring_node(ring - 1, a + 1);
            let n01 = ring_node(ring, a);
            let n11 = ring_node(ring, a + 1);

            // Split along the n00-n11 diagonal, both triangles
            // counter-clockwise
            cells.push(Cell {
                nodes: [n00, n11, n10],
                tag: 0,
            });
            let inner_side = cells.len();
            cells.push(Cell {
                nodes: [n00, n01, n11],
                tag: 0,
            });

            // The edge (n01, n11) lies on the outer ring of this band and
            // belongs to the second triangle
            if outer_is_interface {
                facets.push(Facet {
                    nodes: [n01, n11],
                    tag: tags::INTERFACE,
                    cell: inner_side,
                });
            }
            if outer_is_boundary {
                facets.push(Facet {
                    nodes: [n01, n11],
                    tag: tags::OUTER_BOUNDARY,
                    cell: inner_side,
                });
            }
        }
    }

    let mut mesh = TaggedMesh {
        nodes,
        cells,
        facets,
    };
    for cell in 0..mesh.num_cells() {
        let rho = mesh.centroid(cell).radius();
        mesh.cells[cell].tag = spec.tag_at(rho);
    }

    log::info!(
        "disk mesh: {} nodes, {} cells, {} rings, {} angular segments",
        mesh.num_nodes(),
        mesh.num_cells(),
        radii.len(),
        n_theta
    );

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_spec() -> DiskMeshSpec {
        DiskMeshSpec {
            r_core: 0.25,
            r_scatterer: 1.0,
            r_map: 2.5,
            r_pml_start: 2.75,
            r_outer: 4.0,
            cell_size: 0.4,
        }
    }

    #[test]
    fn test_ring_radii_hit_breakpoints() {
        let spec = test_spec();
        let radii = ring_radii(&spec);
        for target in [
            spec.r_core,
            spec.r_scatterer,
            spec.r_map,
            spec.r_pml_start,
            spec.r_outer,
        ] {
            assert!(
                radii.iter().any(|&r| r == target),
                "ring radii should contain {}",
                target
            );
        }
    }

    #[test]
    fn test_every_cell_tagged() {
        let mesh = disk_mesh(&test_spec());
        for cell in &mesh.cells {
            assert!((1..=5).contains(&cell.tag), "invalid tag {}", cell.tag);
        }
        // All five bands must be populated
        for tag in 1..=5u8 {
            assert!(
                mesh.cells.iter().any(|c| c.tag == tag),
                "no cells with tag {}",
                tag
            );
        }
    }

    #[test]
    fn test_facet_circles() {
        let spec = test_spec();
        let mesh = disk_mesh(&spec);

        let interface: Vec<_> = mesh.facets_with_tag(tags::INTERFACE).collect();
        let outer: Vec<_> = mesh.facets_with_tag(tags::OUTER_BOUNDARY).collect();
        assert!(!interface.is_empty());
        assert!(!outer.is_empty());

        for f in &interface {
            for &n in &f.nodes {
                assert!((mesh.nodes[n].radius() - spec.r_map).abs() < 1e-12);
            }
            // Adjacent cell sits on the origin side of the circle
            assert!(mesh.centroid(f.cell).radius() < spec.r_map);
        }
        for f in &outer {
            for &n in &f.nodes {
                assert!((mesh.nodes[n].radius() - spec.r_outer).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_interface_edges_close_the_circle() {
        let spec = test_spec();
        let mesh = disk_mesh(&spec);
        let n_edges = mesh.facets_with_tag(tags::INTERFACE).count();
        let circle_nodes = mesh.nodes_with_facet_tag(tags::INTERFACE).len();
        // A closed polygon has as many edges as vertices
        assert_eq!(n_edges, circle_nodes);
    }

    #[test]
    fn test_cells_positively_oriented() {
        let mesh = disk_mesh(&test_spec());
        for cell in 0..mesh.num_cells() {
            let [a, b, c] = mesh.cell_coords(cell);
            let twice_area = (b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y);
            assert!(twice_area > 0.0, "cell {} is inverted", cell);
        }
    }
}
