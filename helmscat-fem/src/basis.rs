//! P1 Lagrange basis on triangles
//!
//! Reference triangle (0,0), (1,0), (0,1). The scattering solver only uses
//! linear elements (the coefficient fields are piecewise constant anyway),
//! so the basis and element geometry are specialized to P1 triangles with
//! closed-form physical gradients.

use crate::mesh::{Point2, TaggedMesh};

/// Evaluate the three P1 basis functions at reference coordinates (xi, eta)
#[inline]
pub fn p1_values(xi: f64, eta: f64) -> [f64; 3] {
    [1.0 - xi - eta, xi, eta]
}

/// Reference gradients of the P1 basis (constant over the element)
#[inline]
pub fn p1_reference_gradients() -> [[f64; 2]; 3] {
    [[-1.0, -1.0], [1.0, 0.0], [0.0, 1.0]]
}

/// Affine geometry of a triangular element
///
/// Carries the element area and the (constant) physical gradients of the
/// P1 basis, which is everything the assembly loops need.
#[derive(Debug, Clone, Copy)]
pub struct ElementGeometry {
    coords: [Point2; 3],
    /// Element area (positive for counter-clockwise vertex order)
    pub area: f64,
    /// Physical gradients of the three basis functions
    pub gradients: [[f64; 2]; 3],
}

impl ElementGeometry {
    /// Compute the geometry of one mesh cell
    pub fn from_cell(mesh: &TaggedMesh, cell: usize) -> Self {
        let coords = mesh.cell_coords(cell);
        let [a, b, c] = coords;

        let twice_area = (b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y);
        let area = 0.5 * twice_area;

        // ∇N_i = rotated opposite edge / (2A)
        let gradients = [
            [(b.y - c.y) / twice_area, (c.x - b.x) / twice_area],
            [(c.y - a.y) / twice_area, (a.x - c.x) / twice_area],
            [(a.y - b.y) / twice_area, (b.x - a.x) / twice_area],
        ];

        Self {
            coords,
            area,
            gradients,
        }
    }

    /// Physical position of reference coordinates (xi, eta)
    pub fn point_at(&self, xi: f64, eta: f64) -> Point2 {
        let n = p1_values(xi, eta);
        let [a, b, c] = self.coords;
        Point2::new(
            n[0] * a.x + n[1] * b.x + n[2] * c.x,
            n[0] * a.y + n[1] * b.y + n[2] * c.y,
        )
    }
}
