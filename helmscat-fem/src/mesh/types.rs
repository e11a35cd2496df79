//! Mesh types for 2D tagged triangulations
//!
//! The scattering formulation needs two kinds of tagging the usual FEM mesh
//! does not carry: per-cell material region tags (scatterer core/mantle,
//! medium, buffer, PML) and per-edge facet tags identifying the coupling
//! circle and the outer Dirichlet circle.

use serde::{Deserialize, Serialize};

/// A point in the plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Distance from the origin
    pub fn radius(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Polar angle in (-π, π]
    pub fn angle(&self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Point2) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<(f64, f64)> for Point2 {
    fn from(p: (f64, f64)) -> Self {
        Point2::new(p.0, p.1)
    }
}

/// A triangular cell with a material region tag
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Cell {
    /// Vertex node indices, counter-clockwise
    pub nodes: [usize; 3],
    /// Material region tag
    pub tag: u8,
}

/// A tagged edge together with the adjacent cell on its inner side
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Facet {
    /// Endpoint node indices
    pub nodes: [usize; 2],
    /// Facet tag
    pub tag: u8,
    /// Index of the adjacent cell on the side facing the origin
    pub cell: usize,
}

/// A triangulated planar domain with cell and facet tags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggedMesh {
    /// Node coordinates
    pub nodes: Vec<Point2>,
    /// Triangular cells
    pub cells: Vec<Cell>,
    /// Tagged facets (only tagged edges are stored)
    pub facets: Vec<Facet>,
}

impl TaggedMesh {
    /// Number of nodes (equals the number of P1 degrees of freedom)
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of cells
    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    /// Vertex coordinates of a cell
    pub fn cell_coords(&self, cell: usize) -> [Point2; 3] {
        let [a, b, c] = self.cells[cell].nodes;
        [self.nodes[a], self.nodes[b], self.nodes[c]]
    }

    /// Centroid of a cell
    pub fn centroid(&self, cell: usize) -> Point2 {
        let [a, b, c] = self.cell_coords(cell);
        Point2::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0)
    }

    /// Facets carrying a given tag
    pub fn facets_with_tag(&self, tag: u8) -> impl Iterator<Item = &Facet> {
        self.facets.iter().filter(move |f| f.tag == tag)
    }

    /// Sorted, deduplicated node indices touched by facets with a given tag
    pub fn nodes_with_facet_tag(&self, tag: u8) -> Vec<usize> {
        let mut nodes: Vec<usize> = self
            .facets_with_tag(tag)
            .flat_map(|f| f.nodes.into_iter())
            .collect();
        nodes.sort_unstable();
        nodes.dedup();
        nodes
    }
}
