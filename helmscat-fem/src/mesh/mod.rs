//! Tagged triangular meshes

mod disk;
mod types;

pub use disk::{DiskMeshSpec, disk_mesh, tags};
pub use types::{Cell, Facet, Point2, TaggedMesh};
