//! Mesh geometry: loading, measuring and reducing imported triangle meshes.
//!
//! Every imported file goes through the same normalization: its bounding box
//! defines a centering offset and an integer grid footprint, and the footprint
//! volume decides how many triangles the tile may keep.

pub mod bounds;
pub mod decimate;
pub mod geometry;
pub mod loader;
pub mod obj;
pub mod stl;

pub use bounds::{face_budget, face_budget_with, BoundingBox, GridDims, CELL_UNIT};
pub use decimate::decimate;
pub use geometry::TriMesh;
pub use loader::{load_mesh, FileMeshLoader, MeshLoader};
