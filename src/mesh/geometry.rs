//! Triangle mesh type.

use glam::Vec3;
use std::collections::HashMap;

/// An indexed triangle mesh with one normal per face.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriMesh {
    /// Vertex positions.
    pub positions: Vec<[f32; 3]>,
    /// Triangle indices (3 per triangle).
    pub indices: Vec<u32>,
    /// Unit normal of each triangle, in triangle order.
    pub face_normals: Vec<[f32; 3]>,
}

impl TriMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mesh from positions and triangle indices, computing face normals.
    pub fn from_indexed(positions: Vec<[f32; 3]>, indices: Vec<u32>) -> Self {
        let mut mesh = Self {
            positions,
            indices,
            face_normals: Vec::new(),
        };
        mesh.recompute_normals();
        mesh
    }

    /// Add a vertex and return its index.
    pub fn add_vertex(&mut self, position: [f32; 3]) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position);
        index
    }

    /// Add a triangle by vertex indices and compute its normal.
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.extend_from_slice(&[i0, i1, i2]);
        let normal = self.compute_normal([i0, i1, i2]);
        self.face_normals.push(normal);
    }

    /// Get the number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Check if the mesh has no triangles.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Vertex indices of triangle `i`.
    pub fn triangle(&self, i: usize) -> [u32; 3] {
        [
            self.indices[i * 3],
            self.indices[i * 3 + 1],
            self.indices[i * 3 + 2],
        ]
    }

    /// Corner positions of triangle `i`.
    pub fn triangle_positions(&self, i: usize) -> [Vec3; 3] {
        self.triangle(i)
            .map(|v| Vec3::from_array(self.positions[v as usize]))
    }

    /// Iterate over triangles as `(corners, normal)` pairs in face order.
    pub fn triangles(&self) -> impl Iterator<Item = ([Vec3; 3], Vec3)> + '_ {
        (0..self.triangle_count()).map(move |i| {
            (
                self.triangle_positions(i),
                Vec3::from_array(self.face_normals[i]),
            )
        })
    }

    /// Recompute every face normal from the current positions.
    pub fn recompute_normals(&mut self) {
        self.face_normals = (0..self.triangle_count())
            .map(|i| self.compute_normal(self.triangle(i)))
            .collect();
    }

    fn compute_normal(&self, tri: [u32; 3]) -> [f32; 3] {
        let [a, b, c] = tri.map(|v| Vec3::from_array(self.positions[v as usize]));
        // Degenerate faces get a zero normal, which shades as black.
        (b - a).cross(c - a).normalize_or_zero().to_array()
    }

    /// Merge vertices with bit-identical positions.
    ///
    /// STL stores three private vertices per facet; welding restores the
    /// shared topology that edge-collapse decimation needs.
    pub fn weld(&mut self) {
        let mut lookup: HashMap<[u32; 3], u32> = HashMap::with_capacity(self.positions.len());
        let mut positions = Vec::with_capacity(self.positions.len());
        let mut remap = Vec::with_capacity(self.positions.len());

        for p in &self.positions {
            let key = p.map(|c| if c == 0.0 { 0 } else { c.to_bits() });
            let index = *lookup.entry(key).or_insert_with(|| {
                positions.push(*p);
                (positions.len() - 1) as u32
            });
            remap.push(index);
        }

        for i in &mut self.indices {
            *i = remap[*i as usize];
        }
        self.positions = positions;
    }
}
