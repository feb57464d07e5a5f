//! Fixtures shared by unit tests.

use crate::mesh::{stl, BoundingBox, GridDims, TriMesh};
use crate::tile::Tile;
use image::RgbaImage;
use std::path::{Path, PathBuf};

/// Closed box with 8 vertices and 12 outward-facing triangles.
pub fn box_mesh(size: [f32; 3]) -> TriMesh {
    let [x, y, z] = size;
    let positions = vec![
        [0.0, 0.0, 0.0],
        [x, 0.0, 0.0],
        [x, y, 0.0],
        [0.0, y, 0.0],
        [0.0, 0.0, z],
        [x, 0.0, z],
        [x, y, z],
        [0.0, y, z],
    ];
    #[rustfmt::skip]
    let indices = vec![
        0, 2, 1, 0, 3, 2, // bottom
        4, 5, 6, 4, 6, 7, // top
        0, 1, 5, 0, 5, 4, // front
        1, 2, 6, 1, 6, 5, // right
        2, 3, 7, 2, 7, 6, // back
        3, 0, 4, 3, 4, 7, // left
    ];
    TriMesh::from_indexed(positions, indices)
}

/// Flat `n` x `n` quad grid of `cell`-sized squares on z = 0.
pub fn plane_grid(n: u32, cell: f32) -> TriMesh {
    let mut mesh = TriMesh::new();
    for y in 0..=n {
        for x in 0..=n {
            mesh.add_vertex([x as f32 * cell, y as f32 * cell, 0.0]);
        }
    }
    let row = n + 1;
    for y in 0..n {
        for x in 0..n {
            let i = y * row + x;
            mesh.add_triangle(i, i + 1, i + row + 1);
            mesh.add_triangle(i, i + row + 1, i + row);
        }
    }
    mesh
}

/// A tile built from a box mesh without touching the filesystem.
pub fn box_tile(path: &str, size: [f32; 3]) -> Tile {
    let mesh = box_mesh(size);
    let bounds = BoundingBox::from_mesh(&mesh).unwrap();
    let dims = GridDims::from_bounds(&bounds);
    Tile::new(path, mesh, bounds, dims, RgbaImage::new(4, 4))
}

/// Write a box mesh as binary STL and return its path.
pub fn write_box_stl(dir: &Path, name: &str, size: [f32; 3]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, stl::encode_binary_stl(&box_mesh(size))).unwrap();
    path
}
