//! Processed tile assets and their registry.

pub mod registry;
pub mod render;

pub use registry::TileRegistry;
pub use render::{HeadlessRenderer, RenderBackend, RenderHandle, TileGeometry};

use crate::mesh::{BoundingBox, GridDims, TriMesh};
use image::RgbaImage;
use std::path::{Path, PathBuf};

/// A normalized, decimated mesh ready for placement.
///
/// Tiles are immutable once built. The render handle is attached by the
/// world when the tile is registered and released when it is disposed.
#[derive(Debug, Clone)]
pub struct Tile {
    filepath: PathBuf,
    name: String,
    mesh: TriMesh,
    bounds: BoundingBox,
    dims: GridDims,
    thumbnail: RgbaImage,
    render_handle: Option<RenderHandle>,
}

impl Tile {
    pub fn new(
        filepath: impl Into<PathBuf>,
        mesh: TriMesh,
        bounds: BoundingBox,
        dims: GridDims,
        thumbnail: RgbaImage,
    ) -> Self {
        let filepath = filepath.into();
        let name = tile_name(&filepath, &dims);
        Self {
            filepath,
            name,
            mesh,
            bounds,
            dims,
            thumbnail,
            render_handle: None,
        }
    }

    /// Source file; the tile's identity for deduplication and thumbnails.
    pub fn filepath(&self) -> &Path {
        &self.filepath
    }

    /// Display label, e.g. `"wall_corner.stl [3x2x1]"`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mesh(&self) -> &TriMesh {
        &self.mesh
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    pub fn dims(&self) -> &GridDims {
        &self.dims
    }

    pub fn thumbnail(&self) -> &RgbaImage {
        &self.thumbnail
    }

    pub fn render_handle(&self) -> Option<RenderHandle> {
        self.render_handle
    }

    /// Buffers for the render collaborator.
    pub fn geometry(&self) -> TileGeometry<'_> {
        TileGeometry {
            positions: &self.mesh.positions,
            indices: &self.mesh.indices,
            face_normals: &self.mesh.face_normals,
            center_offset: self.bounds.center_offset,
        }
    }

    pub(crate) fn attach_render_handle(&mut self, handle: RenderHandle) {
        self.render_handle = Some(handle);
    }

    pub(crate) fn take_render_handle(&mut self) -> Option<RenderHandle> {
        self.render_handle.take()
    }
}

/// Display name of a tile: file name with spaces replaced, plus its footprint.
pub fn tile_name(path: &Path, dims: &GridDims) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());
    format!("{} [{}]", file_name.replace(' ', "_"), dims.label())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::CELL_UNIT;
    use glam::Vec3;

    #[test]
    fn test_tile_name() {
        let dims = GridDims::from_size(Vec3::new(75.0, 50.0, 25.0), CELL_UNIT);
        assert_eq!(
            tile_name(Path::new("/scans/wall corner.stl"), &dims),
            "wall_corner.stl [3x2x1]"
        );
    }
}
