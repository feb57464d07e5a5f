//! Bounding boxes and grid footprints of imported meshes.

use super::TriMesh;
use glam::Vec3;

/// World units per grid-footprint cell when measuring an imported mesh.
pub const CELL_UNIT: f32 = 25.0;

/// Axis-aligned bounding box of a mesh, with the offset that re-anchors it.
///
/// `center_offset` moves the mesh so its horizontal center sits at the origin
/// and its base rests on z = 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
    pub size: Vec3,
    pub center: Vec3,
    pub center_offset: Vec3,
    /// Box corners after applying `center_offset`, for wireframe drawing.
    pub corners: [Vec3; 8],
}

/// Unit cube corners, bottom face first.
const UNIT_CORNERS: [Vec3; 8] = [
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(1.0, 0.0, 0.0),
    Vec3::new(1.0, 1.0, 0.0),
    Vec3::new(0.0, 1.0, 0.0),
    Vec3::new(0.0, 0.0, 1.0),
    Vec3::new(1.0, 0.0, 1.0),
    Vec3::new(1.0, 1.0, 1.0),
    Vec3::new(0.0, 1.0, 1.0),
];

impl BoundingBox {
    /// Build the box from explicit corners.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        let size = max - min;
        let center = (min + max) / 2.0;
        let center_offset = Vec3::new(-center.x, -center.y, -min.z);
        let corners = UNIT_CORNERS.map(|c| min + c * size + center_offset);

        Self {
            min,
            max,
            size,
            center,
            center_offset,
            corners,
        }
    }

    /// Bounds of every vertex of the mesh. `None` if the mesh has no vertices.
    pub fn from_mesh(mesh: &TriMesh) -> Option<Self> {
        Self::from_points(mesh.positions.iter().map(|p| Vec3::from_array(*p)))
    }

    pub fn from_points(points: impl Iterator<Item = Vec3>) -> Option<Self> {
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        let mut has_points = false;

        for p in points {
            has_points = true;
            min = min.min(p);
            max = max.max(p);
        }

        if has_points {
            Some(Self::new(min, max))
        } else {
            None
        }
    }
}

/// Integer grid footprint of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridDims {
    pub size: [u32; 3],
    pub volume: u64,
}

impl GridDims {
    /// Quantize a bounding box into whole cells of [`CELL_UNIT`], at least one per axis.
    pub fn from_bounds(bounds: &BoundingBox) -> Self {
        Self::from_size(bounds.size, CELL_UNIT)
    }

    /// Quantize an extent into cells of `cell_unit`.
    ///
    /// Halves round away from zero. Oversized or infinite extents saturate.
    pub fn from_size(size: Vec3, cell_unit: f32) -> Self {
        let size = size.to_array().map(|s| ((s / cell_unit).round() as u32).max(1));
        let volume = size
            .iter()
            .fold(1u64, |acc, &cells| acc.saturating_mul(u64::from(cells)));
        Self { size, volume }
    }

    /// Footprint as `"XxYxZ"`, used in tile display names.
    pub fn label(&self) -> String {
        format!("{}x{}x{}", self.size[0], self.size[1], self.size[2])
    }
}

/// Triangle budget for a tile of the given grid volume.
///
/// Larger footprints keep more detail: `base * max(round(log2(max(volume, 2))), 1)`,
/// capped at `cap`.
pub fn face_budget_with(volume: u64, base: usize, cap: usize) -> usize {
    let steps = (volume.max(2) as f64).log2().round().max(1.0) as usize;
    (base * steps).min(cap)
}

/// [`face_budget_with`] using the default base of 5000 and cap of 25000.
pub fn face_budget(volume: u64) -> usize {
    face_budget_with(volume, 5000, 25000)
}
