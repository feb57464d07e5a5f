//! Import settings.

use crate::mesh::{face_budget_with, GridDims, CELL_UNIT};
use crate::thumbnail::{DEFAULT_THUMBNAIL_DIR, DEFAULT_THUMBNAIL_SIZE};
use glam::Vec3;
use std::path::PathBuf;

/// Configuration for turning mesh files into tiles.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportConfig {
    /// World units per footprint cell when measuring a mesh.
    pub cell_unit: f32,
    /// Triangle budget per log2 step of footprint volume.
    pub base_budget: usize,
    /// Upper limit on the triangle budget of any tile.
    pub max_budget: usize,
    /// Thumbnail edge length in pixels.
    pub thumbnail_size: u32,
    /// Thumbnail cache folder.
    pub thumbnail_dir: PathBuf,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            cell_unit: CELL_UNIT,
            base_budget: 5000,
            max_budget: 25000,
            thumbnail_size: DEFAULT_THUMBNAIL_SIZE,
            thumbnail_dir: PathBuf::from(DEFAULT_THUMBNAIL_DIR),
        }
    }
}

impl ImportConfig {
    pub fn with_cell_unit(mut self, cell_unit: f32) -> Self {
        self.cell_unit = cell_unit;
        self
    }

    /// Set the per-step budget and the cap together.
    pub fn with_budget(mut self, base: usize, max: usize) -> Self {
        self.base_budget = base;
        self.max_budget = max;
        self
    }

    pub fn with_thumbnail_size(mut self, size: u32) -> Self {
        self.thumbnail_size = size;
        self
    }

    pub fn with_thumbnail_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.thumbnail_dir = dir.into();
        self
    }

    /// Footprint of a mesh extent under this configuration.
    pub fn grid_dims(&self, size: Vec3) -> GridDims {
        GridDims::from_size(size, self.cell_unit)
    }

    /// Triangle budget for a footprint volume under this configuration.
    pub fn face_budget(&self, volume: u64) -> usize {
        face_budget_with(volume, self.base_budget, self.max_budget)
    }
}
