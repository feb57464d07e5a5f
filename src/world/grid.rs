//! Placement grid configuration and coordinate snapping.

use crate::types::GridPos;

/// Smallest allowed cell edge length.
pub const MIN_CELL_SIZE: f64 = 5.0;
/// Largest allowed cell edge length.
pub const MAX_CELL_SIZE: f64 = 500.0;
/// Cell size of a fresh world.
pub const DEFAULT_CELL_SIZE: f64 = 50.0;
/// Slack on the size limits so float rounding never flips a resize.
const LIMIT_EPSILON: f64 = 1e-5;
/// Keeps already-snapped coordinates from falling into the cell below.
const SNAP_TOLERANCE: f64 = 1e-9;

/// Global grid state of a world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridConfig {
    pub cell_size: f64,
    pub visible: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            visible: true,
        }
    }
}

impl GridConfig {
    /// Snap a continuous world position to the anchor of its enclosing cell.
    pub fn to_grid(&self, position: [f64; 3]) -> GridPos {
        position.map(|p| snap(p, self.cell_size))
    }

    /// Double the cell size. Returns `false` (and changes nothing) above the limit.
    pub fn grow(&mut self) -> bool {
        let next = self.cell_size * 2.0;
        if next - LIMIT_EPSILON > MAX_CELL_SIZE {
            return false;
        }
        self.cell_size = next;
        true
    }

    /// Halve the cell size. Returns `false` (and changes nothing) below the limit.
    pub fn shrink(&mut self) -> bool {
        let next = self.cell_size / 2.0;
        if next + LIMIT_EPSILON < MIN_CELL_SIZE {
            return false;
        }
        self.cell_size = next;
        true
    }

    pub fn toggle_visible(&mut self) {
        self.visible = !self.visible;
    }
}

/// Snap one coordinate: `round((p - cell/2) / cell) * cell`.
///
/// Rounding is half-up, which makes this `floor(p / cell) * cell`: cell
/// boundaries sit on multiples of `cell`, a position maps to the lower corner
/// of its cell, and snapping an already snapped value is a no-op. A value on
/// the half-way mark (e.g. 0 with cell 50, where the quotient is -0.5)
/// rounds up to 0.
pub fn snap(p: f64, cell: f64) -> f64 {
    let steps = ((p - cell / 2.0) / cell + 0.5 + SNAP_TOLERANCE).floor();
    steps * cell + 0.0
}
