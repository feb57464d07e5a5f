//! Shared types used throughout the library.

mod rotation;

pub use rotation::rotate_about_z;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a registered tile.
///
/// IDs are issued by a monotonically increasing counter and are never reused
/// while the tile they name is live. They are persisted verbatim in project
/// files, so a reloaded scene keeps the IDs it was saved with.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TileId(pub u32);

impl TileId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn index(&self) -> u32 {
        self.0
    }

    /// Highest representable ID.
    pub const MAX: TileId = TileId(u32::MAX);

    /// The ID following this one, saturating at [`TileId::MAX`].
    pub fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TileId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// A grid-snapped position in world units.
///
/// Components are multiples of the grid cell size at the time of placement.
/// The cell size can be halved down to 6.25, so components are not always
/// integral.
pub type GridPos = [f64; 3];
