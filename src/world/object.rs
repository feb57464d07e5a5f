//! Placed tile instances.

use crate::types::{GridPos, TileId};
use serde::{Deserialize, Serialize, Serializer};

/// One placed instance of a tile.
///
/// `tile_id` does not own the tile; it may dangle after a failed reload, in
/// which case the world drops the object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldObject {
    #[serde(rename = "mesh_id")]
    pub tile_id: TileId,
    #[serde(serialize_with = "serialize_pos")]
    pub pos: GridPos,
    /// Degrees about Z. Stored as given; not restricted to quarter turns.
    pub rotation: i32,
}

impl WorldObject {
    pub fn new(tile_id: TileId, pos: GridPos, rotation: i32) -> Self {
        Self {
            tile_id,
            pos,
            rotation,
        }
    }
}

/// Integral coordinates are written as JSON integers, fractional ones as floats.
fn serialize_pos<S: Serializer>(pos: &GridPos, serializer: S) -> Result<S::Ok, S::Error> {
    let values: Vec<serde_json::Value> = pos
        .iter()
        .map(|&c| {
            if c.fract() == 0.0 && c.abs() < i64::MAX as f64 {
                serde_json::Value::from(c as i64)
            } else {
                serde_json::Value::from(c)
            }
        })
        .collect();
    values.serialize(serializer)
}
