//! Tile usage summary.

use crate::types::TileId;
use crate::world::World;
use std::collections::HashMap;

/// How many objects of one tile are placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileCount {
    pub tile_id: TileId,
    pub name: String,
    pub count: usize,
}

/// Placed-object counts per tile, in order of first placement.
///
/// Objects whose tile is not registered are not counted.
pub fn tile_counts(world: &World) -> Vec<TileCount> {
    let mut counts: Vec<TileCount> = Vec::new();
    let mut slots: HashMap<TileId, usize> = HashMap::new();

    for obj in world.objects() {
        if let Some(&slot) = slots.get(&obj.tile_id) {
            counts[slot].count += 1;
            continue;
        }
        let Ok(tile) = world.tile(obj.tile_id) else {
            continue;
        };
        slots.insert(obj.tile_id, counts.len());
        counts.push(TileCount {
            tile_id: obj.tile_id,
            name: tile.name().to_string(),
            count: 1,
        });
    }

    counts
}

/// One `"<name>: <count>"` line per tile.
pub fn format_summary(counts: &[TileCount]) -> String {
    if counts.is_empty() {
        return "No tiles placed yet.".to_string();
    }
    counts
        .iter()
        .map(|c| format!("{}: {}", c.name, c.count))
        .collect::<Vec<_>>()
        .join("\n")
}
