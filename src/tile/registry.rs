//! Stable-ID store of registered tiles.

use super::Tile;
use crate::error::{Result, TileForgeError};
use crate::types::TileId;
use log::warn;
use std::path::Path;

/// Tiles keyed by [`TileId`], kept in insertion order for listing.
///
/// New IDs come from a counter that only moves forward. Registering at an
/// explicit ID (project reload) moves the counter past that ID and replaces
/// whatever tile held it. The counter saturates at [`TileId::MAX`]; past that
/// point automatic registration takes the lowest free ID.
#[derive(Debug, Default)]
pub struct TileRegistry {
    entries: Vec<(TileId, Tile)>,
    next_id: TileId,
}

impl TileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tile, returning its ID and the tile it displaced, if any.
    ///
    /// The displaced tile still owns its render handle; the caller must
    /// dispose of it.
    pub fn register(&mut self, tile: Tile, explicit: Option<TileId>) -> (TileId, Option<Tile>) {
        match explicit {
            None => {
                let id = self.issue_id();
                self.entries.push((id, tile));
                (id, None)
            }
            Some(id) => {
                self.next_id = self.next_id.max(id.next());
                match self.entries.iter_mut().find(|(existing, _)| *existing == id) {
                    Some((_, slot)) => {
                        let previous = std::mem::replace(slot, tile);
                        (id, Some(previous))
                    }
                    None => {
                        self.entries.push((id, tile));
                        (id, None)
                    }
                }
            }
        }
    }

    fn issue_id(&mut self) -> TileId {
        let mut id = self.next_id;
        if self.contains(id) {
            // Only reachable once the counter is pinned at TileId::MAX.
            id = (0..=u32::MAX)
                .map(TileId)
                .find(|candidate| !self.contains(*candidate))
                .unwrap_or(TileId::MAX);
            warn!("Tile ID counter exhausted, reusing free ID {}", id);
        }
        self.next_id = self.next_id.max(id.next());
        id
    }

    pub fn get(&self, id: TileId) -> Result<&Tile> {
        self.entries
            .iter()
            .find(|(existing, _)| *existing == id)
            .map(|(_, tile)| tile)
            .ok_or(TileForgeError::TileNotFound(id))
    }

    pub fn contains(&self, id: TileId) -> bool {
        self.entries.iter().any(|(existing, _)| *existing == id)
    }

    /// The live tile imported from `path`, if any.
    pub fn find_by_path(&self, path: &Path) -> Option<(TileId, &Tile)> {
        self.entries
            .iter()
            .find(|(_, tile)| tile.filepath() == path)
            .map(|(id, tile)| (*id, tile))
    }

    /// Remove one tile. Its ID is not reissued.
    pub fn remove(&mut self, id: TileId) -> Option<Tile> {
        let index = self.entries.iter().position(|(existing, _)| *existing == id)?;
        Some(self.entries.remove(index).1)
    }

    /// Remove every tile and reset the ID counter.
    pub fn drain(&mut self) -> Vec<Tile> {
        self.next_id = TileId::default();
        self.entries.drain(..).map(|(_, tile)| tile).collect()
    }

    /// Tiles in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (TileId, &Tile)> {
        self.entries.iter().map(|(id, tile)| (*id, tile))
    }

    pub fn ids(&self) -> Vec<TileId> {
        self.entries.iter().map(|(id, _)| *id).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The ID the next automatic registration will receive.
    pub fn next_id(&self) -> TileId {
        self.next_id
    }

    /// Move the counter forward to at least `id`. Never moves it back.
    pub fn advance_counter(&mut self, id: TileId) {
        self.next_id = self.next_id.max(id);
    }
}
