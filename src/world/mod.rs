//! The editable scene: registered tiles, placed objects, grid and camera.
//!
//! [`World`] is a single owned aggregate. Every mutation goes through its
//! methods, which commit the change, bump [`World::generation`] and then
//! notify listeners. Tile render resources are allocated and released
//! through the [`RenderBackend`] the world owns, so a tile's handle is never
//! leaked when the tile is replaced, removed or the world is reset.

pub mod camera;
pub mod grid;
pub mod object;
pub mod snapshot;

pub use camera::{ground_point, CameraState};
pub use grid::{GridConfig, DEFAULT_CELL_SIZE, MAX_CELL_SIZE, MIN_CELL_SIZE};
pub use object::WorldObject;
pub use snapshot::SceneSnapshot;

use crate::error::{Result, TileForgeError};
use crate::events::{Observers, SubscriptionId};
use crate::tile::{HeadlessRenderer, RenderBackend, Tile, TileRegistry};
use crate::types::{GridPos, TileId};
use log::debug;
use std::fmt;
use std::path::Path;

/// What a click in the viewport did.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    Placed(usize),
    Deleted(WorldObject),
    Ignored,
}

pub struct World {
    tiles: TileRegistry,
    objects: Vec<WorldObject>,
    selected_tile: Option<TileId>,
    delete_mode: bool,
    camera: CameraState,
    grid: GridConfig,
    renderer: Box<dyn RenderBackend>,
    tiles_changed: Observers,
    world_changed: Observers,
    generation: u64,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// An empty world backed by a [`HeadlessRenderer`].
    pub fn new() -> Self {
        Self::with_renderer(HeadlessRenderer::new())
    }

    pub fn with_renderer(renderer: impl RenderBackend + 'static) -> Self {
        Self {
            tiles: TileRegistry::new(),
            objects: Vec::new(),
            selected_tile: None,
            delete_mode: false,
            camera: CameraState::default(),
            grid: GridConfig::default(),
            renderer: Box::new(renderer),
            tiles_changed: Observers::new(),
            world_changed: Observers::new(),
            generation: 0,
        }
    }

    // Tiles

    /// Register a tile, allocating its render resources.
    ///
    /// With an explicit ID the tile replaces whatever tile held it; the
    /// displaced tile's render handle is released.
    pub fn register_tile(&mut self, mut tile: Tile, explicit: Option<TileId>) -> TileId {
        let handle = self.renderer.allocate(tile.geometry());
        tile.attach_render_handle(handle);

        let (id, displaced) = self.tiles.register(tile, explicit);
        if let Some(old) = displaced {
            debug!("Tile {} replaced {:?}", id, old.filepath());
            self.dispose(old);
        }

        self.commit_tiles();
        id
    }

    pub fn tile(&self, id: TileId) -> Result<&Tile> {
        self.tiles.get(id)
    }

    pub fn tiles(&self) -> &TileRegistry {
        &self.tiles
    }

    /// ID of the live tile imported from `path`.
    pub fn find_tile_by_path(&self, path: &Path) -> Option<TileId> {
        self.tiles.find_by_path(path).map(|(id, _)| id)
    }

    /// Remove a tile and every object placed from it.
    pub fn remove_tile(&mut self, id: TileId) -> Result<Tile> {
        let mut tile = self
            .tiles
            .remove(id)
            .ok_or(TileForgeError::TileNotFound(id))?;
        if let Some(handle) = tile.take_render_handle() {
            self.renderer.release(handle);
        }

        let before = self.objects.len();
        self.objects.retain(|obj| obj.tile_id != id);
        if before != self.objects.len() {
            debug!("Dropped {} objects of removed tile {}", before - self.objects.len(), id);
        }
        if self.selected_tile == Some(id) {
            self.selected_tile = None;
        }

        self.commit_tiles();
        self.commit_world();
        Ok(tile)
    }

    fn dispose(&mut self, mut tile: Tile) {
        if let Some(handle) = tile.take_render_handle() {
            self.renderer.release(handle);
        }
    }

    // Selection

    pub fn select_tile(&mut self, id: Option<TileId>) {
        self.selected_tile = id;
    }

    pub fn selected_tile(&self) -> Option<TileId> {
        self.selected_tile
    }

    pub fn delete_mode(&self) -> bool {
        self.delete_mode
    }

    pub fn set_delete_mode(&mut self, enabled: bool) {
        self.delete_mode = enabled;
    }

    // Objects

    pub fn objects(&self) -> &[WorldObject] {
        &self.objects
    }

    /// Place the selected tile at the cell containing `pos`.
    ///
    /// Returns the new object's index, or `None` when no tile is selected or
    /// the selection no longer resolves.
    pub fn place_object(&mut self, pos: [f64; 3], rotation: i32) -> Option<usize> {
        let tile_id = self.selected_tile?;
        if !self.tiles.contains(tile_id) {
            return None;
        }

        let cell = self.to_grid(pos);
        self.objects.push(WorldObject::new(tile_id, cell, rotation));
        self.commit_world();
        Some(self.objects.len() - 1)
    }

    /// Delete the first object in the cell containing `pos`.
    pub fn delete_object_at(&mut self, pos: [f64; 3]) -> Option<WorldObject> {
        let cell = self.to_grid(pos);
        let index = self.objects.iter().position(|obj| obj.pos == cell)?;
        let removed = self.objects.remove(index);
        self.commit_world();
        Some(removed)
    }

    /// Place or delete depending on the delete mode.
    pub fn click(&mut self, pos: [f64; 3], rotation: i32) -> ClickOutcome {
        let outcome = if self.delete_mode {
            self.delete_object_at(pos).map(ClickOutcome::Deleted)
        } else {
            self.place_object(pos, rotation).map(ClickOutcome::Placed)
        };
        outcome.unwrap_or(ClickOutcome::Ignored)
    }

    // Grid and camera

    pub fn to_grid(&self, pos: [f64; 3]) -> GridPos {
        self.grid.to_grid(pos)
    }

    pub fn grid(&self) -> &GridConfig {
        &self.grid
    }

    pub fn grow_grid(&mut self) -> bool {
        let changed = self.grid.grow();
        if changed {
            self.commit_world();
        }
        changed
    }

    pub fn shrink_grid(&mut self) -> bool {
        let changed = self.grid.shrink();
        if changed {
            self.commit_world();
        }
        changed
    }

    pub fn toggle_grid(&mut self) {
        self.grid.toggle_visible();
        self.commit_world();
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    /// Camera moves are presentation only and do not notify listeners.
    pub fn camera_mut(&mut self) -> &mut CameraState {
        &mut self.camera
    }

    // Whole-world operations

    /// Dispose every tile and return to the state of a fresh world.
    ///
    /// Listeners and the generation counter survive a reset.
    pub fn reset(&mut self) {
        for tile in self.tiles.drain() {
            self.dispose(tile);
        }
        self.objects.clear();
        self.selected_tile = None;
        self.delete_mode = false;
        self.camera = CameraState::default();
        self.grid = GridConfig::default();

        self.commit_tiles();
        self.commit_world();
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            tile_meshes: self
                .tiles
                .iter()
                .map(|(id, tile)| (id, tile.filepath().to_path_buf()))
                .collect(),
            objects: self.objects.clone(),
            camera: self.camera,
            grid_size: self.grid.cell_size,
            grid_shown: self.grid.visible,
            tile_id_counter: self.tiles.next_id().index(),
        }
    }

    /// Apply a snapshot whose tiles have already been re-imported.
    ///
    /// Objects referencing a tile that failed to re-import are dropped. The
    /// ID counter never moves below what the registry already issued.
    pub fn restore(&mut self, snapshot: SceneSnapshot) {
        self.tiles.advance_counter(TileId(snapshot.tile_id_counter));
        self.grid = GridConfig {
            cell_size: restored_cell_size(snapshot.grid_size),
            visible: snapshot.grid_shown,
        };
        self.camera = snapshot.camera;

        let tiles = &self.tiles;
        let total = snapshot.objects.len();
        self.objects = snapshot
            .objects
            .into_iter()
            .filter(|obj| tiles.contains(obj.tile_id))
            .collect();
        if self.objects.len() < total {
            debug!(
                "Dropped {} objects referencing missing tiles",
                total - self.objects.len()
            );
        }

        self.commit_world();
    }

    // Notification

    /// Called after tiles are registered, replaced or removed.
    pub fn on_tiles_changed(&mut self, callback: impl FnMut() + 'static) -> SubscriptionId {
        self.tiles_changed.subscribe(callback)
    }

    /// Called after objects, grid or selection-independent scene state change.
    pub fn on_world_changed(&mut self, callback: impl FnMut() + 'static) -> SubscriptionId {
        self.world_changed.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.tiles_changed.unsubscribe(id) || self.world_changed.unsubscribe(id)
    }

    /// Increments on every structural change. Hosts that poll compare it
    /// against the last value they rendered.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn commit_tiles(&mut self) {
        self.generation += 1;
        self.tiles_changed.notify();
    }

    fn commit_world(&mut self) {
        self.generation += 1;
        self.world_changed.notify();
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("tiles", &self.tiles.len())
            .field("objects", &self.objects.len())
            .field("selected_tile", &self.selected_tile)
            .field("delete_mode", &self.delete_mode)
            .field("camera", &self.camera)
            .field("grid", &self.grid)
            .field("generation", &self.generation)
            .finish()
    }
}

/// Cell size from a project file, kept inside the grid limits.
fn restored_cell_size(size: f64) -> f64 {
    if size.is_finite() {
        size.clamp(MIN_CELL_SIZE, MAX_CELL_SIZE)
    } else {
        DEFAULT_CELL_SIZE
    }
}
