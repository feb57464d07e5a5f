//! Seam between tiles and the graphics collaborator.
//!
//! The renderer never sees a [`Tile`](super::Tile); it receives the buffers
//! once, hands back an opaque handle, and is told when to release it.

use glam::Vec3;
use std::collections::HashSet;

/// Opaque GPU resource handle issued by a [`RenderBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderHandle(pub u64);

/// Buffers a renderer needs to draw a tile.
#[derive(Debug, Clone, Copy)]
pub struct TileGeometry<'a> {
    pub positions: &'a [[f32; 3]],
    pub indices: &'a [u32],
    pub face_normals: &'a [[f32; 3]],
    /// Translation that puts the footprint origin at (0, 0) and the base at z = 0.
    pub center_offset: Vec3,
}

/// Graphics collaborator owning tile render resources.
///
/// Release must run on the context that owns the graphics state; the world
/// only calls it from its own methods.
pub trait RenderBackend {
    fn allocate(&mut self, geometry: TileGeometry<'_>) -> RenderHandle;
    fn release(&mut self, handle: RenderHandle);
}

/// Renderer that only tracks handles. Used headless and in tests.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    next: u64,
    live: HashSet<RenderHandle>,
    released: usize,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles allocated and not yet released.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Total number of releases so far.
    pub fn released_count(&self) -> usize {
        self.released
    }
}

impl RenderBackend for HeadlessRenderer {
    fn allocate(&mut self, _geometry: TileGeometry<'_>) -> RenderHandle {
        let handle = RenderHandle(self.next);
        self.next += 1;
        self.live.insert(handle);
        handle
    }

    fn release(&mut self, handle: RenderHandle) {
        if self.live.remove(&handle) {
            self.released += 1;
        }
    }
}
