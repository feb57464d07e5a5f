//! # Tile Forge
//!
//! Core of a tile-based 3D level editor.
//!
//! ## Overview
//!
//! Triangle meshes (STL or OBJ) are imported as reusable *tiles*: each mesh
//! is measured on a 25-unit footprint grid, decimated to a triangle budget
//! that grows with its footprint, and given a cached isometric thumbnail.
//! Tiles are then placed as objects on a snapping grid in a [`World`], which
//! can be saved to and reopened from a JSON project file.
//!
//! ## Quick Start
//!
//! ```ignore
//! use tile_forge::{CancelToken, ImportBatch, ImportConfig, Importer, World};
//!
//! let importer = Importer::new(ImportConfig::default())?;
//! let mut world = World::new();
//!
//! let report = importer.import_paths(
//!     &mut world,
//!     ImportBatch::Fresh(vec!["tiles/wall corner.stl".into()]),
//!     &mut |p| println!("{}/{} {}", p.done, p.total, p.file_name),
//!     &CancelToken::new(),
//! );
//!
//! world.select_tile(report.imported.first().map(|(id, _)| *id));
//! world.place_object([37.0, 12.0, 0.0], 90);
//! tile_forge::save_project(&world, "dungeon.json")?;
//! ```
//!
//! ## Rendering
//!
//! The library does not draw anything itself. Hosts implement
//! [`RenderBackend`] to receive tile geometry when a tile is registered and
//! to release it when the tile is disposed, and subscribe to
//! [`World::on_world_changed`] (or poll [`World::generation`]) to know when
//! to redraw.

pub mod config;
pub mod error;
pub mod events;
pub mod export;
pub mod ingest;
pub mod mesh;
pub mod project;
pub mod thumbnail;
pub mod tile;
pub mod types;
pub mod world;

#[cfg(test)]
mod testutil;

// Re-export main types for convenience
pub use config::ImportConfig;
pub use error::{LoadError, Result, TileForgeError};
pub use events::SubscriptionId;
pub use export::{export_scene_obj, format_summary, tile_counts, TileCount};
pub use ingest::{CancelToken, ImportBatch, ImportProgress, ImportReport, ImportStep, Importer};
pub use mesh::{decimate, face_budget, load_mesh, BoundingBox, GridDims, MeshLoader, TriMesh};
pub use project::{open_project, save_project};
pub use thumbnail::{render_thumbnail, ThumbnailCache};
pub use tile::{HeadlessRenderer, RenderBackend, RenderHandle, Tile, TileGeometry, TileRegistry};
pub use types::{GridPos, TileId};
pub use world::{CameraState, ClickOutcome, GridConfig, SceneSnapshot, World, WorldObject};
