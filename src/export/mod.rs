//! Scene exports.
//!
//! Both exporters read the world and never modify it.

pub mod obj;
pub mod summary;

pub use obj::export_scene_obj;
pub use summary::{format_summary, tile_counts, TileCount};
