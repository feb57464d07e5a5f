//! Tile preview images.

pub mod cache;
pub mod render;

pub use cache::{encode_png, ThumbnailCache, DEFAULT_THUMBNAIL_DIR, DEFAULT_THUMBNAIL_SIZE};
pub use render::render_thumbnail;
