//! On-disk thumbnail cache keyed by source path.

use super::render::render_thumbnail;
use crate::error::{Result, TileForgeError};
use crate::mesh::TriMesh;
use image::{ImageEncoder, RgbaImage};
use log::{debug, warn};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Default edge length of generated thumbnails, in pixels.
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 64;
/// Default cache folder, relative to the working directory.
pub const DEFAULT_THUMBNAIL_DIR: &str = ".thumbnails";

/// PNG previews of tiles, one file per source path.
///
/// The cache key is the identity string only, never the mesh content: a file
/// that is re-imported with other decimation settings keeps its old preview.
#[derive(Debug, Clone)]
pub struct ThumbnailCache {
    folder: PathBuf,
    size: u32,
}

impl ThumbnailCache {
    /// Open (and create if needed) a cache folder.
    pub fn new(folder: impl Into<PathBuf>, size: u32) -> Result<Self> {
        let folder = folder.into();
        std::fs::create_dir_all(&folder).map_err(|e| {
            TileForgeError::Thumbnail(format!("cannot create cache folder {:?}: {}", folder, e))
        })?;
        Ok(Self { folder, size })
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Lowercase hex SHA-256 of `identity`.
    pub fn key(identity: &str) -> String {
        let digest = Sha256::digest(identity.as_bytes());
        format!("{:x}", digest)
    }

    /// Path of the cached PNG for `identity`.
    pub fn path_for(&self, identity: &str) -> PathBuf {
        self.folder.join(format!("{}.png", Self::key(identity)))
    }

    /// Return the cached preview for `identity`, rendering and storing it on a miss.
    pub fn get(&self, mesh: &TriMesh, identity: &str) -> Result<RgbaImage> {
        let path = self.path_for(identity);

        if path.exists() {
            match image::open(&path) {
                Ok(img) => return Ok(img.to_rgba8()),
                Err(e) => warn!("Regenerating unreadable thumbnail {:?}: {}", path, e),
            }
        }

        debug!("Generating thumbnail for {}", identity);
        let img = render_thumbnail(mesh, self.size);
        std::fs::write(&path, encode_png(&img)?)?;
        Ok(img)
    }
}

/// Encode an RGBA image as PNG bytes.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let cursor = std::io::Cursor::new(&mut bytes);
    let encoder = image::codecs::png::PngEncoder::new(cursor);

    encoder
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| TileForgeError::Thumbnail(format!("Failed to encode PNG: {}", e)))?;

    Ok(bytes)
}
