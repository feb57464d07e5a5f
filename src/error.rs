//! Error types for tile ingestion and world persistence.

use crate::types::TileId;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using TileForgeError.
pub type Result<T> = std::result::Result<T, TileForgeError>;

/// Main error type for tile-forge operations.
#[derive(Error, Debug)]
pub enum TileForgeError {
    /// A mesh file could not be turned into a tile.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Project file could not be read, written or parsed.
    #[error("Project file {path:?}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: Box<TileForgeError>,
    },

    /// Thumbnail could not be rendered, cached or decoded.
    #[error("Thumbnail error: {0}")]
    Thumbnail(String),

    /// No live tile is registered under this ID.
    #[error("Tile not found: {0}")]
    TileNotFound(TileId),

    /// Failed to parse JSON data.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to read or process an image.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to export a scene.
    #[error("Export error: {0}")]
    Export(String),
}

impl TileForgeError {
    /// Wrap an error as a persistence failure for the given project path.
    pub fn persistence(path: impl Into<PathBuf>, source: impl Into<TileForgeError>) -> Self {
        TileForgeError::Persistence {
            path: path.into(),
            source: Box::new(source.into()),
        }
    }
}

/// Why a single mesh file could not be loaded.
///
/// A load error abandons one import item; the rest of the batch continues.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("file not found: {0:?}")]
    Missing(PathBuf),

    #[error("cannot read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed mesh data in {path:?}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("unsupported mesh format: {0:?}")]
    UnsupportedFormat(PathBuf),

    #[error("mesh has no triangles: {0:?}")]
    Empty(PathBuf),
}

impl LoadError {
    pub(crate) fn parse(path: &std::path::Path, reason: impl Into<String>) -> Self {
        LoadError::Parse {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}
