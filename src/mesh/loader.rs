//! Raw mesh loading from files.

use super::{obj, stl, TriMesh};
use crate::error::LoadError;
use std::path::Path;

/// Source of raw triangle meshes.
///
/// The ingestion pipeline only depends on this trait, so hosts can plug in
/// loaders for other formats.
pub trait MeshLoader {
    /// Load the mesh stored at `path`.
    fn load(&self, path: &Path) -> Result<TriMesh, LoadError>;
}

/// Loads STL and OBJ files from disk, chosen by file extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileMeshLoader;

impl MeshLoader for FileMeshLoader {
    fn load(&self, path: &Path) -> Result<TriMesh, LoadError> {
        load_mesh(path)
    }
}

/// Load a mesh file, dispatching on its extension (case-insensitive).
pub fn load_mesh(path: &Path) -> Result<TriMesh, LoadError> {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    if !matches!(extension.as_str(), "stl" | "obj") {
        return Err(LoadError::UnsupportedFormat(path.to_path_buf()));
    }

    let data = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => LoadError::Missing(path.to_path_buf()),
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let mut mesh = match extension.as_str() {
        "stl" => stl::parse_stl(&data, path)?,
        _ => {
            let text = String::from_utf8_lossy(&data);
            obj::parse_obj(&text, path)?
        }
    };
    mesh.weld();
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file() {
        let err = load_mesh(Path::new("/definitely/not/here.stl")).unwrap_err();
        assert!(matches!(err, LoadError::Missing(_)));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_mesh(Path::new("scan.ply")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_load_welds_stl_vertices() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quad.STL");
        let quad = TriMesh::from_indexed(
            vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            vec![0, 1, 2, 3, 4, 5],
        );
        std::fs::write(&path, stl::encode_binary_stl(&quad)).unwrap();

        let mesh = FileMeshLoader.load(&path).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangle_count(), 2);
    }
}
