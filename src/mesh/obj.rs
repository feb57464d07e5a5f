//! Wavefront OBJ loading.
//!
//! Only geometry is read: `v` positions and `f` faces. Texture coordinates,
//! normals, groups and materials are skipped.

use super::TriMesh;
use crate::error::LoadError;
use std::path::Path;

/// Parse OBJ text into a triangle mesh. Polygons are fan-triangulated.
pub fn parse_obj(text: &str, path: &Path) -> Result<TriMesh, LoadError> {
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();

    for (line_no, raw) in text.lines().enumerate() {
        let line = raw.trim();
        let mut parts = line.split_whitespace();

        match parts.next() {
            Some("v") => {
                let coords: Vec<f32> = parts
                    .take(3)
                    .map(|s| s.parse::<f32>())
                    .collect::<Result<_, _>>()
                    .map_err(|e| LoadError::parse(path, format!("line {}: {}", line_no + 1, e)))?;
                if coords.len() != 3 {
                    return Err(LoadError::parse(
                        path,
                        format!("line {}: vertex needs 3 coordinates", line_no + 1),
                    ));
                }
                positions.push([coords[0], coords[1], coords[2]]);
            }
            Some("f") => {
                let corners = parts
                    .map(|token| resolve_index(token, positions.len()))
                    .collect::<Option<Vec<u32>>>()
                    .ok_or_else(|| {
                        LoadError::parse(path, format!("line {}: bad face index", line_no + 1))
                    })?;
                if corners.len() < 3 {
                    return Err(LoadError::parse(
                        path,
                        format!("line {}: face needs at least 3 corners", line_no + 1),
                    ));
                }
                for k in 1..corners.len() - 1 {
                    indices.extend_from_slice(&[corners[0], corners[k], corners[k + 1]]);
                }
            }
            _ => {}
        }
    }

    if indices.is_empty() {
        return Err(LoadError::Empty(path.to_path_buf()));
    }
    Ok(TriMesh::from_indexed(positions, indices))
}

/// Resolve a face corner token (`7`, `7/1`, `7//3`, `-1`) to a zero-based index.
fn resolve_index(token: &str, vertex_count: usize) -> Option<u32> {
    let raw: i64 = token.split('/').next()?.parse().ok()?;
    let index = if raw < 0 {
        vertex_count as i64 + raw
    } else {
        raw - 1
    };
    if index < 0 || index >= vertex_count as i64 {
        return None;
    }
    Some(index as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quad() {
        let text = "# quad\nv 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1 4//1\n";
        let mesh = parse_obj(text, Path::new("quad.obj")).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn test_negative_indices() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n";
        let mesh = parse_obj(text, Path::new("neg.obj")).unwrap();
        assert_eq!(mesh.indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_out_of_range_index() {
        let text = "v 0 0 0\nv 1 0 0\nf 1 2 3\n";
        let err = parse_obj(text, Path::new("bad.obj")).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn test_no_faces() {
        let err = parse_obj("v 0 0 0\n", Path::new("pts.obj")).unwrap_err();
        assert!(matches!(err, LoadError::Empty(_)));
    }
}
