//! STL loading.
//!
//! Both ASCII and binary variants are supported. Facet normals stored in the
//! file are ignored and recomputed from the winding.

use super::TriMesh;
use crate::error::LoadError;
use std::io::{BufRead, Read};
use std::path::Path;

/// Size of the binary STL header.
const HEADER_LEN: usize = 80;
/// Bytes per binary facet: normal, three vertices, attribute count.
const FACET_LEN: usize = 50;

/// Parse STL bytes, auto-detecting ASCII or binary.
///
/// `path` is only used for error messages.
pub fn parse_stl(data: &[u8], path: &Path) -> Result<TriMesh, LoadError> {
    let mesh = if is_ascii(data) {
        parse_ascii(data, path)?
    } else {
        parse_binary(data, path)?
    };

    if mesh.is_empty() {
        return Err(LoadError::Empty(path.to_path_buf()));
    }
    Ok(mesh)
}

/// Some binary exporters also start the header with "solid", so the size
/// formula of the binary layout decides when it matches exactly.
fn is_ascii(data: &[u8]) -> bool {
    let head = &data[..data.len().min(HEADER_LEN)];
    let starts_with_solid = String::from_utf8_lossy(head).trim_start().starts_with("solid");
    if !starts_with_solid {
        return false;
    }

    if data.len() >= HEADER_LEN + 4 {
        let count = u32::from_le_bytes([data[80], data[81], data[82], data[83]]) as usize;
        if HEADER_LEN + 4 + count * FACET_LEN == data.len() {
            return false;
        }
    }

    !head
        .iter()
        .any(|&b| b == 0 || (b < 32 && b != b'\n' && b != b'\r' && b != b'\t'))
}

fn parse_ascii(data: &[u8], path: &Path) -> Result<TriMesh, LoadError> {
    let mut mesh = TriMesh::new();
    let mut facet: Vec<[f32; 3]> = Vec::with_capacity(3);

    for (line_no, line) in data.lines().enumerate() {
        let line = line.map_err(|e| LoadError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let line = line.trim();

        if let Some(rest) = line.strip_prefix("vertex") {
            let coords: Vec<f32> = rest
                .split_whitespace()
                .map(|s| s.parse::<f32>())
                .collect::<Result<_, _>>()
                .map_err(|e| LoadError::parse(path, format!("line {}: {}", line_no + 1, e)))?;
            if coords.len() < 3 {
                return Err(LoadError::parse(
                    path,
                    format!("line {}: vertex needs 3 coordinates", line_no + 1),
                ));
            }
            facet.push([coords[0], coords[1], coords[2]]);
        } else if line.starts_with("endfacet") {
            // Polygonal facets are fanned out from their first vertex.
            if facet.len() >= 3 {
                let base = mesh.add_vertex(facet[0]);
                let mut prev = mesh.add_vertex(facet[1]);
                for p in &facet[2..] {
                    let next = mesh.add_vertex(*p);
                    mesh.add_triangle(base, prev, next);
                    prev = next;
                }
            }
            facet.clear();
        }
    }

    Ok(mesh)
}

fn parse_binary(data: &[u8], path: &Path) -> Result<TriMesh, LoadError> {
    let mut reader = data;

    let mut header = [0u8; HEADER_LEN];
    let mut count_bytes = [0u8; 4];
    reader
        .read_exact(&mut header)
        .and_then(|_| reader.read_exact(&mut count_bytes))
        .map_err(|_| LoadError::parse(path, "truncated binary STL header"))?;
    let triangle_count = u32::from_le_bytes(count_bytes) as usize;

    if reader.len() < triangle_count * FACET_LEN {
        return Err(LoadError::parse(
            path,
            format!(
                "binary STL declares {} facets but holds {} bytes of facet data",
                triangle_count,
                reader.len()
            ),
        ));
    }

    let mut mesh = TriMesh {
        positions: Vec::with_capacity(triangle_count * 3),
        indices: Vec::with_capacity(triangle_count * 3),
        face_normals: Vec::with_capacity(triangle_count),
    };

    for facet in reader.chunks_exact(FACET_LEN).take(triangle_count) {
        // Bytes 0..12 hold the stored normal, 48..50 the attribute count.
        let v0 = mesh.add_vertex(read_vertex(&facet[12..24]));
        let v1 = mesh.add_vertex(read_vertex(&facet[24..36]));
        let v2 = mesh.add_vertex(read_vertex(&facet[36..48]));
        mesh.add_triangle(v0, v1, v2);
    }

    Ok(mesh)
}

fn read_vertex(data: &[u8]) -> [f32; 3] {
    let x = f32::from_le_bytes([data[0], data[1], data[2], data[3]]);
    let y = f32::from_le_bytes([data[4], data[5], data[6], data[7]]);
    let z = f32::from_le_bytes([data[8], data[9], data[10], data[11]]);
    [x, y, z]
}

/// Encode a mesh as binary STL. Used by tests and the CLI fixtures.
pub fn encode_binary_stl(mesh: &TriMesh) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + 4 + mesh.triangle_count() * FACET_LEN);
    let mut header = [0u8; HEADER_LEN];
    let label = b"binary STL - tile-forge";
    header[..label.len()].copy_from_slice(label);
    out.extend_from_slice(&header);
    out.extend_from_slice(&(mesh.triangle_count() as u32).to_le_bytes());

    for i in 0..mesh.triangle_count() {
        for c in mesh.face_normals[i] {
            out.extend_from_slice(&c.to_le_bytes());
        }
        for v in mesh.triangle(i) {
            for c in mesh.positions[v as usize] {
                out.extend_from_slice(&c.to_le_bytes());
            }
        }
        out.extend_from_slice(&0u16.to_le_bytes());
    }
    out
}
