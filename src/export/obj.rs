//! Wavefront OBJ export of the composed scene.
//!
//! Every placed object becomes one group. Tile geometry is re-anchored by its
//! bounding-box offset, rotated about Z and moved to the object's cell, so
//! the file matches what the viewport shows.

use crate::error::{Result, TileForgeError};
use crate::types::rotate_about_z;
use crate::world::World;
use glam::Vec3;
use log::debug;
use std::fmt::Write;

/// Export all placed objects as one OBJ document.
pub fn export_scene_obj(world: &World, name: &str) -> Result<String> {
    let mut obj = String::with_capacity(estimate_capacity(world));
    write_scene(world, name, &mut obj).map_err(|e| TileForgeError::Export(e.to_string()))?;
    Ok(obj)
}

fn estimate_capacity(world: &World) -> usize {
    let (verts, tris) = world
        .objects()
        .iter()
        .filter_map(|o| world.tile(o.tile_id).ok())
        .fold((0, 0), |(v, t), tile| {
            (v + tile.mesh().vertex_count(), t + tile.mesh().triangle_count())
        });
    256 + verts * 40 + tris * 80
}

fn write_scene(world: &World, name: &str, obj: &mut String) -> std::fmt::Result {
    writeln!(obj, "# tile-forge OBJ export")?;
    writeln!(obj, "# Objects: {}", world.objects().len())?;
    writeln!(obj)?;
    writeln!(obj, "o {}", name)?;

    // OBJ indices are global and 1-based.
    let mut vertex_base = 1usize;
    let mut normal_base = 1usize;

    for (index, placed) in world.objects().iter().enumerate() {
        let Ok(tile) = world.tile(placed.tile_id) else {
            debug!("Skipping object {} of missing tile {}", index, placed.tile_id);
            continue;
        };
        let mesh = tile.mesh();
        let offset = tile.bounds().center_offset;
        let degrees = placed.rotation as f32;
        let translation = Vec3::new(placed.pos[0] as f32, placed.pos[1] as f32, placed.pos[2] as f32);

        writeln!(obj)?;
        writeln!(obj, "g object_{}_{}", index, group_label(tile.name()))?;

        for p in &mesh.positions {
            let v = rotate_about_z(Vec3::from_array(*p) + offset, degrees) + translation;
            writeln!(obj, "v {} {} {}", v.x, v.y, v.z)?;
        }
        for n in &mesh.face_normals {
            let n = rotate_about_z(Vec3::from_array(*n), degrees);
            writeln!(obj, "vn {} {} {}", n.x, n.y, n.z)?;
        }
        for face in 0..mesh.triangle_count() {
            let [a, b, c] = mesh.triangle(face).map(|i| i as usize + vertex_base);
            let n = face + normal_base;
            writeln!(obj, "f {}//{} {}//{} {}//{}", a, n, b, n, c, n)?;
        }

        vertex_base += mesh.vertex_count();
        normal_base += mesh.face_normals.len();
    }

    Ok(())
}

/// Tile display names contain spaces and brackets; keep group names to one token.
fn group_label(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' { c } else { '_' })
        .collect()
}
