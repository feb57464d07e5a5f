//! Software isometric renderer for tile previews.
//!
//! Triangles are rotated to a fixed isometric view, flat-shaded against a
//! fixed light and painted in face order onto a transparent square canvas.
//! There is no depth buffer: later faces cover earlier ones.

use crate::mesh::TriMesh;
use glam::{Mat3, Vec2, Vec3};
use image::{Rgba, RgbaImage};

/// Rotation about Z, applied first (degrees).
pub const AZIMUTH_DEG: f32 = -45.0;
/// Rotation about X, applied second (degrees). `atan(1/sqrt(2))`.
pub const ELEVATION_DEG: f32 = 35.264;
/// Pixels left empty on each side of the projection.
const MARGIN: f32 = 2.0;
/// Opacity of every painted face.
const FACE_ALPHA: u8 = 200;

/// View rotation of the thumbnail camera.
pub fn view_rotation() -> Mat3 {
    Mat3::from_rotation_x(ELEVATION_DEG.to_radians()) * Mat3::from_rotation_z(AZIMUTH_DEG.to_radians())
}

fn light_direction() -> Vec3 {
    Vec3::new(0.3, 0.5, 0.8).normalize()
}

/// Grey level of a face with the given rotated normal.
pub fn shade(normal: Vec3) -> u8 {
    let brightness = normal.dot(light_direction()).max(0.0);
    (150.0 * brightness + 50.0) as u8
}

/// Render a `size` x `size` preview of `mesh`.
pub fn render_thumbnail(mesh: &TriMesh, size: u32) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(size, size, Rgba([0, 0, 0, 0]));
    if mesh.is_empty() || size == 0 {
        return canvas;
    }

    let rotation = view_rotation();
    let faces: Vec<([Vec3; 3], Vec3)> = mesh
        .triangles()
        .map(|(corners, normal)| (corners.map(|c| rotation * c), rotation * normal))
        .collect();

    let mut min = Vec2::splat(f32::MAX);
    let mut max = Vec2::splat(f32::MIN);
    for (corners, _) in &faces {
        for c in corners {
            min = min.min(c.truncate());
            max = max.max(c.truncate());
        }
    }
    let span = (max - min).max(Vec2::splat(1e-6));
    let extent = size as f32 - 2.0 * MARGIN;

    for (corners, normal) in &faces {
        let grey = shade(*normal);
        let color = Rgba([grey, grey, grey, FACE_ALPHA]);
        let projected = corners.map(|c| (c.truncate() - min) / span * extent + Vec2::splat(MARGIN));
        fill_triangle(&mut canvas, projected, color);
    }

    canvas
}

/// Fill the pixels whose centers fall inside the triangle.
fn fill_triangle(canvas: &mut RgbaImage, tri: [Vec2; 3], color: Rgba<u8>) {
    let [a, b, c] = tri;
    let area = edge(a, b, c);
    if area == 0.0 {
        return;
    }

    let (w, h) = canvas.dimensions();
    let lo = a.min(b).min(c).floor().max(Vec2::ZERO);
    let hi = a.max(b).max(c).ceil().min(Vec2::new(w as f32, h as f32));

    for y in lo.y as u32..hi.y as u32 {
        for x in lo.x as u32..hi.x as u32 {
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let w0 = edge(b, c, p) / area;
            let w1 = edge(c, a, p) / area;
            let w2 = edge(a, b, p) / area;
            if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                blend(canvas.get_pixel_mut(x, y), color);
            }
        }
    }
}

fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// Source-over compositing of a non-premultiplied color.
fn blend(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    let sa = src[3] as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return;
    }
    for i in 0..3 {
        let v = (src[i] as f32 * sa + dst[i] as f32 * da * (1.0 - sa)) / out_a;
        dst[i] = v.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round() as u8;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> TriMesh {
        TriMesh::from_indexed(
            vec![[0.0, 0.0, 0.0], [10.0, 0.0, 0.0], [10.0, 10.0, 0.0], [0.0, 10.0, 0.0]],
            vec![0, 1, 2, 0, 2, 3],
        )
    }

    #[test]
    fn test_empty_mesh_is_transparent() {
        let img = render_thumbnail(&TriMesh::new(), 16);
        assert_eq!(img.dimensions(), (16, 16));
        assert!(img.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_margin_stays_clear() {
        let img = render_thumbnail(&square(), 32);
        for i in 0..32 {
            assert_eq!(img.get_pixel(0, i)[3], 0);
            assert_eq!(img.get_pixel(i, 0)[3], 0);
            assert_eq!(img.get_pixel(31, i)[3], 0);
            assert_eq!(img.get_pixel(i, 31)[3], 0);
        }
    }

    #[test]
    fn test_faces_are_painted_with_shade() {
        let img = render_thumbnail(&square(), 32);
        let painted: Vec<_> = img.pixels().filter(|p| p[3] > 0).collect();
        assert!(!painted.is_empty());

        let grey = shade(view_rotation() * Vec3::Z);
        for p in painted {
            assert_eq!(p[0], grey);
            assert_eq!(p[3], FACE_ALPHA);
        }
    }

    #[test]
    fn test_shade_range() {
        assert_eq!(shade(-light_direction()), 50);
        assert!(shade(light_direction()) >= 199);
    }

    #[test]
    fn test_overlapping_faces_accumulate_alpha() {
        let mut px = Rgba([0, 0, 0, 0]);
        blend(&mut px, Rgba([100, 100, 100, 200]));
        assert_eq!(px, Rgba([100, 100, 100, 200]));
        blend(&mut px, Rgba([100, 100, 100, 200]));
        assert!(px[3] > 200);
        assert_eq!(px[0], 100);
    }
}
