//! Rotation of placed objects.
//!
//! Object rotations are stored as raw degrees about the world Z axis. Values
//! read from a hand-edited project file are kept as-is.

use glam::{Mat3, Vec3};

/// Rotate a point about the Z axis by `degrees`.
pub fn rotate_about_z(point: Vec3, degrees: f32) -> Vec3 {
    Mat3::from_rotation_z(degrees.to_radians()) * point
}
