//! Orbit camera state.
//!
//! The camera orbits a pan target on the ground plane. It is presentation
//! state only, but it is saved with the project so a reopened scene looks
//! the same.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Elevation limit in degrees, short of the poles.
pub const MAX_ELEVATION: f32 = 89.0;
/// Degrees of orbit per pixel of mouse drag.
const ORBIT_SPEED: f32 = 0.3;
/// Distance at which one pixel of drag pans half a world unit.
const PAN_REFERENCE_DISTANCE: f32 = 500.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraState {
    /// Orbit target. `z` is always 0.
    pub pan: Vec3,
    pub dist: f32,
    /// Degrees around the Z axis.
    pub azim: f32,
    /// Degrees above the ground plane, in `[-89, 89]`.
    pub elev: f32,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            pan: Vec3::ZERO,
            dist: 500.0,
            azim: 45.0,
            elev: 30.0,
        }
    }
}

impl CameraState {
    /// Unit vector from the target towards the eye.
    pub fn forward(&self) -> Vec3 {
        let (phi, theta) = (self.elev.to_radians(), self.azim.to_radians());
        Vec3::new(
            phi.cos() * theta.cos(),
            phi.cos() * theta.sin(),
            phi.sin(),
        )
    }

    /// Eye position for a look-at view of `pan` with Z up.
    pub fn eye_position(&self) -> Vec3 {
        let target = Vec3::new(self.pan.x, self.pan.y, 0.0);
        target + self.forward() * self.dist
    }

    /// Orbit by a mouse drag of `(dx, dy)` pixels.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.azim += dx * ORBIT_SPEED;
        self.set_elevation(self.elev + dy * ORBIT_SPEED);
    }

    pub fn set_elevation(&mut self, degrees: f32) {
        self.elev = degrees.clamp(-MAX_ELEVATION, MAX_ELEVATION);
    }

    /// Zoom one wheel notch: in shortens the distance by 10%, out lengthens it by 10%.
    pub fn zoom(&mut self, zoom_in: bool) {
        self.dist *= if zoom_in { 0.9 } else { 1.1 };
    }

    /// Pan by a mouse drag of `(dx, dy)` pixels, scaled by distance.
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        let forward = self.forward();
        let right = forward.cross(Vec3::Z).normalize_or_zero();
        let up = right.cross(forward).normalize_or_zero();
        let factor = self.dist / PAN_REFERENCE_DISTANCE * 0.5;
        let delta = (right * dx + up * dy) * factor;
        self.pan += Vec3::new(delta.x, delta.y, 0.0);
    }
}

/// Intersect the segment through `near` and `far` with the ground plane z = 0.
///
/// Hosts unproject the cursor at both depth extremes and call this to get
/// the world position under the mouse. `None` when the ray is parallel to
/// the ground.
pub fn ground_point(near: Vec3, far: Vec3) -> Option<Vec3> {
    let dz = far.z - near.z;
    if dz.abs() < f32::EPSILON {
        return None;
    }
    let t = -near.z / dz;
    let hit = near + (far - near) * t;
    Some(Vec3::new(hit.x, hit.y, 0.0))
}
