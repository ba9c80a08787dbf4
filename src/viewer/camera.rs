//! Orbit camera for viewing the tree.

use glam::{Mat4, Vec3};
use std::f32::consts::{FRAC_PI_4, TAU};
use tinsel::FormationMode;

/// Closest the camera may orbit.
pub const MIN_DISTANCE: f32 = 8.0;
/// Farthest the camera may orbit.
pub const MAX_DISTANCE: f32 = 25.0;
/// Polar angle limits, measured from straight up.
pub const MIN_POLAR: f32 = FRAC_PI_4;
pub const MAX_POLAR: f32 = std::f32::consts::PI / 1.8;
/// Auto-rotation speed while the tree is assembled. 2.0 is one orbit per 30s.
pub const AUTO_ROTATE_SPEED: f32 = 0.5;
/// Vertical field of view in degrees.
pub const FOV_DEGREES: f32 = 45.0;

const START_POSITION: Vec3 = Vec3::new(0.0, 2.0, 18.0);
const DRAG_SENSITIVITY: f32 = 0.005;
const ZOOM_SENSITIVITY: f32 = 0.6;

/// Orbit camera around the scene origin.
#[derive(Clone, Debug)]
pub struct OrbitCamera {
    /// Rotation about the vertical axis in radians.
    pub azimuth: f32,
    /// Angle from straight up in radians.
    pub polar: f32,
    /// Distance from the target point.
    pub distance: f32,
    /// Point the camera orbits around.
    pub target: Vec3,
}

impl OrbitCamera {
    /// Camera at the default starting position, looking at the origin.
    pub fn new() -> Self {
        let distance = START_POSITION.length();
        Self {
            azimuth: START_POSITION.x.atan2(START_POSITION.z),
            polar: (START_POSITION.y / distance).acos(),
            distance,
            target: Vec3::ZERO,
        }
        .clamped()
    }

    fn clamped(mut self) -> Self {
        self.clamp();
        self
    }

    fn clamp(&mut self) {
        self.polar = self.polar.clamp(MIN_POLAR, MAX_POLAR);
        self.distance = self.distance.clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Camera world position.
    pub fn position(&self) -> Vec3 {
        let (sin_p, cos_p) = self.polar.sin_cos();
        let (sin_a, cos_a) = self.azimuth.sin_cos();
        self.target + self.distance * Vec3::new(sin_p * sin_a, cos_p, sin_p * cos_a)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(FOV_DEGREES.to_radians(), aspect, 0.1, 100.0)
    }

    /// Mouse drag in pixels.
    pub fn drag(&mut self, dx: f32, dy: f32) {
        self.azimuth -= dx * DRAG_SENSITIVITY;
        self.polar -= dy * DRAG_SENSITIVITY;
        self.clamp();
    }

    /// Scroll in lines; positive zooms in.
    pub fn zoom(&mut self, lines: f32) {
        self.distance -= lines * ZOOM_SENSITIVITY;
        self.clamp();
    }

    /// Auto-rotate while the tree is assembled.
    pub fn update(&mut self, mode: FormationMode, delta: f32) {
        if mode == FormationMode::TreeShape {
            self.azimuth = (self.azimuth + AUTO_ROTATE_SPEED * TAU / 60.0 * delta) % TAU;
        }
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_default_position() {
        let camera = OrbitCamera::new();
        assert!(camera.position().distance(START_POSITION) < 1e-4);
    }

    #[test]
    fn test_limits() {
        let mut camera = OrbitCamera::new();
        camera.zoom(1000.0);
        assert_eq!(camera.distance, MIN_DISTANCE);
        camera.zoom(-1000.0);
        assert_eq!(camera.distance, MAX_DISTANCE);
        camera.drag(0.0, 1.0e6);
        assert_eq!(camera.polar, MIN_POLAR);
        camera.drag(0.0, -1.0e6);
        assert_eq!(camera.polar, MAX_POLAR);
    }

    #[test]
    fn test_auto_rotate_only_when_assembled() {
        let mut camera = OrbitCamera::new();
        let start = camera.azimuth;
        camera.update(FormationMode::Scattered, 1.0);
        assert_eq!(camera.azimuth, start);
        camera.update(FormationMode::TreeShape, 1.0);
        assert!(camera.azimuth > start);
    }
}
