/// Camera and projection utilities
use nalgebra::{Matrix4, Vector3};

use crate::transform::Transform;

/// Movement direction for [`Camera::move_in`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraDir {
    Forward,
    Back,
    Up,
    Down,
    Right,
    Left,
}

/// Rotation axis for [`Camera::rotate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraAxis {
    Pitch,
    Yaw,
}

const PITCH_LIMIT_DEGREES: f32 = 89.0;

/// A free-flying camera driven by yaw and pitch.
///
/// The view matrix is cached and only rebuilt on the first [`Camera::matrix`] call after
/// the camera moved or rotated.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vector3<f32>,
    yaw: f32,
    pitch: f32,
    speed: f32,
    rotation_speed: f32,
    cached_matrix: Matrix4<f32>,
    dirty: bool,
}

impl Camera {
    pub fn new(position: Vector3<f32>) -> Self {
        Self::with_speed(position, 4.0, 0.3)
    }

    /// Camera with a custom movement speed (units per second) and rotation sensitivity
    pub fn with_speed(position: Vector3<f32>, speed: f32, rotation_speed: f32) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            speed,
            rotation_speed,
            cached_matrix: Transform::view_matrix(&position, 0.0, 0.0),
            dirty: false,
        }
    }

    /// Move along `dir` for `elapsed` seconds
    pub fn move_in(&mut self, dir: CameraDir, elapsed: f32) {
        let step = self.speed * elapsed;

        match dir {
            CameraDir::Forward => self.position += self.forward() * step,
            CameraDir::Back => self.position -= self.forward() * step,
            CameraDir::Up => self.position += Vector3::y() * step,
            CameraDir::Down => self.position -= Vector3::y() * step,
            CameraDir::Right => self.position += self.right() * step,
            CameraDir::Left => self.position -= self.right() * step,
        }

        self.dirty = true;
    }

    /// Rotate around `axis` by `delta` degrees, scaled by the rotation speed.
    ///
    /// Pitch stays within +/-89 degrees so the camera never looks straight up or down.
    pub fn rotate(&mut self, axis: CameraAxis, delta: f32) {
        let amount = delta.to_radians() * self.rotation_speed;

        match axis {
            CameraAxis::Pitch => {
                let limit = PITCH_LIMIT_DEGREES.to_radians();
                self.pitch = (self.pitch + amount).clamp(-limit, limit);
            }
            CameraAxis::Yaw => self.yaw += amount,
        }

        self.dirty = true;
    }

    /// The view matrix, rebuilt if the camera changed since the last call
    pub fn matrix(&mut self) -> Matrix4<f32> {
        if self.dirty {
            self.cached_matrix = Transform::view_matrix(&self.position, self.yaw, self.pitch);
            self.dirty = false;
        }

        self.cached_matrix
    }

    pub fn forward(&self) -> Vector3<f32> {
        Vector3::new(
            self.yaw.sin() * self.pitch.cos(),
            -self.pitch.sin(),
            self.yaw.cos() * self.pitch.cos(),
        )
        .normalize()
    }

    pub fn right(&self) -> Vector3<f32> {
        self.forward().cross(&Vector3::y()).normalize()
    }

    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    pub fn set_position(&mut self, position: Vector3<f32>) {
        self.position = position;
        self.dirty = true;
    }

    /// Yaw in radians
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Pitch in radians
    pub fn pitch(&self) -> f32 {
        self.pitch
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vector3::new(0.0, 0.0, -4.0))
    }
}

/// Perspective projection parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perspective {
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Perspective {
    pub fn new(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            fov_degrees,
            aspect,
            near,
            far,
        }
    }

    /// Right-handed projection matrix mapping the view frustum to clip space
    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::new_perspective(self.aspect, self.fov_degrees.to_radians(), self.near, self.far)
    }
}

impl Default for Perspective {
    fn default() -> Self {
        Self::new(90.0, 1.0, 0.1, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_creation() {
        let mut camera = Camera::new(Vector3::new(0.0, 0.0, -4.0));
        let expected = Matrix4::new_translation(&Vector3::new(0.0, 0.0, -4.0));
        assert!((camera.matrix() - expected).norm() < 1e-6);
        assert!((camera.forward() - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-6);
        assert!((camera.right() - Vector3::new(-1.0, 0.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn test_full_yaw_turn_restores_matrix() {
        let mut camera = Camera::new(Vector3::new(1.0, -2.0, 3.0));
        camera.rotate(CameraAxis::Pitch, 40.0);
        let before = camera.matrix();

        // 1200 degrees at a rotation speed of 0.3 is one full turn
        for _ in 0..12 {
            camera.rotate(CameraAxis::Yaw, 100.0);
        }
        assert!((camera.yaw() - std::f32::consts::TAU).abs() < 1e-4);
        assert!((camera.matrix() - before).norm() < 1e-4);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut clamped = Camera::default();
        clamped.rotate(CameraAxis::Pitch, 1_000_000.0);
        let first = clamped.matrix();
        assert!((clamped.pitch() - 89f32.to_radians()).abs() < 1e-6);

        clamped.rotate(CameraAxis::Pitch, 1_000_000.0);
        assert_eq!(clamped.matrix(), first);

        let expected = Transform::view_matrix(&clamped.position(), 0.0, 89f32.to_radians());
        assert!((first - expected).norm() < 1e-6);

        clamped.rotate(CameraAxis::Pitch, -1_000_000.0);
        assert!((clamped.pitch() + 89f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn test_move_invalidates_cached_matrix() {
        let mut camera = Camera::default();
        let before = camera.matrix();

        camera.move_in(CameraDir::Forward, 0.5);
        assert!((camera.position() - Vector3::new(0.0, 0.0, -2.0)).norm() < 1e-6);
        assert!((camera.matrix() - before).norm() > 1.0);

        camera.move_in(CameraDir::Up, 0.25);
        camera.move_in(CameraDir::Left, 0.25);
        assert!((camera.position() - Vector3::new(1.0, 1.0, -2.0)).norm() < 1e-6);
    }

    #[test]
    fn test_forward_follows_yaw() {
        let mut camera = Camera::default();
        camera.rotate(CameraAxis::Yaw, 300.0); // 90 degrees
        assert!((camera.forward() - Vector3::new(1.0, 0.0, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn test_perspective_matches_nalgebra() {
        let perspective = Perspective::default();
        let expected =
            Matrix4::new_perspective(1.0, std::f32::consts::FRAC_PI_2, 0.1, 100.0);
        assert!((perspective.matrix() - expected).norm() < 1e-6);
    }
}
