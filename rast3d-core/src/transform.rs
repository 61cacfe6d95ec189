/// 3D transformation matrices and rotation state
use nalgebra::{Matrix4, Vector3};

/// Euler rotation of a mesh around its three axes, in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Rotate by delta amounts (in degrees)
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }

    pub fn to_radians(self) -> Vector3<f32> {
        Vector3::new(self.x.to_radians(), self.y.to_radians(), self.z.to_radians())
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<Vector3<f32>> for RotationState {
    fn from(v: Vector3<f32>) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Rotation matrix from a rotation state, composed X, then Y, then Z
    pub fn rotation_matrix(rotation: &RotationState) -> Matrix4<f32> {
        let angles = rotation.to_radians();
        let rx = Matrix4::from_axis_angle(&Vector3::x_axis(), angles.x);
        let ry = Matrix4::from_axis_angle(&Vector3::y_axis(), angles.y);
        let rz = Matrix4::from_axis_angle(&Vector3::z_axis(), angles.z);

        rx * ry * rz
    }

    pub fn translation_matrix(offset: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_translation(offset)
    }

    pub fn scale_matrix(scale: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_nonuniform_scaling(scale)
    }

    /// Object-to-world matrix: translate * rotate(X, Y, Z) * scale
    pub fn model_matrix(
        position: &Vector3<f32>,
        rotation: &RotationState,
        scale: &Vector3<f32>,
    ) -> Matrix4<f32> {
        Self::translation_matrix(position)
            * Self::rotation_matrix(rotation)
            * Self::scale_matrix(scale)
    }

    /// Camera view matrix: rotate(X, -pitch) * rotate(Y, -yaw) * translate(position).
    ///
    /// Angles are in radians. The translation is applied with the camera position as given,
    /// so callers move the world by `position` rather than the eye.
    pub fn view_matrix(position: &Vector3<f32>, yaw: f32, pitch: f32) -> Matrix4<f32> {
        Matrix4::from_axis_angle(&Vector3::x_axis(), -pitch)
            * Matrix4::from_axis_angle(&Vector3::y_axis(), -yaw)
            * Self::translation_matrix(position)
    }

    /// Inverse-transpose of a model matrix, for transforming normals.
    ///
    /// Falls back to the identity when the model matrix is singular (e.g. a zero scale).
    pub fn normal_matrix(model: &Matrix4<f32>) -> Matrix4<f32> {
        model
            .try_inverse()
            .map(|inverse| inverse.transpose())
            .unwrap_or_else(Matrix4::identity)
    }

    pub fn mvp_matrix(
        model: &Matrix4<f32>,
        view: &Matrix4<f32>,
        projection: &Matrix4<f32>,
    ) -> Matrix4<f32> {
        projection * view * model
    }
}
