/// Point lights placed by a mesh
use crate::color::Color;
use crate::scene::MeshId;

/// A point light that sits wherever its mesh is.
///
/// The mesh is referenced by handle, so the light follows it when the mesh moves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    mesh: MeshId,
    intensity: f32,
    color: Color,
}

impl Light {
    pub fn new(mesh: MeshId, intensity: f32, color: Color) -> Self {
        Self {
            mesh,
            intensity,
            color,
        }
    }

    pub fn mesh(&self) -> MeshId {
        self.mesh
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn set_intensity(&mut self, intensity: f32) {
        self.intensity = intensity;
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }
}
