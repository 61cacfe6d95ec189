use nalgebra::{Matrix4, Point3, Vector3, Vector4};

use super::{interpolate_local, ShaderProgram, SimpleShader};
use crate::color::Color;
use crate::error::{ShaderError, Stage};
use crate::geometry::VertexData;
use crate::scene::LightId;

/// Lit shader whose material color is an animated hue.
///
/// The hue grows with the distance from the mesh origin (scaled by `frequency`) and shifts
/// with `time`. Lighting is applied on top, exactly as for [`SimpleShader`].
#[derive(Debug, Clone)]
pub struct RainbowShader {
    base: SimpleShader,
    time: f32,
    frequency: f32,
}

impl RainbowShader {
    pub fn new(perspective: Matrix4<f32>, lit: bool) -> Self {
        Self {
            base: SimpleShader::new(perspective, lit),
            time: 0.0,
            frequency: 0.0,
        }
    }

    pub fn base(&self) -> &SimpleShader {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut SimpleShader {
        &mut self.base
    }

    /// Hue in [0, 255) for a fragment at `local` in object space
    pub fn hue_at(&self, local: &Vector3<f32>) -> f32 {
        (local.norm() * self.frequency + self.time).rem_euclid(255.0)
    }
}

impl ShaderProgram for RainbowShader {
    fn run_vertex_shader(
        &self,
        position: &Point3<f32>,
        data: &VertexData,
    ) -> Result<(Vector4<f32>, VertexData), ShaderError> {
        self.base.run_vertex_shader(position, data)
    }

    fn run_fragment_shader(
        &self,
        barycentric: &Vector3<f32>,
        vertices: &[VertexData; 3],
    ) -> Result<Color, ShaderError> {
        let positions = SimpleShader::positions(vertices, Stage::Fragment)?;
        let local = interpolate_local(barycentric, &positions);
        let material = Color::from_hsb(self.hue_at(&local), 255.0, 255.0);

        Ok(self.base.shade(barycentric, vertices, &positions, material))
    }

    fn set_uniform_mat4(&mut self, name: &str, value: &Matrix4<f32>) {
        self.base.set_uniform_mat4(name, value);
    }

    fn set_uniform_f32(&mut self, name: &str, value: f32) {
        self.base.set_uniform_f32(name, value);

        match name {
            "time" => self.time = value,
            "frequency" => self.frequency = value,
            _ => {}
        }
    }

    fn set_uniform_f32_array(&mut self, name: &str, values: &[f32]) {
        self.base.set_uniform_f32_array(name, values);
    }

    fn set_uniform_vec3_array(&mut self, name: &str, values: &[Vector3<f32>]) {
        self.base.set_uniform_vec3_array(name, values);
    }

    fn lights(&self) -> &[LightId] {
        self.base.lights()
    }
}
