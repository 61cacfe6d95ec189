use log::debug;
use nalgebra::{Matrix4, Point3, Vector3, Vector4};

use super::ShaderProgram;
use crate::color::Color;
use crate::error::{ShaderError, Stage};
use crate::geometry::{VertexData, VertexPosition};
use crate::scene::LightId;
use crate::transform::Transform;

const AMBIENT: f32 = 0.01;
const DIFFUSE_WEIGHT: f32 = 0.5;
const FALLOFF_EPSILON: f32 = 1e-4;

/// Point light data as uploaded through the light uniforms
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSource {
    pub position: Vector3<f32>,
    /// Normalized RGB
    pub color: Vector3<f32>,
    pub intensity: f32,
}

/// Shader with optional diffuse lighting.
///
/// Uniforms:
/// - `transform`, `view`, `perspective` (mat4)
/// - `lightPositions`, `lightColors` (vec3 arrays, colors normalized to [0, 1])
/// - `lightIntensities` (f32 array)
///
/// Entry `i` of each light array belongs to the `i`-th registered light. Only registered
/// lights shade; entries past the last registered light are ignored.
///
/// Both stages need position-aware vertex data and fail with
/// [`ShaderError::MissingPosition`] otherwise.
#[derive(Debug, Clone)]
pub struct SimpleShader {
    /// When false the interpolated vertex color is used as-is
    pub lit: bool,
    perspective: Matrix4<f32>,
    view: Matrix4<f32>,
    transform: Matrix4<f32>,
    normal_transform: Matrix4<f32>,
    lights: Vec<LightId>,
    light_positions: Vec<Vector3<f32>>,
    light_colors: Vec<Vector3<f32>>,
    light_intensities: Vec<f32>,
}

impl SimpleShader {
    pub fn new(perspective: Matrix4<f32>, lit: bool) -> Self {
        Self {
            lit,
            perspective,
            view: Matrix4::identity(),
            transform: Matrix4::identity(),
            normal_transform: Matrix4::identity(),
            lights: Vec::new(),
            light_positions: Vec::new(),
            light_colors: Vec::new(),
            light_intensities: Vec::new(),
        }
    }

    pub fn set_perspective(&mut self, perspective: Matrix4<f32>) {
        self.perspective = perspective;
    }

    /// Track a light. Its current data is picked up on every upload, so moving the light
    /// needs no re-registration.
    pub fn add_light(&mut self, light: LightId) {
        self.lights.push(light);
    }

    /// Stop tracking a light along with its uploaded data; does nothing if it was never added
    pub fn remove_light(&mut self, light: LightId) {
        let Some(index) = self.lights.iter().position(|l| *l == light) else {
            debug!("light {light:?} is not registered with this shader");
            return;
        };

        self.lights.remove(index);
        if index < self.light_positions.len() {
            self.light_positions.remove(index);
        }
        if index < self.light_colors.len() {
            self.light_colors.remove(index);
        }
        if index < self.light_intensities.len() {
            self.light_intensities.remove(index);
        }
    }

    /// Registered lights paired with their data as last uploaded
    pub fn light_sources(&self) -> impl Iterator<Item = (LightId, LightSource)> + '_ {
        self.lights
            .iter()
            .zip(&self.light_positions)
            .zip(&self.light_colors)
            .zip(&self.light_intensities)
            .map(|(((id, position), color), intensity)| {
                (
                    *id,
                    LightSource {
                        position: *position,
                        color: *color,
                        intensity: *intensity,
                    },
                )
            })
    }

    pub(crate) fn positions(
        vertices: &[VertexData; 3],
        stage: Stage,
    ) -> Result<[&VertexPosition; 3], ShaderError> {
        Ok([
            vertices[0].require_position(stage)?,
            vertices[1].require_position(stage)?,
            vertices[2].require_position(stage)?,
        ])
    }

    /// Material color: the vertex colors blended by barycentric weight
    pub(crate) fn base_color(barycentric: &Vector3<f32>, vertices: &[VertexData; 3]) -> Color {
        Color::weighted_sum(
            [vertices[0].color, vertices[1].color, vertices[2].color],
            barycentric,
        )
    }

    /// Layer ambient and per-light diffuse terms over `base`, returning an opaque color
    pub(crate) fn shade(
        &self,
        barycentric: &Vector3<f32>,
        vertices: &[VertexData; 3],
        positions: &[&VertexPosition; 3],
        base: Color,
    ) -> Color {
        if !self.lit {
            return base.opaque();
        }

        let mut color = base.scale(AMBIENT);
        for (_, light) in self.light_sources() {
            color += self
                .diffuse(barycentric, vertices, positions, base, &light)
                .scale(DIFFUSE_WEIGHT);
        }

        color.opaque()
    }

    /// Diffuse contribution of one light.
    ///
    /// Falloff is `1 / sqrt(distance)`, softer than the inverse square law.
    fn diffuse(
        &self,
        barycentric: &Vector3<f32>,
        vertices: &[VertexData; 3],
        positions: &[&VertexPosition; 3],
        base: Color,
        light: &LightSource,
    ) -> Color {
        let mut frag_pos = Vector4::zeros();
        let mut normal = Vector3::zeros();
        for i in 0..3 {
            frag_pos += positions[i].global * barycentric[i];
            normal += vertices[i].normal * barycentric[i];
        }

        let Some(normal) = normal.try_normalize(f32::EPSILON) else {
            return Color::TRANSPARENT;
        };
        // Left unnormalized so model scale carries into the diffuse term
        let normal = (self.normal_transform * normal.to_homogeneous()).xyz();

        let offset = light.position - frag_pos.xyz();
        let Some(direction) = offset.try_normalize(f32::EPSILON) else {
            return Color::TRANSPARENT;
        };

        let dot = direction.dot(&normal);
        if dot <= 0.0 {
            return Color::TRANSPARENT;
        }

        let falloff = 1.0 / (offset.norm().sqrt() + FALLOFF_EPSILON);
        base.modulate(&light.color)
            .scale(dot * falloff * light.intensity)
    }
}

impl ShaderProgram for SimpleShader {
    fn run_vertex_shader(
        &self,
        position: &Point3<f32>,
        data: &VertexData,
    ) -> Result<(Vector4<f32>, VertexData), ShaderError> {
        data.require_position(Stage::Vertex)?;

        let global = self.transform * position.to_homogeneous();
        let clip = Transform::mvp_matrix(&self.transform, &self.view, &self.perspective)
            * position.to_homogeneous();
        Ok((clip, data.with_position(*position, global)))
    }

    fn run_fragment_shader(
        &self,
        barycentric: &Vector3<f32>,
        vertices: &[VertexData; 3],
    ) -> Result<Color, ShaderError> {
        let positions = Self::positions(vertices, Stage::Fragment)?;
        let base = Self::base_color(barycentric, vertices);
        Ok(self.shade(barycentric, vertices, &positions, base))
    }

    fn set_uniform_mat4(&mut self, name: &str, value: &Matrix4<f32>) {
        match name {
            "transform" => {
                self.transform = *value;
                self.normal_transform = Transform::normal_matrix(value);
            }
            "view" => self.view = *value,
            "perspective" => self.perspective = *value,
            _ => {}
        }
    }

    fn set_uniform_f32_array(&mut self, name: &str, values: &[f32]) {
        if name == "lightIntensities" {
            self.light_intensities = values.to_vec();
        }
    }

    fn set_uniform_vec3_array(&mut self, name: &str, values: &[Vector3<f32>]) {
        match name {
            "lightPositions" => self.light_positions = values.to_vec(),
            "lightColors" => self.light_colors = values.to_vec(),
            _ => {}
        }
    }

    fn lights(&self) -> &[LightId] {
        &self.lights
    }
}
