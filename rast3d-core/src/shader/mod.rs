/// Programmable vertex and fragment stages
use nalgebra::{Matrix4, Point3, Vector3, Vector4};

use crate::color::Color;
use crate::error::ShaderError;
use crate::geometry::VertexData;
use crate::scene::LightId;

mod outline;
mod rainbow;
mod simple;

pub use outline::OutlineShader;
pub use rainbow::RainbowShader;
pub use simple::{LightSource, SimpleShader};

/// The two programmable stages of the pipeline plus their uniform inputs.
///
/// Every method has a default: vertices pass through untouched with `w = 1`, fragments are
/// opaque white, and uniforms are ignored. Uniform names a program does not recognize are
/// dropped silently, so the renderer can feed the same uniforms to any program.
pub trait ShaderProgram {
    /// Transform a vertex to clip space.
    ///
    /// Returns the clip position along with the vertex data the fragment stage will see for
    /// this vertex.
    fn run_vertex_shader(
        &self,
        position: &Point3<f32>,
        data: &VertexData,
    ) -> Result<(Vector4<f32>, VertexData), ShaderError> {
        Ok((position.to_homogeneous(), *data))
    }

    /// Color of a fragment given its barycentric weights in the enclosing triangle
    fn run_fragment_shader(
        &self,
        _barycentric: &Vector3<f32>,
        _vertices: &[VertexData; 3],
    ) -> Result<Color, ShaderError> {
        Ok(Color::WHITE)
    }

    fn set_uniform_mat4(&mut self, _name: &str, _value: &Matrix4<f32>) {}
    fn set_uniform_vec3(&mut self, _name: &str, _value: &Vector3<f32>) {}
    fn set_uniform_f32(&mut self, _name: &str, _value: f32) {}
    fn set_uniform_f32_array(&mut self, _name: &str, _values: &[f32]) {}
    fn set_uniform_vec3_array(&mut self, _name: &str, _values: &[Vector3<f32>]) {}

    /// Lights this program wants uploaded before drawing
    fn lights(&self) -> &[LightId] {
        &[]
    }
}

/// Program using every default: positions as-is, white fragments
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultShader;

impl ShaderProgram for DefaultShader {}

/// Every shader program the renderer can hold
#[derive(Debug, Clone)]
pub enum Shader {
    Default(DefaultShader),
    Simple(SimpleShader),
    Outline(OutlineShader),
    Rainbow(RainbowShader),
}

macro_rules! dispatch {
    ($self:expr, $shader:ident => $body:expr) => {
        match $self {
            Shader::Default($shader) => $body,
            Shader::Simple($shader) => $body,
            Shader::Outline($shader) => $body,
            Shader::Rainbow($shader) => $body,
        }
    };
}

impl Shader {
    /// The lit base program shared by every variant except `Default`
    pub fn simple(&self) -> Option<&SimpleShader> {
        match self {
            Shader::Default(_) => None,
            Shader::Simple(shader) => Some(shader),
            Shader::Outline(shader) => Some(shader.base()),
            Shader::Rainbow(shader) => Some(shader.base()),
        }
    }

    pub fn simple_mut(&mut self) -> Option<&mut SimpleShader> {
        match self {
            Shader::Default(_) => None,
            Shader::Simple(shader) => Some(shader),
            Shader::Outline(shader) => Some(shader.base_mut()),
            Shader::Rainbow(shader) => Some(shader.base_mut()),
        }
    }
}

impl ShaderProgram for Shader {
    fn run_vertex_shader(
        &self,
        position: &Point3<f32>,
        data: &VertexData,
    ) -> Result<(Vector4<f32>, VertexData), ShaderError> {
        dispatch!(self, s => s.run_vertex_shader(position, data))
    }

    fn run_fragment_shader(
        &self,
        barycentric: &Vector3<f32>,
        vertices: &[VertexData; 3],
    ) -> Result<Color, ShaderError> {
        dispatch!(self, s => s.run_fragment_shader(barycentric, vertices))
    }

    fn set_uniform_mat4(&mut self, name: &str, value: &Matrix4<f32>) {
        dispatch!(self, s => s.set_uniform_mat4(name, value))
    }

    fn set_uniform_vec3(&mut self, name: &str, value: &Vector3<f32>) {
        dispatch!(self, s => s.set_uniform_vec3(name, value))
    }

    fn set_uniform_f32(&mut self, name: &str, value: f32) {
        dispatch!(self, s => s.set_uniform_f32(name, value))
    }

    fn set_uniform_f32_array(&mut self, name: &str, values: &[f32]) {
        dispatch!(self, s => s.set_uniform_f32_array(name, values))
    }

    fn set_uniform_vec3_array(&mut self, name: &str, values: &[Vector3<f32>]) {
        dispatch!(self, s => s.set_uniform_vec3_array(name, values))
    }

    fn lights(&self) -> &[LightId] {
        dispatch!(self, s => s.lights())
    }
}

impl From<DefaultShader> for Shader {
    fn from(shader: DefaultShader) -> Self {
        Shader::Default(shader)
    }
}

impl From<SimpleShader> for Shader {
    fn from(shader: SimpleShader) -> Self {
        Shader::Simple(shader)
    }
}

impl From<OutlineShader> for Shader {
    fn from(shader: OutlineShader) -> Self {
        Shader::Outline(shader)
    }
}

impl From<RainbowShader> for Shader {
    fn from(shader: RainbowShader) -> Self {
        Shader::Rainbow(shader)
    }
}

/// Barycentric blend of three object space positions
pub(crate) fn interpolate_local(
    barycentric: &Vector3<f32>,
    positions: &[&crate::geometry::VertexPosition; 3],
) -> Vector3<f32> {
    positions
        .iter()
        .zip(barycentric.iter())
        .fold(Vector3::zeros(), |acc, (p, w)| acc + p.local.coords * *w)
}
