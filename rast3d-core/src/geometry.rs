/// Geometry primitives for 3D rendering
use log::debug;
use nalgebra::{Matrix4, Point3, Vector3, Vector4};

use crate::color::Color;
use crate::error::{RenderError, ShaderError, Stage};
use crate::renderer::Renderer;
use crate::shader::ShaderProgram;
use crate::transform::{RotationState, Transform};

/// Object and world space position of a vertex.
///
/// `global` is filled in by the vertex stage and read back by the fragment stage of the
/// same triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexPosition {
    pub local: Point3<f32>,
    pub global: Vector4<f32>,
}

/// Attributes bound to a vertex.
///
/// Every record carries a normal and a color. Records built with [`VertexData::positioned`]
/// also carry a [`VertexPosition`], which the lit shaders require.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexData {
    pub normal: Vector3<f32>,
    pub color: Color,
    pub position: Option<VertexPosition>,
}

impl VertexData {
    pub fn new(normal: Vector3<f32>, color: Color) -> Self {
        Self {
            normal,
            color,
            position: None,
        }
    }

    pub fn positioned(normal: Vector3<f32>, color: Color, local: Point3<f32>) -> Self {
        Self {
            normal,
            color,
            position: Some(VertexPosition {
                local,
                global: Vector4::zeros(),
            }),
        }
    }

    /// The position-aware part of the record, or an error naming the stage that needed it
    pub fn require_position(&self, stage: Stage) -> Result<&VertexPosition, ShaderError> {
        self.position
            .as_ref()
            .ok_or(ShaderError::MissingPosition { stage })
    }

    /// Copy of this record with its positions replaced
    pub fn with_position(&self, local: Point3<f32>, global: Vector4<f32>) -> Self {
        Self {
            position: Some(VertexPosition { local, global }),
            ..*self
        }
    }
}

/// A renderable triangle mesh with a position, scale and rotation.
///
/// Vertices are read three at a time, each triple forming one triangle. The vertex data
/// list may be shorter than the vertex list: vertex `i` uses record `i % len`.
#[derive(Debug, Clone)]
pub struct Mesh {
    vertices: Vec<Point3<f32>>,
    vertex_data: Vec<VertexData>,
    position: Vector3<f32>,
    scale: Vector3<f32>,
    rotation: RotationState,
    matrix: Matrix4<f32>,
    matrix_dirty: bool,
}

impl Mesh {
    pub fn new(
        vertices: Vec<Point3<f32>>,
        vertex_data: Vec<VertexData>,
    ) -> Result<Self, RenderError> {
        if vertices.len() % 3 != 0 {
            return Err(RenderError::VertexCount(vertices.len()));
        }
        if vertex_data.is_empty() {
            return Err(RenderError::NoVertexData);
        }

        debug!(
            "mesh created: {} triangles, {} vertex data records",
            vertices.len() / 3,
            vertex_data.len()
        );

        Ok(Self {
            vertices,
            vertex_data,
            position: Vector3::zeros(),
            scale: Vector3::new(1.0, 1.0, 1.0),
            rotation: RotationState::zero(),
            matrix: Matrix4::identity(),
            matrix_dirty: true,
        })
    }

    /// Draw every triangle of the mesh with the renderer's active shader.
    ///
    /// Returns the number of fragments written.
    pub fn render(&mut self, renderer: &mut Renderer) -> Result<usize, RenderError> {
        let model = self.model_matrix();
        let mut fragments = 0;

        for first in (0..self.vertices.len()).step_by(3) {
            if let Some(shader) = renderer.active_shader_mut() {
                shader.set_uniform_mat4("transform", &model);
            }

            let triangle = [
                self.vertices[first],
                self.vertices[first + 1],
                self.vertices[first + 2],
            ];
            fragments += renderer.render_triangle(&triangle, self.triangle_data(first))?;
        }

        Ok(fragments)
    }

    /// Object-to-world matrix, recomputed only after a transform setter was called
    pub fn model_matrix(&mut self) -> Matrix4<f32> {
        if self.matrix_dirty {
            self.matrix = Transform::model_matrix(&self.position, &self.rotation, &self.scale);
            self.matrix_dirty = false;
        }

        self.matrix
    }

    /// Vertex data of the triangle starting at vertex `first`, wrapping around the list
    pub fn triangle_data(&self, first: usize) -> [&VertexData; 3] {
        let len = self.vertex_data.len();
        [
            &self.vertex_data[first % len],
            &self.vertex_data[(first + 1) % len],
            &self.vertex_data[(first + 2) % len],
        ]
    }

    pub fn set_position(&mut self, position: Vector3<f32>) {
        self.position = position;
        self.matrix_dirty = true;
    }

    pub fn set_scale(&mut self, scale: Vector3<f32>) {
        self.scale = scale;
        self.matrix_dirty = true;
    }

    /// Set the rotation, in degrees around each axis
    pub fn set_rotation(&mut self, rotation: Vector3<f32>) {
        self.rotation = rotation.into();
        self.matrix_dirty = true;
    }

    /// Add to the current rotation, in degrees
    pub fn rotate_by(&mut self, delta: Vector3<f32>) {
        self.rotation.rotate(delta.x, delta.y, delta.z);
        self.matrix_dirty = true;
    }

    pub fn position(&self) -> Vector3<f32> {
        self.position
    }

    pub fn scale(&self) -> Vector3<f32> {
        self.scale
    }

    pub fn rotation(&self) -> Vector3<f32> {
        Vector3::new(self.rotation.x, self.rotation.y, self.rotation.z)
    }

    pub fn vertices(&self) -> &[Point3<f32>] {
        &self.vertices
    }

    pub fn vertex_data(&self) -> &[VertexData] {
        &self.vertex_data
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }
}
