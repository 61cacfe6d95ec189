use nalgebra::{Matrix4, Point3, Vector3, Vector4};

use super::{interpolate_local, ShaderProgram, SimpleShader};
use crate::color::Color;
use crate::error::{ShaderError, Stage};
use crate::geometry::VertexData;
use crate::scene::LightId;

/// Lit shader that paints a pulsing outline along the edges of box-like meshes.
///
/// A fragment belongs to the outline when at least two of its object space coordinates are
/// farther than the current thickness from the origin. The thickness swings between
/// `minThickness` and `maxThickness` following the `sinTime` uniform.
#[derive(Debug, Clone)]
pub struct OutlineShader {
    base: SimpleShader,
    outline: Color,
    sin_time: f32,
    min_thickness: f32,
    max_thickness: f32,
    used_thickness: f32,
}

impl OutlineShader {
    pub fn new(perspective: Matrix4<f32>, lit: bool, outline: Color) -> Self {
        let mut shader = Self {
            base: SimpleShader::new(perspective, lit),
            outline,
            sin_time: 0.0,
            min_thickness: 0.2,
            max_thickness: 0.4,
            used_thickness: 0.0,
        };
        shader.update_thickness();
        shader
    }

    pub fn base(&self) -> &SimpleShader {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut SimpleShader {
        &mut self.base
    }

    pub fn used_thickness(&self) -> f32 {
        self.used_thickness
    }

    fn update_thickness(&mut self) {
        let normalized = (self.sin_time + 1.0) / 2.0;
        self.used_thickness =
            self.min_thickness + (self.max_thickness - self.min_thickness) * normalized;
    }
}

impl ShaderProgram for OutlineShader {
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

        let exceeding = local
            .iter()
            .filter(|c| c.abs() > self.used_thickness)
            .count();
        if exceeding >= 2 {
            return Ok(self.outline.opaque());
        }

        self.base.run_fragment_shader(barycentric, vertices)
    }

    fn set_uniform_mat4(&mut self, name: &str, value: &Matrix4<f32>) {
        self.base.set_uniform_mat4(name, value);
    }

    fn set_uniform_f32(&mut self, name: &str, value: f32) {
        match name {
            "sinTime" => self.sin_time = value,
            "minThickness" => self.min_thickness = value,
            "maxThickness" => self.max_thickness = value,
            _ => return self.base.set_uniform_f32(name, value),
        }
        self.update_thickness();
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

#[cfg(test)]
mod tests {
    use super::*;

    const OUTLINE: Color = Color::rgb(20, 20, 20);
    const BODY: Color = Color::rgb(200, 150, 100);

    fn fragment_at(local: Point3<f32>) -> [VertexData; 3] {
        let vertex = VertexData::positioned(Vector3::z(), BODY, local)
            .with_position(local, local.to_homogeneous());
        [vertex; 3]
    }

    fn shader(lit: bool) -> OutlineShader {
        let mut shader = OutlineShader::new(Matrix4::identity(), lit, OUTLINE);
        shader.set_uniform_f32("minThickness", 0.2);
        shader.set_uniform_f32("maxThickness", 0.4);
        shader.set_uniform_f32("sinTime", 0.0);
        shader
    }

    #[test]
    fn test_thickness_follows_sin_time() {
        let mut shader = shader(false);
        assert!((shader.used_thickness() - 0.3).abs() < 1e-6);

        shader.set_uniform_f32("sinTime", 1.0);
        assert!((shader.used_thickness() - 0.4).abs() < 1e-6);

        shader.set_uniform_f32("sinTime", -1.0);
        assert!((shader.used_thickness() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_two_axes_past_thickness_is_outline() {
        let shader = shader(true);
        let bary = Vector3::new(1.0, 0.0, 0.0);

        let edge = fragment_at(Point3::new(0.5, 0.5, 0.1));
        assert_eq!(shader.run_fragment_shader(&bary, &edge).unwrap(), OUTLINE);

        let corner = fragment_at(Point3::new(-0.5, 0.5, -0.5));
        assert_eq!(shader.run_fragment_shader(&bary, &corner).unwrap(), OUTLINE);
    }

    #[test]
    fn test_outline_is_opaque() {
        let mut shader = OutlineShader::new(Matrix4::identity(), false, Color::new(20, 20, 20, 10));
        shader.set_uniform_f32("minThickness", 0.2);
        shader.set_uniform_f32("maxThickness", 0.4);

        let edge = fragment_at(Point3::new(0.5, 0.5, 0.1));
        let color = shader
            .run_fragment_shader(&Vector3::new(1.0, 0.0, 0.0), &edge)
            .unwrap();
        assert_eq!(color, OUTLINE);
        assert_eq!(color.a, 255);
    }

    #[test]
    fn test_one_axis_past_thickness_is_base_color() {
        let bary = Vector3::new(1.0, 0.0, 0.0);
        let face = fragment_at(Point3::new(0.5, 0.1, 0.1));

        let unlit = shader(false);
        assert_eq!(unlit.run_fragment_shader(&bary, &face).unwrap(), BODY);

        let lit = shader(true);
        let expected = lit.base().run_fragment_shader(&bary, &face).unwrap();
        assert_eq!(lit.run_fragment_shader(&bary, &face).unwrap(), expected);
        assert_ne!(expected, OUTLINE);
    }

    #[test]
    fn test_requires_position() {
        let shader = shader(false);
        let plain = [VertexData::new(Vector3::z(), BODY); 3];
        assert!(shader
            .run_fragment_shader(&Vector3::new(1.0, 0.0, 0.0), &plain)
            .is_err());
    }
}
