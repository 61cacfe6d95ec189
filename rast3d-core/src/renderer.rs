/// Triangle rasterizer with depth testing and programmable shading
use image::RgbaImage;
use log::{debug, trace};
use nalgebra::{Point3, Vector3, Vector4};

use crate::color::Color;
use crate::depth::DepthBuffer;
use crate::error::RenderError;
use crate::geometry::VertexData;
use crate::shader::{Shader, ShaderProgram};

/// Renderer settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RendererConfig {
    pub width: u32,
    pub height: u32,
    pub clear_color: Color,
    /// Depth written by `clear_buffers`, farther than anything drawn
    pub clear_depth: f32,
    /// Triangles with a clip space z outside of `(near, far)` are skipped whole
    pub near: f32,
    pub far: f32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            width: 160,
            height: 200,
            clear_color: Color::WHITE,
            clear_depth: 1000.0,
            near: 0.0,
            far: 100.0,
        }
    }
}

/// Handle to a shader program registered with a [`Renderer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderId(usize);

/// Software rasterizer owning the color and depth buffers.
///
/// Shader programs are registered once with [`Renderer::add_shader`] and selected per draw
/// with [`Renderer::set_shader`]. Drawing without an active shader does nothing.
#[derive(Debug)]
pub struct Renderer {
    config: RendererConfig,
    pixels: RgbaImage,
    depth_buffer: DepthBuffer,
    shaders: Vec<Shader>,
    active: Option<ShaderId>,
}

impl Renderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_config(RendererConfig {
            width,
            height,
            ..RendererConfig::default()
        })
    }

    pub fn with_config(config: RendererConfig) -> Self {
        let config = RendererConfig {
            width: config.width.max(1),
            height: config.height.max(1),
            ..config
        };

        let mut depth_buffer = DepthBuffer::new(config.width as usize, config.height as usize);
        depth_buffer.clear(config.clear_depth);

        Self {
            pixels: RgbaImage::from_pixel(config.width, config.height, config.clear_color.into()),
            depth_buffer,
            shaders: Vec::new(),
            active: None,
            config,
        }
    }

    /// Reset the depth buffer to the clear depth and the image to the clear color
    pub fn clear_buffers(&mut self) {
        self.depth_buffer.clear(self.config.clear_depth);
        let clear = self.config.clear_color.into();
        for pixel in self.pixels.pixels_mut() {
            *pixel = clear;
        }
    }

    pub fn add_shader(&mut self, shader: impl Into<Shader>) -> ShaderId {
        self.shaders.push(shader.into());
        let id = ShaderId(self.shaders.len() - 1);
        debug!("registered shader {id:?}");
        id
    }

    /// Select the program used by subsequent draws, or none
    pub fn set_shader(&mut self, shader: Option<ShaderId>) {
        self.active = shader;
    }

    pub fn shader(&self) -> Option<ShaderId> {
        self.active
    }

    pub fn shader_program(&self, id: ShaderId) -> Option<&Shader> {
        self.shaders.get(id.0)
    }

    pub fn shader_program_mut(&mut self, id: ShaderId) -> Option<&mut Shader> {
        self.shaders.get_mut(id.0)
    }

    pub fn active_shader_mut(&mut self) -> Option<&mut Shader> {
        let id = self.active?;
        self.shaders.get_mut(id.0)
    }

    pub fn set_clear_color(&mut self, color: Color) {
        self.config.clear_color = color;
    }

    /// Snapshot of the color buffer
    pub fn texture(&self) -> RgbaImage {
        self.pixels.clone()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn depth_buffer(&self) -> &DepthBuffer {
        &self.depth_buffer
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn width(&self) -> u32 {
        self.config.width
    }

    pub fn height(&self) -> u32 {
        self.config.height
    }

    /// Draw a triangle with the active shader.
    ///
    /// Returns the number of fragments that passed the depth test.
    pub fn render_triangle(
        &mut self,
        positions: &[Point3<f32>; 3],
        data: [&VertexData; 3],
    ) -> Result<usize, RenderError> {
        let Some(id) = self.active else {
            return Ok(0);
        };
        let Some(shader) = self.shaders.get(id.0) else {
            return Ok(0);
        };

        let mut target = Target {
            config: &self.config,
            pixels: &mut self.pixels,
            depth: &mut self.depth_buffer,
        };
        target.draw(shader, positions, data)
    }

    /// Draw a triangle with an explicit shader program, bypassing the registry
    pub fn render_triangle_with(
        &mut self,
        shader: &dyn ShaderProgram,
        positions: &[Point3<f32>; 3],
        data: [&VertexData; 3],
    ) -> Result<usize, RenderError> {
        let mut target = Target {
            config: &self.config,
            pixels: &mut self.pixels,
            depth: &mut self.depth_buffer,
        };
        target.draw(shader, positions, data)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::with_config(RendererConfig::default())
    }
}

/// Mutable view of the buffers for the duration of one draw
struct Target<'a> {
    config: &'a RendererConfig,
    pixels: &'a mut RgbaImage,
    depth: &'a mut DepthBuffer,
}

impl Target<'_> {
    fn draw(
        &mut self,
        shader: &dyn ShaderProgram,
        positions: &[Point3<f32>; 3],
        data: [&VertexData; 3],
    ) -> Result<usize, RenderError> {
        // Vertex stage
        let mut clip = [Vector4::zeros(); 3];
        let mut vertices = [*data[0], *data[1], *data[2]];
        for i in 0..3 {
            let (position, vertex) = shader.run_vertex_shader(&positions[i], data[i])?;
            clip[i] = position;
            vertices[i] = vertex;
        }

        // No clipping: a triangle is either fully kept or dropped
        let (near, far) = (self.config.near, self.config.far);
        if clip.iter().any(|v| v.z <= near || v.z >= far) {
            trace!("triangle rejected by depth range ({near}, {far})");
            return Ok(0);
        }

        // Perspective division
        for v in &mut clip {
            if v.w != 0.0 {
                v.x /= v.w;
                v.y /= v.w;
                v.z /= v.w;
            }
        }

        let bounds = triangle_bounds(&clip, self.config.width, self.config.height);
        self.fill(shader, &clip, &vertices, bounds)
    }

    fn fill(
        &mut self,
        shader: &dyn ShaderProgram,
        ndc: &[Vector4<f32>; 3],
        vertices: &[VertexData; 3],
        bounds: Bounds,
    ) -> Result<usize, RenderError> {
        let width = self.config.width as f32;
        let height = self.config.height as f32;
        let screen = [(ndc[0].x, ndc[0].y), (ndc[1].x, ndc[1].y), (ndc[2].x, ndc[2].y)];
        let mut written = 0;

        for x in bounds.min_x..=bounds.max_x {
            for y in bounds.min_y..=bounds.max_y {
                // Map the pixel back to [-1, 1]
                let ndc_x = x as f32 / width * 2.0 - 1.0;
                let ndc_y = y as f32 / height * 2.0 - 1.0;

                let Some(weights) = barycentric(screen[0], screen[1], screen[2], (ndc_x, ndc_y))
                else {
                    // Zero-area triangle covers nothing
                    return Ok(written);
                };
                if weights.iter().any(|w| *w < 0.0) {
                    continue;
                }

                let depth = weights.x * ndc[0].z + weights.y * ndc[1].z + weights.z * ndc[2].z;
                if depth.is_nan() || depth >= self.depth.get(x, y) {
                    continue;
                }

                let color = shader.run_fragment_shader(&weights, vertices)?;
                self.pixels.put_pixel(x as u32, y as u32, color.into());
                self.depth.set(x, y, depth);
                written += 1;
            }
        }

        Ok(written)
    }
}

/// Inclusive pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Bounds {
    min_x: usize,
    min_y: usize,
    max_x: usize,
    max_y: usize,
}

/// Screen rectangle enclosing a triangle given in NDC, clamped to the image.
///
/// The min/max accumulation starts from the NDC origin instead of the first vertex, so the
/// rectangle always reaches the image center. It stays a superset of the triangle; coverage
/// is decided per pixel by the barycentric test.
fn triangle_bounds(ndc: &[Vector4<f32>; 3], width: u32, height: u32) -> Bounds {
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (0.0f32, 0.0f32, 0.0f32, 0.0f32);
    for v in ndc {
        min_x = min_x.min(v.x);
        min_y = min_y.min(v.y);
        max_x = max_x.max(v.x);
        max_y = max_y.max(v.y);
    }

    let to_pixel = |value: f32, size: u32| -> usize {
        ((value + 1.0) * size as f32 / 2.0).clamp(0.0, (size - 1) as f32) as usize
    };

    Bounds {
        min_x: to_pixel(min_x, width),
        min_y: to_pixel(min_y, height),
        max_x: to_pixel(max_x, width),
        max_y: to_pixel(max_y, height),
    }
}

/// Calculate barycentric coordinates for a point in a triangle.
///
/// Returns `None` for a degenerate (zero-area) triangle.
pub fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<Vector3<f32>> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if !denom.is_finite() || denom == 0.0 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some(Vector3::new(w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShaderError;
    use crate::geometry::Mesh;
    use crate::shader::{DefaultShader, SimpleShader};
    use nalgebra::Matrix4;
    use std::cell::RefCell;

    fn triangle(z: f32) -> [Point3<f32>; 3] {
        [
            Point3::new(-0.5, -0.5, z),
            Point3::new(0.5, -0.5, z),
            Point3::new(0.0, 0.5, z),
        ]
    }

    fn positioned(color: Color) -> VertexData {
        VertexData::positioned(Vector3::z(), color, Point3::origin())
    }

    /// Records the barycentric weights of every fragment it shades
    #[derive(Default)]
    struct Recorder {
        fragments: RefCell<Vec<Vector3<f32>>>,
    }

    impl ShaderProgram for Recorder {
        fn run_fragment_shader(
            &self,
            barycentric: &Vector3<f32>,
            _vertices: &[VertexData; 3],
        ) -> Result<Color, ShaderError> {
            self.fragments.borrow_mut().push(*barycentric);
            Ok(Color::BLACK)
        }
    }

    /// Passes positions through with `w = 0`
    struct ZeroW;

    impl ShaderProgram for ZeroW {
        fn run_vertex_shader(
            &self,
            position: &Point3<f32>,
            data: &VertexData,
        ) -> Result<(Vector4<f32>, VertexData), ShaderError> {
            Ok((position.coords.push(0.0), *data))
        }
    }

    /// Unlit shader with identity matrices: clip position equals object position
    fn flat_renderer(size: u32) -> Renderer {
        let mut renderer = Renderer::new(size, size);
        let id = renderer.add_shader(SimpleShader::new(Matrix4::identity(), false));
        renderer.set_shader(Some(id));
        renderer
    }

    #[test]
    fn test_no_shader_is_a_no_op() {
        let mut renderer = Renderer::new(8, 8);
        let data = VertexData::new(Vector3::z(), Color::BLACK);
        let drawn = renderer.render_triangle(&triangle(0.5), [&data; 3]).unwrap();
        assert_eq!(drawn, 0);
        assert!(renderer.pixels().pixels().all(|p| Color::from(*p) == Color::WHITE));
    }

    #[test]
    fn test_fragments_have_valid_barycentrics() {
        let mut renderer = Renderer::new(20, 20);
        let recorder = Recorder::default();
        let data = VertexData::new(Vector3::z(), Color::WHITE);

        let drawn = renderer
            .render_triangle_with(&recorder, &triangle(0.5), [&data; 3])
            .unwrap();

        let fragments = recorder.fragments.borrow();
        assert!(drawn > 0);
        assert_eq!(drawn, fragments.len());
        for w in fragments.iter() {
            assert!(w.iter().all(|c| *c >= 0.0));
            assert!((w.sum() - 1.0).abs() < 1e-5);
        }
        assert_eq!(
            Color::from(*renderer.pixels().get_pixel(10, 10)),
            Color::BLACK
        );
    }

    #[test]
    fn test_second_identical_draw_writes_nothing() {
        let mut renderer = Renderer::new(20, 20);
        let id = renderer.add_shader(DefaultShader);
        renderer.set_shader(Some(id));
        renderer.set_clear_color(Color::BLACK);
        renderer.clear_buffers();
        let data = VertexData::new(Vector3::z(), Color::BLACK);

        let first = renderer.render_triangle(&triangle(0.5), [&data; 3]).unwrap();
        let image = renderer.texture();
        let depth = renderer.depth_buffer().as_slice().to_vec();

        let second = renderer.render_triangle(&triangle(0.5), [&data; 3]).unwrap();
        assert!(first > 0);
        assert_eq!(second, 0);
        assert_eq!(renderer.texture(), image);
        assert_eq!(renderer.depth_buffer().as_slice(), depth.as_slice());
    }

    #[test]
    fn test_nearest_fragment_wins() {
        let mut renderer = flat_renderer(20);
        let red = positioned(Color::rgb(255, 0, 0));
        let blue = positioned(Color::rgb(0, 0, 255));

        renderer.render_triangle(&triangle(0.8), [&red; 3]).unwrap();
        renderer.render_triangle(&triangle(0.4), [&blue; 3]).unwrap();
        renderer.render_triangle(&triangle(0.8), [&red; 3]).unwrap();

        assert_eq!(
            Color::from(*renderer.pixels().get_pixel(10, 10)),
            Color::rgb(0, 0, 255)
        );
        assert!((renderer.depth_buffer().get(10, 10) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_depth_range_rejects_whole_triangle() {
        let mut renderer = flat_renderer(20);
        let data = positioned(Color::BLACK);

        for z in [0.0, -1.0, 100.0, 150.0] {
            let drawn = renderer.render_triangle(&triangle(z), [&data; 3]).unwrap();
            assert_eq!(drawn, 0, "z = {z}");
        }

        // one vertex out of range is enough
        let mut straddling = triangle(0.5);
        straddling[2].z = 120.0;
        assert_eq!(renderer.render_triangle(&straddling, [&data; 3]).unwrap(), 0);
    }

    #[test]
    fn test_degenerate_triangle_covers_nothing() {
        let mut renderer = Renderer::new(20, 20);
        let recorder = Recorder::default();
        let data = VertexData::new(Vector3::z(), Color::WHITE);
        let line = [
            Point3::new(-0.5, -0.5, 0.5),
            Point3::new(0.0, 0.0, 0.5),
            Point3::new(0.5, 0.5, 0.5),
        ];

        let drawn = renderer.render_triangle_with(&recorder, &line, [&data; 3]).unwrap();
        assert_eq!(drawn, 0);
        assert!(recorder.fragments.borrow().is_empty());
    }

    #[test]
    fn test_zero_w_skips_division() {
        let data = VertexData::new(Vector3::z(), Color::WHITE);

        let mut divided = Renderer::new(20, 20);
        let expected = divided
            .render_triangle_with(&DefaultShader, &triangle(0.5), [&data; 3])
            .unwrap();

        let mut undivided = Renderer::new(20, 20);
        let drawn = undivided
            .render_triangle_with(&ZeroW, &triangle(0.5), [&data; 3])
            .unwrap();

        assert!(expected > 0);
        assert_eq!(drawn, expected);
    }

    #[test]
    fn test_missing_position_aborts_draw() {
        let mut renderer = flat_renderer(20);
        let plain = VertexData::new(Vector3::z(), Color::BLACK);

        let err = renderer.render_triangle(&triangle(0.5), [&plain; 3]).unwrap_err();
        assert!(matches!(err, RenderError::Shader(_)));
        assert!(renderer.depth_buffer().as_slice().iter().all(|d| *d == 1000.0));
    }

    #[test]
    fn test_clear_buffers() {
        let mut renderer = flat_renderer(10);
        let data = positioned(Color::BLACK);
        renderer.render_triangle(&triangle(0.5), [&data; 3]).unwrap();

        renderer.set_clear_color(Color::rgb(25, 25, 25));
        renderer.clear_buffers();
        assert!(renderer
            .pixels()
            .pixels()
            .all(|p| Color::from(*p) == Color::rgb(25, 25, 25)));
        assert!(renderer.depth_buffer().as_slice().iter().all(|d| *d == 1000.0));
    }

    #[test]
    fn test_mesh_render_sets_transform() {
        let mut renderer = flat_renderer(20);
        let mut mesh = Mesh::new(triangle(0.0).to_vec(), vec![positioned(Color::BLACK)]).unwrap();

        // at z = 0 the triangle sits on the near limit and is dropped
        assert_eq!(mesh.render(&mut renderer).unwrap(), 0);

        mesh.set_position(Vector3::new(0.0, 0.0, 0.5));
        assert!(mesh.render(&mut renderer).unwrap() > 0);
    }

    #[test]
    fn test_bounds_start_at_origin() {
        let ndc = [
            Vector4::new(0.2, 0.2, 0.5, 1.0),
            Vector4::new(0.6, 0.2, 0.5, 1.0),
            Vector4::new(0.4, 0.6, 0.5, 1.0),
        ];
        let bounds = triangle_bounds(&ndc, 10, 10);
        assert_eq!(
            bounds,
            Bounds {
                min_x: 5,
                min_y: 5,
                max_x: 8,
                max_y: 8
            }
        );
    }

    #[test]
    fn test_barycentric_corners() {
        let w = barycentric((0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 0.0)).unwrap();
        assert!((w - Vector3::new(0.0, 1.0, 0.0)).norm() < 1e-6);
        assert!(barycentric((0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (1.0, 0.0)).is_none());
    }

    #[test]
    fn test_barycentric_tiny_triangle() {
        let w = barycentric((0.0, 0.0), (1e-4, 0.0), (0.0, 1e-4), (0.0, 0.0)).unwrap();
        assert!((w - Vector3::new(1.0, 0.0, 0.0)).norm() < 1e-4);
    }
}
