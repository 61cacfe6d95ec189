/// The demo scene: an outlined cube and a rainbow pyramid lit by three small light cubes
use log::debug;
use nalgebra::{Matrix4, Vector3};
use rast3d_core::{
    primitives, Camera, Color, Light, Mesh, MeshId, OutlineShader, Perspective, RainbowShader,
    RenderError, Renderer, RendererConfig, Scene, ShaderId, ShaderProgram, SimpleShader,
};

const OUTLINE_COLOR: Color = Color::rgb(20, 20, 20);
const CLEAR_COLOR: Color = Color::gray(25, 255);

/// Registered programs, one per kind of object in the scene
#[derive(Debug, Clone, Copy)]
struct DemoShaders {
    unlit: ShaderId,
    lit: ShaderId,
    outline: ShaderId,
    rainbow: ShaderId,
}

impl DemoShaders {
    fn all(&self) -> [ShaderId; 4] {
        [self.unlit, self.lit, self.outline, self.rainbow]
    }
}

pub struct DemoScene {
    renderer: Renderer,
    scene: Scene,
    camera: Camera,
    shaders: DemoShaders,
    cube: MeshId,
    pyramid: MeshId,
    /// Markers drawn unlit at each light; the last one orbits the pyramid
    light_meshes: [MeshId; 3],
    model: Option<MeshId>,
    /// Rotation added by the user on top of the animation, in degrees
    cube_offset: Vector3<f32>,
}

impl DemoScene {
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        let mut renderer = Renderer::with_config(RendererConfig {
            width,
            height,
            clear_color: CLEAR_COLOR,
            ..RendererConfig::default()
        });
        let perspective = Perspective {
            aspect: renderer.width() as f32 / renderer.height() as f32,
            ..Perspective::default()
        }
        .matrix();

        let ones = Vector3::repeat(1.0);
        let warm = Color::rgb(255, 100, 10);
        let cold = Color::rgb(0, 150, 255);

        let mut scene = Scene::new();
        let cube = scene.add_mesh(primitives::cube(Vector3::zeros(), ones, Color::WHITE)?);
        let pyramid = scene.add_mesh(primitives::pyramid(
            Vector3::new(2.5, 0.0, 0.0),
            ones,
            Color::rgb(120, 50, 130),
        )?);
        let light_meshes = [
            scene.add_mesh(primitives::cube(
                Vector3::new(1.25, 0.5, 1.0),
                Vector3::repeat(0.2),
                warm,
            )?),
            scene.add_mesh(primitives::cube(
                Vector3::new(1.25, -0.5, -1.0),
                Vector3::repeat(0.2),
                cold,
            )?),
            scene.add_mesh(primitives::cube(
                Vector3::zeros(),
                Vector3::repeat(0.15),
                Color::WHITE,
            )?),
        ];

        let lights = [
            scene.add_light(Light::new(light_meshes[0], 2.0, warm)),
            scene.add_light(Light::new(light_meshes[1], 2.0, cold)),
            scene.add_light(Light::new(light_meshes[2], 0.5, Color::WHITE)),
        ];

        let mut lit = SimpleShader::new(perspective, true);
        let mut outline = OutlineShader::new(perspective, true, OUTLINE_COLOR);
        let mut rainbow = RainbowShader::new(perspective, true);
        for light in lights {
            lit.add_light(light);
            outline.base_mut().add_light(light);
            rainbow.base_mut().add_light(light);
        }
        outline.set_uniform_f32("minThickness", 0.2);
        outline.set_uniform_f32("maxThickness", 0.4);
        rainbow.set_uniform_f32("frequency", 300.0);

        let shaders = DemoShaders {
            unlit: renderer.add_shader(SimpleShader::new(perspective, false)),
            lit: renderer.add_shader(lit),
            outline: renderer.add_shader(outline),
            rainbow: renderer.add_shader(rainbow),
        };

        debug!(
            "demo scene ready: {} meshes, {} lights",
            scene.mesh_count(),
            scene.light_count()
        );

        Ok(Self {
            renderer,
            scene,
            camera: Camera::default(),
            shaders,
            cube,
            pyramid,
            light_meshes,
            model: None,
            cube_offset: Vector3::zeros(),
        })
    }

    /// Add a model to the left of the cube, scaled to fit a unit box and lit like the rest
    pub fn with_model(mut self, mut mesh: Mesh) -> Self {
        let extent = mesh
            .vertices()
            .iter()
            .map(|v| v.coords.amax())
            .fold(0.0f32, f32::max);
        if extent > 0.0 {
            mesh.set_scale(Vector3::repeat(0.5 / extent));
        }
        mesh.set_position(Vector3::new(-2.5, 0.0, 0.0));

        self.model = Some(self.scene.add_mesh(mesh));
        self
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Rotate the cube by `delta` degrees on top of its animation
    pub fn rotate_cube(&mut self, delta: Vector3<f32>) {
        self.cube_offset += delta;
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Animate the meshes and feed the per-frame uniforms for scene time `time` (seconds)
    pub fn update(&mut self, time: f32) {
        if let Some(cube) = self.scene.mesh_mut(self.cube) {
            cube.set_rotation(Vector3::new(time, 0.0, time) * 30.0 + self.cube_offset);
        }

        let mut pyramid_position = Vector3::zeros();
        if let Some(pyramid) = self.scene.mesh_mut(self.pyramid) {
            pyramid.set_rotation(Vector3::new(0.0, 0.0, time * 20.0));
            pyramid_position = pyramid.position();
        }

        if let Some(orbit) = self.scene.mesh_mut(self.light_meshes[2]) {
            orbit.set_position(pyramid_position + Vector3::new(0.0, (-time).sin(), (-time).cos()));
        }

        let view = self.camera.matrix();
        self.upload_uniforms(&view, time);
    }

    fn upload_uniforms(&mut self, view: &Matrix4<f32>, time: f32) {
        let sin_time = time.sin();

        for id in self.shaders.all() {
            let Some(shader) = self.renderer.shader_program_mut(id) else {
                continue;
            };
            shader.set_uniform_mat4("view", view);
            shader.set_uniform_f32("sinTime", sin_time);
            shader.set_uniform_f32("time", time * 50.0);
            self.scene.upload_lights(shader);
        }
    }

    /// Clear the buffers and draw one frame, returning the number of fragments written
    pub fn draw(&mut self) -> Result<usize, RenderError> {
        self.renderer.clear_buffers();
        let mut fragments = 0;

        self.renderer.set_shader(Some(self.shaders.unlit));
        for id in self.light_meshes {
            fragments += self.scene.render_mesh(id, &mut self.renderer)?;
        }

        self.renderer.set_shader(Some(self.shaders.outline));
        fragments += self.scene.render_mesh(self.cube, &mut self.renderer)?;

        self.renderer.set_shader(Some(self.shaders.rainbow));
        fragments += self.scene.render_mesh(self.pyramid, &mut self.renderer)?;

        if let Some(model) = self.model {
            self.renderer.set_shader(Some(self.shaders.lit));
            fragments += self.scene.render_mesh(model, &mut self.renderer)?;
        }

        self.renderer.set_shader(None);
        Ok(fragments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_draws_on_clear_background() {
        let mut demo = DemoScene::new(64, 64).unwrap();
        demo.update(0.0);
        let fragments = demo.draw().unwrap();
        assert!(fragments > 0);

        let image = demo.renderer().texture();
        let background = image
            .pixels()
            .filter(|p| Color::from(**p) == CLEAR_COLOR)
            .count();
        assert!(background > 0);
        assert!(background < (64 * 64) as usize);
    }

    #[test]
    fn test_orbiting_light_follows_time() {
        let mut demo = DemoScene::new(16, 16).unwrap();
        let quarter = std::f32::consts::FRAC_PI_2;
        demo.update(quarter);

        let orbit = demo.scene().mesh(demo.light_meshes[2]).unwrap().position();
        assert!((orbit - Vector3::new(2.5, -1.0, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn test_model_is_drawn_with_lit_shader() {
        let triangle = Mesh::new(
            vec![
                nalgebra::Point3::new(-10.0, -10.0, 0.0),
                nalgebra::Point3::new(10.0, -10.0, 0.0),
                nalgebra::Point3::new(0.0, 10.0, 0.0),
            ],
            vec![rast3d_core::VertexData::positioned(
                Vector3::z(),
                Color::WHITE,
                nalgebra::Point3::origin(),
            )],
        )
        .unwrap();

        let mut demo = DemoScene::new(16, 16).unwrap().with_model(triangle);
        let model = demo.model.unwrap();
        assert_eq!(demo.scene().mesh(model).unwrap().scale(), Vector3::repeat(0.05));

        demo.update(0.0);
        assert!(demo.draw().is_ok());
        assert_eq!(demo.renderer().shader(), None);
    }
}
