/// Scene registry owning meshes and lights
use log::{debug, warn};
use nalgebra::Vector3;

use crate::error::RenderError;
use crate::geometry::Mesh;
use crate::light::Light;
use crate::renderer::Renderer;
use crate::shader::{LightSource, ShaderProgram};

/// Stable handle to a mesh owned by a [`Scene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(pub(crate) usize);

/// Stable handle to a light owned by a [`Scene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LightId(pub(crate) usize);

/// Owner of every mesh and light of a frame.
///
/// Meshes and lights are never removed, so handles handed out by `add_*` stay valid for the
/// lifetime of the scene.
#[derive(Debug, Default)]
pub struct Scene {
    meshes: Vec<Mesh>,
    lights: Vec<Light>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshId {
        self.meshes.push(mesh);
        MeshId(self.meshes.len() - 1)
    }

    pub fn mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(id.0)
    }

    pub fn mesh_mut(&mut self, id: MeshId) -> Option<&mut Mesh> {
        self.meshes.get_mut(id.0)
    }

    pub fn add_light(&mut self, light: Light) -> LightId {
        debug!("light {} attached to mesh {:?}", self.lights.len(), light.mesh());
        self.lights.push(light);
        LightId(self.lights.len() - 1)
    }

    pub fn light(&self, id: LightId) -> Option<&Light> {
        self.lights.get(id.0)
    }

    pub fn light_mut(&mut self, id: LightId) -> Option<&mut Light> {
        self.lights.get_mut(id.0)
    }

    /// Current world position, color and intensity of a light
    pub fn light_source(&self, id: LightId) -> Option<LightSource> {
        let light = self.light(id)?;
        let mesh = self.mesh(light.mesh())?;

        Some(LightSource {
            position: mesh.position(),
            color: light.color().to_normalized(),
            intensity: light.intensity(),
        })
    }

    /// Upload the lights a shader registered through its light uniforms.
    ///
    /// Handles that do not resolve upload a dark, zero-intensity light so every array stays
    /// aligned with the shader's registered lights.
    pub fn upload_lights(&self, shader: &mut dyn ShaderProgram) {
        let mut positions = Vec::new();
        let mut colors = Vec::new();
        let mut intensities = Vec::new();

        for id in shader.lights() {
            match self.light_source(*id) {
                Some(source) => {
                    positions.push(source.position);
                    colors.push(source.color);
                    intensities.push(source.intensity);
                }
                None => {
                    warn!("shader references unknown light {id:?}");
                    positions.push(Vector3::zeros());
                    colors.push(Vector3::zeros());
                    intensities.push(0.0);
                }
            }
        }

        shader.set_uniform_vec3_array("lightPositions", &positions);
        shader.set_uniform_vec3_array("lightColors", &colors);
        shader.set_uniform_f32_array("lightIntensities", &intensities);
    }

    /// Draw one mesh with the renderer's active shader
    pub fn render_mesh(&mut self, id: MeshId, renderer: &mut Renderer) -> Result<usize, RenderError> {
        self.meshes
            .get_mut(id.0)
            .ok_or(RenderError::UnknownMesh(id.0))?
            .render(renderer)
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn light_count(&self) -> usize {
        self.lights.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::geometry::VertexData;
    use crate::shader::SimpleShader;
    use nalgebra::{Matrix4, Point3, Vector3};

    fn marker() -> Mesh {
        let data = VertexData::positioned(Vector3::y(), Color::WHITE, Point3::origin());
        Mesh::new(vec![Point3::origin(); 3], vec![data]).unwrap()
    }

    #[test]
    fn test_light_follows_mesh() {
        let mut scene = Scene::new();
        let mesh = scene.add_mesh(marker());
        let light = scene.add_light(Light::new(mesh, 2.0, Color::rgb(255, 0, 0)));

        scene
            .mesh_mut(mesh)
            .unwrap()
            .set_position(Vector3::new(1.0, 2.0, 3.0));

        let source = scene.light_source(light).unwrap();
        assert_eq!(source.position, Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(source.color, Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(source.intensity, 2.0);
    }

    #[test]
    fn test_upload_only_registered_lights() {
        let mut scene = Scene::new();
        let a = scene.add_mesh(marker());
        let b = scene.add_mesh(marker());
        scene.mesh_mut(b).unwrap().set_position(Vector3::new(0.0, 5.0, 0.0));
        let _first = scene.add_light(Light::new(a, 1.0, Color::WHITE));
        let second = scene.add_light(Light::new(b, 0.5, Color::WHITE));

        let mut shader = SimpleShader::new(Matrix4::identity(), true);
        shader.add_light(second);
        shader.add_light(LightId(42));
        scene.upload_lights(&mut shader);

        let sources: Vec<_> = shader.light_sources().collect();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].0, second);
        assert_eq!(sources[0].1.position, Vector3::new(0.0, 5.0, 0.0));
        assert_eq!(sources[0].1.intensity, 0.5);
        // unresolved handles keep their slot but add no light
        assert_eq!(sources[1].0, LightId(42));
        assert_eq!(sources[1].1.intensity, 0.0);
    }

    #[test]
    fn test_unknown_mesh_handle() {
        let mut scene = Scene::new();
        let mut renderer = Renderer::new(4, 4);
        let err = scene.render_mesh(MeshId(3), &mut renderer).unwrap_err();
        assert!(matches!(err, RenderError::UnknownMesh(3)));
    }
}
