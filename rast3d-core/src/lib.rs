//! rast3d core library - a CPU triangle rasterizer
//!
//! Meshes are pushed through a programmable vertex and fragment stage into an RGBA color
//! buffer guarded by a depth buffer. Nothing here touches a GPU or a window; presenting the
//! image is left to the caller.

pub mod color;
pub mod depth;
pub mod error;
pub mod geometry;
pub mod light;
pub mod primitives;
pub mod projection;
pub mod renderer;
pub mod scene;
pub mod shader;
pub mod stl;
pub mod transform;

// Re-export commonly used types
pub use color::Color;
pub use depth::DepthBuffer;
pub use error::{RenderError, ShaderError, Stage, StlError};
pub use geometry::{Mesh, VertexData, VertexPosition};
pub use light::Light;
pub use projection::{Camera, CameraAxis, CameraDir, Perspective};
pub use renderer::{Renderer, RendererConfig, ShaderId};
pub use scene::{LightId, MeshId, Scene};
pub use shader::{
    DefaultShader, LightSource, OutlineShader, RainbowShader, Shader, ShaderProgram, SimpleShader,
};
pub use transform::{RotationState, Transform};
