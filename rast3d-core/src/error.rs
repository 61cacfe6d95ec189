/// Error types shared by the rendering pipeline
use thiserror::Error;

/// Pipeline stage that rejected its input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Vertex,
    Fragment,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Vertex => f.write_str("vertex"),
            Stage::Fragment => f.write_str("fragment"),
        }
    }
}

/// A shader received vertex data it cannot work with.
///
/// These are contract violations, not recoverable conditions: the triangle being drawn is
/// abandoned and the error travels up to whoever asked for the draw.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShaderError {
    #[error("{stage} stage requires position-aware vertex data")]
    MissingPosition { stage: Stage },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Shader(#[from] ShaderError),

    #[error("mesh vertex count {0} is not a multiple of 3")]
    VertexCount(usize),

    #[error("mesh needs at least one vertex data record")]
    NoVertexData,

    #[error("unknown mesh handle {0}")]
    UnknownMesh(usize),
}

#[derive(Debug, Error)]
pub enum StlError {
    #[error("file too small to be a valid STL ({0} bytes)")]
    TooSmall(usize),

    #[error("unexpected end of file in facet {0}")]
    Truncated(usize),

    #[error("failed to parse ASCII STL: {0}")]
    Ascii(String),

    #[error(transparent)]
    Mesh(#[from] RenderError),
}
