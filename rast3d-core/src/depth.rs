//! Per-pixel depth storage for visibility testing

/// Row-major grid of depth values, one per pixel.
///
/// `get` and `set` do no bounds checking of their own beyond debug assertions: callers
/// (the [`Renderer`](crate::Renderer)) only ever pass coordinates clamped to the grid.
#[derive(Debug, Clone)]
pub struct DepthBuffer {
    width: usize,
    height: usize,
    buffer: Vec<f32>,
}

impl DepthBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            buffer: vec![f32::INFINITY; width * height],
        }
    }

    pub fn clear(&mut self, value: f32) {
        self.buffer.fill(value);
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        debug_assert!(x < self.width && y < self.height);
        self.buffer[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f32) {
        debug_assert!(x < self.width && y < self.height);
        self.buffer[y * self.width + x] = value;
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.buffer
    }
}
