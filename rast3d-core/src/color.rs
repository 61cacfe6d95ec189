/// 8-bit RGBA colors with saturating arithmetic
use nalgebra::Vector3;
use std::ops::{Add, AddAssign};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255, 255);
    pub const BLACK: Color = Color::new(0, 0, 0, 255);
    pub const TRANSPARENT: Color = Color::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from its three channels
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn gray(value: u8, alpha: u8) -> Self {
        Self::new(value, value, value, alpha)
    }

    /// Build a color from hue, saturation and brightness, all in the range [0, 255].
    ///
    /// A hue of 255 wraps around to red, like a hue of 0.
    pub fn from_hsb(hue: f32, saturation: f32, brightness: f32) -> Self {
        if brightness <= 0.0 {
            return Color::BLACK;
        }
        if saturation <= 0.0 {
            return Color::gray(channel(brightness), 255);
        }

        let hue_six = hue.clamp(0.0, 255.0) * 6.0 / 255.0;
        let sector = hue_six.floor();
        let remainder = hue_six - sector;
        let sat = (saturation / 255.0).min(1.0);

        let pv = (1.0 - sat) * brightness;
        let qv = (1.0 - sat * remainder) * brightness;
        let tv = (1.0 - sat * (1.0 - remainder)) * brightness;

        let (r, g, b) = match sector as u32 {
            1 => (qv, brightness, pv),
            2 => (pv, brightness, tv),
            3 => (pv, qv, brightness),
            4 => (tv, pv, brightness),
            5 => (brightness, pv, qv),
            _ => (brightness, tv, pv),
        };

        Color::rgb(channel(r), channel(g), channel(b))
    }

    /// Multiply the color channels by `factor`, keeping alpha
    pub fn scale(self, factor: f32) -> Self {
        Self {
            r: channel(self.r as f32 * factor),
            g: channel(self.g as f32 * factor),
            b: channel(self.b as f32 * factor),
            a: self.a,
        }
    }

    /// Tint the color channels by a normalized color, keeping alpha
    pub fn modulate(self, tint: &Vector3<f32>) -> Self {
        Self {
            r: channel(self.r as f32 * tint.x),
            g: channel(self.g as f32 * tint.y),
            b: channel(self.b as f32 * tint.z),
            a: self.a,
        }
    }

    /// Blend three colors (alpha included) with barycentric weights
    pub fn weighted_sum(colors: [Color; 3], weights: &Vector3<f32>) -> Self {
        let mut acc = [0.0f32; 4];
        for (color, weight) in colors.iter().zip(weights.iter()) {
            acc[0] += color.r as f32 * weight;
            acc[1] += color.g as f32 * weight;
            acc[2] += color.b as f32 * weight;
            acc[3] += color.a as f32 * weight;
        }
        Self::new(channel(acc[0]), channel(acc[1]), channel(acc[2]), channel(acc[3]))
    }

    pub fn opaque(self) -> Self {
        Self { a: 255, ..self }
    }

    /// Color channels mapped to [0, 1]
    pub fn to_normalized(self) -> Vector3<f32> {
        Vector3::new(self.r as f32, self.g as f32, self.b as f32) / 255.0
    }

    /// Perceived brightness in [0, 1]
    pub fn luminance(self) -> f32 {
        (0.2126 * self.r as f32 + 0.7152 * self.g as f32 + 0.0722 * self.b as f32) / 255.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

/// Saturating per-channel addition. The alpha of the left operand is kept.
impl Add for Color {
    type Output = Color;

    fn add(self, rhs: Color) -> Color {
        Color {
            r: self.r.saturating_add(rhs.r),
            g: self.g.saturating_add(rhs.g),
            b: self.b.saturating_add(rhs.b),
            a: self.a,
        }
    }
}

impl AddAssign for Color {
    fn add_assign(&mut self, rhs: Color) {
        *self = *self + rhs;
    }
}

impl From<Color> for image::Rgba<u8> {
    fn from(color: Color) -> Self {
        image::Rgba([color.r, color.g, color.b, color.a])
    }
}

impl From<image::Rgba<u8>> for Color {
    fn from(pixel: image::Rgba<u8>) -> Self {
        let [r, g, b, a] = pixel.0;
        Color::new(r, g, b, a)
    }
}

fn channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
