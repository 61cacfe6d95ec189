/// ASCII presenter for rendered frames
use crossterm::{
    cursor,
    style::{Color as TermColor, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use image::RgbaImage;
use rast3d_core::Color;
use std::io::Write;

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Draws an image into a grid of terminal cells.
///
/// Each cell samples the nearest pixel, picks a ramp character from its luminance and is
/// tinted with the pixel's true color.
pub struct AsciiRenderer {
    columns: u16,
    rows: u16,
}

impl AsciiRenderer {
    pub fn new(columns: u16, rows: u16) -> Self {
        Self { columns, rows }
    }

    pub fn resize(&mut self, columns: u16, rows: u16) {
        self.columns = columns;
        self.rows = rows;
    }

    pub fn size(&self) -> (u16, u16) {
        (self.columns, self.rows)
    }

    /// Character and tint of the cell at (`column`, `row`)
    pub fn cell(&self, image: &RgbaImage, column: u16, row: u16) -> (char, TermColor) {
        let x = (column as u64 * image.width() as u64 / self.columns.max(1) as u64) as u32;
        let y = (row as u64 * image.height() as u64 / self.rows.max(1) as u64) as u32;
        let pixel = Color::from(
            *image.get_pixel(
                x.min(image.width().saturating_sub(1)),
                y.min(image.height().saturating_sub(1)),
            ),
        );

        (
            ramp_char(pixel.luminance()),
            TermColor::Rgb {
                r: pixel.r,
                g: pixel.g,
                b: pixel.b,
            },
        )
    }

    pub fn draw<W: Write>(&self, image: &RgbaImage, writer: &mut W) -> std::io::Result<()> {
        if image.width() == 0 || image.height() == 0 {
            return Ok(());
        }

        for row in 0..self.rows {
            writer.queue(cursor::MoveTo(0, row))?;
            let mut current = None;

            for column in 0..self.columns {
                let (character, color) = self.cell(image, column, row);
                if current != Some(color) {
                    writer.queue(SetForegroundColor(color))?;
                    current = Some(color);
                }
                writer.queue(Print(character))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Ramp character for a luminance in [0, 1]
fn ramp_char(luminance: f32) -> char {
    let index = (luminance.clamp(0.0, 1.0) * LUMINOSITY_RAMP.len() as f32) as usize;
    LUMINOSITY_RAMP[index.min(LUMINOSITY_RAMP.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_ends() {
        assert_eq!(ramp_char(0.0), ' ');
        assert_eq!(ramp_char(1.0), '@');
        assert_eq!(ramp_char(2.0), '@');
        // the dark demo background stays blank
        assert_eq!(ramp_char(Color::gray(25, 255).luminance()), ' ');
    }

    #[test]
    fn test_cells_sample_nearest_pixel() {
        let mut image = RgbaImage::from_pixel(4, 4, Color::BLACK.into());
        image.put_pixel(2, 2, Color::WHITE.into());

        let presenter = AsciiRenderer::new(2, 2);
        let (character, color) = presenter.cell(&image, 1, 1);
        assert_eq!(character, '@');
        assert_eq!(color, TermColor::Rgb { r: 255, g: 255, b: 255 });
        assert_eq!(presenter.cell(&image, 0, 0).0, ' ');
    }

    #[test]
    fn test_draw_writes_every_cell() {
        let image = RgbaImage::from_pixel(8, 8, Color::WHITE.into());
        let presenter = AsciiRenderer::new(3, 2);
        let mut out = Vec::new();
        presenter.draw(&image, &mut out).unwrap();

        let text = String::from_utf8_lossy(&out);
        assert_eq!(text.matches('@').count(), 6);
    }
}
