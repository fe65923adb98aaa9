//! Bitmap text for watermarks
//!
//! Glyphs come from the 8x8 public-domain font in `font8x8`, scaled by an
//! integer factor. Characters outside ASCII render as `?`.

use font8x8::legacy::BASIC_LEGACY;
use image::RgbaImage;

const GLYPH_SIZE: u32 = 8;

/// Pixel width of `text` at the given scale
pub fn text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * GLYPH_SIZE * scale
}

/// Pixel height of a line at the given scale
pub fn line_height(scale: u32) -> u32 {
    GLYPH_SIZE * scale
}

/// Alpha-blend `color` over a pixel
pub fn blend_pixel(pixel: &mut image::Rgba<u8>, color: [u8; 3], alpha: f32) {
    for (channel, value) in pixel.0.iter_mut().take(3).zip(color) {
        let mixed = f32::from(value) * alpha + f32::from(*channel) * (1.0 - alpha);
        *channel = mixed.round().clamp(0.0, 255.0) as u8;
    }
}

/// How a run of text is painted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub scale: u32,
    pub color: [u8; 3],
    pub alpha: f32,
    /// Overstrike each glyph one pixel to the right
    pub bold: bool,
}

impl TextStyle {
    pub fn new(scale: u32, color: [u8; 3]) -> Self {
        Self {
            scale,
            color,
            alpha: 1.0,
            bold: false,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }
}

/// Draw `text` with its top-left corner at (`x`, `y`)
///
/// Coordinates may fall outside the canvas; off-canvas pixels are skipped.
pub fn draw_text(canvas: &mut RgbaImage, x: i64, y: i64, text: &str, style: &TextStyle) {
    let advance = i64::from(GLYPH_SIZE * style.scale);
    for (index, ch) in text.chars().enumerate() {
        let glyph = glyph(ch);
        let origin_x = x + index as i64 * advance;
        draw_glyph(canvas, origin_x, y, &glyph, style);
        if style.bold {
            draw_glyph(canvas, origin_x + 1, y, &glyph, style);
        }
    }
}

fn glyph(ch: char) -> [u8; 8] {
    let code = ch as usize;
    if code < BASIC_LEGACY.len() {
        BASIC_LEGACY[code]
    } else {
        BASIC_LEGACY[usize::from(b'?')]
    }
}

fn draw_glyph(canvas: &mut RgbaImage, x: i64, y: i64, glyph: &[u8; 8], style: &TextStyle) {
    let (width, height) = (i64::from(canvas.width()), i64::from(canvas.height()));
    let scale = i64::from(style.scale);

    for (row, bits) in glyph.iter().enumerate() {
        for col in 0..8 {
            if bits & (1 << col) == 0 {
                continue;
            }
            for dy in 0..scale {
                for dx in 0..scale {
                    let px = x + col as i64 * scale + dx;
                    let py = y + row as i64 * scale + dy;
                    if px < 0 || py < 0 || px >= width || py >= height {
                        continue;
                    }
                    blend_pixel(
                        canvas.get_pixel_mut(px as u32, py as u32),
                        style.color,
                        style.alpha,
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_text_width_scales() {
        assert_eq!(text_width("Good", 1), 32);
        assert_eq!(text_width("Good", 2), 64);
        assert_eq!(text_width("", 2), 0);
        assert_eq!(line_height(2), 16);
    }

    #[test]
    fn test_blend_pixel() {
        let mut pixel = Rgba([200, 100, 0, 255]);
        blend_pixel(&mut pixel, [0, 0, 0], 0.5);
        assert_eq!(pixel, Rgba([100, 50, 0, 255]));

        let mut pixel = Rgba([10, 10, 10, 255]);
        blend_pixel(&mut pixel, [255, 255, 255], 1.0);
        assert_eq!(pixel, Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_draw_text_marks_pixels_inside_bounds() {
        let mut canvas = RgbaImage::from_pixel(40, 20, Rgba([0, 0, 0, 255]));
        draw_text(&mut canvas, 2, 2, "H", &TextStyle::new(2, [255, 255, 255]));

        let lit = canvas.pixels().filter(|p| p.0[0] == 255).count();
        assert!(lit > 0);
        // Nothing drawn past the single glyph cell
        for x in 18..40 {
            for y in 0..20 {
                assert_eq!(canvas.get_pixel(x, y).0[0], 0);
            }
        }
    }

    #[test]
    fn test_draw_text_clips_off_canvas() {
        let mut canvas = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        let style = TextStyle::new(3, [255, 0, 0]).bold();
        draw_text(&mut canvas, -20, -20, "Condition", &style);
        draw_text(&mut canvas, 100, 100, "é", &style);
    }
}
