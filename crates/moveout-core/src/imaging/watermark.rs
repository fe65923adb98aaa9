//! Evidence watermark
//!
//! A translucent band along the bottom edge carrying the capture time, the
//! color-coded condition and the brand label.

use image::RgbaImage;

use super::text::{blend_pixel, draw_text, line_height, text_width, TextStyle};
use crate::models::Condition;

/// Height of the watermark band in pixels
pub const BAND_HEIGHT: u32 = 60;

/// Horizontal inset of the band text
pub const PADDING: u32 = 20;

const BAND_ALPHA: f32 = 0.7;
const TEXT_SCALE: u32 = 2;
const WHITE: [u8; 3] = [255, 255, 255];

/// Baseline offsets from the top of the band
const TIMESTAMP_BASELINE: i64 = 25;
const CONDITION_BASELINE: i64 = 45;

/// Paint the watermark band onto `canvas`
pub fn apply_watermark(canvas: &mut RgbaImage, condition: Condition, timestamp: &str, brand: &str) {
    let width = canvas.width();
    let band_top = canvas.height().saturating_sub(BAND_HEIGHT);

    for y in band_top..canvas.height() {
        for x in 0..width {
            blend_pixel(canvas.get_pixel_mut(x, y), [0, 0, 0], BAND_ALPHA);
        }
    }

    let band_top = i64::from(band_top);
    let glyph_height = i64::from(line_height(TEXT_SCALE));
    let left = i64::from(PADDING);

    draw_text(
        canvas,
        left,
        band_top + TIMESTAMP_BASELINE - glyph_height,
        timestamp,
        &TextStyle::new(TEXT_SCALE, WHITE),
    );

    draw_text(
        canvas,
        left,
        band_top + CONDITION_BASELINE - glyph_height,
        &condition_label(condition),
        &TextStyle::new(TEXT_SCALE, condition.color()).bold(),
    );

    // Right-aligned on the timestamp line
    let brand_x = i64::from(width) - i64::from(PADDING) - i64::from(text_width(brand, TEXT_SCALE));
    draw_text(
        canvas,
        brand_x,
        band_top + TIMESTAMP_BASELINE - glyph_height,
        brand,
        &TextStyle::new(TEXT_SCALE, WHITE).with_alpha(0.8),
    );
}

/// `Condition: DAMAGED`
pub fn condition_label(condition: Condition) -> String {
    format!("Condition: {}", condition.label())
}
