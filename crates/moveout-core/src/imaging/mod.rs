//! Photo processing
//!
//! Turns a raw upload into stored evidence: scale down to fit the caps,
//! stamp the watermark band, encode as JPEG and cut a square thumbnail.
//!
//! Processing is CPU-bound; async callers should run it on a blocking
//! thread (`tokio::task::spawn_blocking`).

pub mod text;
pub mod watermark;

use std::io::Cursor;

use chrono::{DateTime, Local, Utc};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::metadata::Orientation;
use image::{
    DynamicImage, ExtendedColorType, GenericImageView, ImageDecoder, ImageFormat, ImageReader,
    RgbImage,
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{Config, DEFAULT_BRAND_LABEL};
use crate::models::Condition;

pub use watermark::apply_watermark;

/// Largest surface the processor will allocate (16384 x 16384)
pub const MAX_SURFACE_PIXELS: u64 = 16_384 * 16_384;

/// Errors from the image pipeline
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Cannot allocate a {width}x{height} render surface")]
    RenderSurfaceUnavailable { width: u32, height: u32 },

    #[error("Failed to encode JPEG: {0}")]
    Encode(#[source] image::ImageError),
}

/// Tunables for [`process_photo`]
#[derive(Debug, Clone, PartialEq)]
pub struct ImageOptions {
    pub max_width: u32,
    pub max_height: u32,
    /// JPEG quality, 1-100
    pub quality: u8,
    pub thumbnail_size: u32,
    pub thumbnail_quality: u8,
    pub brand_label: String,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            max_width: 1920,
            max_height: 1080,
            quality: 80,
            thumbnail_size: 150,
            thumbnail_quality: 70,
            brand_label: DEFAULT_BRAND_LABEL.to_string(),
        }
    }
}

impl ImageOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            brand_label: config.brand_label.clone(),
            ..Self::default()
        }
    }
}

/// Output of the pipeline
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    /// Watermarked JPEG
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub original_size: u64,
    pub compressed_size: u64,
    /// Square JPEG preview; absent when thumbnail generation failed
    pub thumbnail: Option<Vec<u8>>,
}

/// Scale `width` x `height` down to fit the caps, preserving aspect ratio
///
/// The width cap is applied first, then the height cap against the
/// already-reduced size. Results are rounded to the nearest pixel.
pub fn target_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    let (mut w, mut h) = (f64::from(width), f64::from(height));

    if w > f64::from(max_width) {
        h = h * f64::from(max_width) / w;
        w = f64::from(max_width);
    }

    if h > f64::from(max_height) {
        w = w * f64::from(max_height) / h;
        h = f64::from(max_height);
    }

    (w.round() as u32, h.round() as u32)
}

/// A decoded image plus what the container said about it
pub struct SourceImage {
    /// Pixels, already turned upright
    pub image: DynamicImage,
    pub format: Option<ImageFormat>,
    /// Colour model of the encoded data, before any conversion on decode
    pub original_color: ExtendedColorType,
    pub orientation: Orientation,
}

/// Decode bytes of any supported format, applying the EXIF orientation
pub fn decode_source(input: &[u8]) -> Result<SourceImage, ImageError> {
    let reader = ImageReader::new(Cursor::new(input))
        .with_guessed_format()
        .map_err(|e| ImageError::Decode(image::ImageError::IoError(e)))?;
    let format = reader.format();
    let mut decoder = reader.into_decoder().map_err(ImageError::Decode)?;
    let original_color = decoder.original_color_type();
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);

    let mut image = DynamicImage::from_decoder(decoder).map_err(ImageError::Decode)?;
    if orientation != Orientation::NoTransforms {
        debug!(?orientation, "Applying EXIF orientation");
        image.apply_orientation(orientation);
    }
    Ok(SourceImage {
        image,
        format,
        original_color,
        orientation,
    })
}

/// Decode an upload and turn it upright according to its EXIF orientation
pub fn decode_upright(input: &[u8]) -> Result<DynamicImage, ImageError> {
    Ok(decode_source(input)?.image)
}

/// Resize, watermark and compress a photo
///
/// The source is rotated upright before the size caps apply. `taken_at`
/// is rendered in local time on the watermark.
pub fn process_photo(
    input: &[u8],
    condition: Condition,
    taken_at: DateTime<Utc>,
    options: &ImageOptions,
) -> Result<ProcessedImage, ImageError> {
    let source = decode_upright(input)?;
    let (src_w, src_h) = source.dimensions();
    let (width, height) = target_dimensions(src_w, src_h, options.max_width, options.max_height);

    if width == 0 || height == 0 || u64::from(width) * u64::from(height) > MAX_SURFACE_PIXELS {
        return Err(ImageError::RenderSurfaceUnavailable { width, height });
    }

    debug!(src_w, src_h, width, height, "Processing photo");

    let mut canvas = if (width, height) == (src_w, src_h) {
        source.to_rgba8()
    } else {
        source
            .resize_exact(width, height, FilterType::Triangle)
            .to_rgba8()
    };

    let timestamp = taken_at
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();
    apply_watermark(&mut canvas, condition, &timestamp, &options.brand_label);

    let rgb = DynamicImage::ImageRgba8(canvas).to_rgb8();
    let bytes = encode_jpeg(&rgb, options.quality)?;

    let thumbnail = match make_thumbnail(&rgb, options) {
        Ok(thumb) => Some(thumb),
        Err(e) => {
            warn!("Thumbnail generation failed, continuing without: {}", e);
            None
        }
    };

    Ok(ProcessedImage {
        compressed_size: bytes.len() as u64,
        original_size: input.len() as u64,
        bytes,
        width,
        height,
        thumbnail,
    })
}

/// Center-crop to the shorter side, then scale to a square
fn make_thumbnail(rgb: &RgbImage, options: &ImageOptions) -> Result<Vec<u8>, ImageError> {
    let size = options.thumbnail_size;
    if size == 0 {
        return Err(ImageError::RenderSurfaceUnavailable {
            width: 0,
            height: 0,
        });
    }

    let side = rgb.width().min(rgb.height());
    let x = (rgb.width() - side) / 2;
    let y = (rgb.height() - side) / 2;

    let square = imageops::crop_imm(rgb, x, y, side, side).to_image();
    let thumb = imageops::resize(&square, size, size, FilterType::Triangle);
    encode_jpeg(&thumb, options.thumbnail_quality)
}

pub(crate) fn encode_jpeg(rgb: &RgbImage, quality: u8) -> Result<Vec<u8>, ImageError> {
    let mut buf = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100))
        .encode_image(rgb)
        .map_err(ImageError::Encode)?;
    Ok(buf.into_inner())
}


#[cfg(test)]
mod tests {
    use super::fixtures::jpeg_with_orientation;
    use super::*;
    use image::Rgb;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([120, 180, 90]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_target_dimensions_landscape() {
        // Width cap gives 1920x1440, height cap then gives 1440x1080
        assert_eq!(target_dimensions(4000, 3000, 1920, 1080), (1440, 1080));
    }

    #[test]
    fn test_target_dimensions_preserve_aspect_ratio() {
        let cases = [(4000, 3000), (3000, 4000), (1920, 1080), (5000, 1000), (800, 600)];
        for (w, h) in cases {
            let (tw, th) = target_dimensions(w, h, 1920, 1080);
            assert!(tw <= 1920 && th <= 1080, "{w}x{h} -> {tw}x{th}");
            let before = f64::from(w) / f64::from(h);
            let after = f64::from(tw) / f64::from(th);
            assert!((before - after).abs() < 0.01, "{w}x{h} -> {tw}x{th}");
        }
    }

    #[test]
    fn test_small_images_are_not_upscaled() {
        assert_eq!(target_dimensions(640, 480, 1920, 1080), (640, 480));
    }

    #[test]
    fn test_process_photo_outputs_jpeg_and_thumbnail() {
        let input = png(400, 300);
        let processed = process_photo(
            &input,
            Condition::Fair,
            Utc::now(),
            &ImageOptions {
                max_width: 200,
                max_height: 200,
                ..ImageOptions::default()
            },
        )
        .unwrap();

        assert_eq!((processed.width, processed.height), (200, 150));
        assert_eq!(processed.original_size, input.len() as u64);
        assert_eq!(processed.compressed_size, processed.bytes.len() as u64);
        assert_eq!(&processed.bytes[..2], &[0xFF, 0xD8]);

        let decoded = image::load_from_memory(&processed.bytes).unwrap();
        assert_eq!(decoded.dimensions(), (200, 150));

        let thumb = image::load_from_memory(processed.thumbnail.as_ref().unwrap()).unwrap();
        assert_eq!(thumb.dimensions(), (150, 150));
    }

    #[test]
    fn test_exif_rotation_is_applied_before_sizing() {
        let input = jpeg_with_orientation(400, 300, 6);

        let upright = decode_upright(&input).unwrap();
        assert_eq!(upright.dimensions(), (300, 400));

        let processed =
            process_photo(&input, Condition::Good, Utc::now(), &ImageOptions::default()).unwrap();
        assert_eq!((processed.width, processed.height), (300, 400));
        let decoded = image::load_from_memory(&processed.bytes).unwrap();
        assert_eq!(decoded.dimensions(), (300, 400));
    }

    #[test]
    fn test_portrait_photo_is_capped_on_upright_size() {
        // Stored landscape, displayed portrait: the 1080 height cap binds
        let input = jpeg_with_orientation(2400, 1800, 6);
        let processed =
            process_photo(&input, Condition::Good, Utc::now(), &ImageOptions::default()).unwrap();
        assert_eq!((processed.width, processed.height), (810, 1080));
    }

    #[test]
    fn test_garbage_input_is_decode_error() {
        let err = process_photo(
            b"definitely not an image",
            Condition::Good,
            Utc::now(),
            &ImageOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ImageError::Decode(_)));
    }

    #[test]
    fn test_degenerate_target_is_render_surface_error() {
        // 1 px wide and very tall rounds to zero width
        let err = process_photo(&png(1, 3000), Condition::Good, Utc::now(), &ImageOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ImageError::RenderSurfaceUnavailable { width: 0, .. }
        ));
    }

    #[test]
    fn test_thumbnail_failure_is_not_fatal() {
        let processed = process_photo(
            &png(100, 80),
            Condition::Damaged,
            Utc::now(),
            &ImageOptions {
                thumbnail_size: 0,
                ..ImageOptions::default()
            },
        )
        .unwrap();
        assert!(processed.thumbnail.is_none());
        assert!(!processed.bytes.is_empty());
    }
}
