//! PDF serialization of a [`ReportLayout`]
//!
//! Uses the standard Helvetica faces (no embedded fonts) with
//! WinAnsiEncoding; characters outside Latin-1 are written as `?`.
//! Photos are embedded as DCTDecode image XObjects.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use super::layout::{Font, Op, ReportLayout, PAGE_HEIGHT, PAGE_WIDTH};
use super::ReportError;

const PDF_VERSION: &str = "1.5";
const LINE_WIDTH_PT: f32 = 0.57;

fn mm_to_pt(mm: f32) -> f32 {
    mm * 72.0 / 25.4
}

/// Flip a top-down millimetre y into PDF user space
fn y_pt(mm_from_top: f32) -> f32 {
    mm_to_pt(PAGE_HEIGHT - mm_from_top)
}

fn font_resource(font: Font) -> &'static str {
    match font {
        Font::Regular => "F1",
        Font::Bold => "F2",
    }
}

fn image_resource(index: usize) -> String {
    format!("Im{}", index + 1)
}

fn latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| u8::try_from(u32::from(ch)).unwrap_or(b'?'))
        .collect()
}

fn rgb(color: [u8; 3]) -> Vec<Object> {
    color
        .iter()
        .map(|&c| Object::Real(f32::from(c) / 255.0))
        .collect()
}

fn reals<const N: usize>(values: [f32; N]) -> Vec<Object> {
    values.into_iter().map(Object::Real).collect()
}

fn page_operations(ops: &[Op]) -> Vec<Operation> {
    let mut out = vec![Operation::new("w", vec![Object::Real(LINE_WIDTH_PT)])];

    for op in ops {
        match op {
            Op::Text {
                x,
                y,
                text,
                size,
                font,
                color,
            } => {
                out.push(Operation::new("BT", vec![]));
                out.push(Operation::new("rg", rgb(*color)));
                out.push(Operation::new(
                    "Tf",
                    vec![Object::Name(font_resource(*font).into()), Object::Real(*size)],
                ));
                out.push(Operation::new("Td", reals([mm_to_pt(*x), y_pt(*y)])));
                out.push(Operation::new(
                    "Tj",
                    vec![Object::String(latin1(text), StringFormat::Literal)],
                ));
                out.push(Operation::new("ET", vec![]));
            }
            Op::Line { from, to, color } => {
                out.push(Operation::new("RG", rgb(*color)));
                out.push(Operation::new("m", reals([mm_to_pt(from.0), y_pt(from.1)])));
                out.push(Operation::new("l", reals([mm_to_pt(to.0), y_pt(to.1)])));
                out.push(Operation::new("S", vec![]));
            }
            Op::Rect {
                x,
                y,
                width,
                height,
                fill,
                stroke,
            } => {
                if let Some(fill) = fill {
                    out.push(Operation::new("rg", rgb(*fill)));
                }
                if let Some(stroke) = stroke {
                    out.push(Operation::new("RG", rgb(*stroke)));
                }
                out.push(Operation::new(
                    "re",
                    reals([
                        mm_to_pt(*x),
                        y_pt(*y + *height),
                        mm_to_pt(*width),
                        mm_to_pt(*height),
                    ]),
                ));
                let paint = match (fill, stroke) {
                    (Some(_), Some(_)) => "B",
                    (Some(_), None) => "f",
                    (None, _) => "S",
                };
                out.push(Operation::new(paint, vec![]));
            }
            Op::Image {
                x,
                y,
                width,
                height,
                image,
            } => {
                out.push(Operation::new("q", vec![]));
                out.push(Operation::new(
                    "cm",
                    reals([
                        mm_to_pt(*width),
                        0.0,
                        0.0,
                        mm_to_pt(*height),
                        mm_to_pt(*x),
                        y_pt(*y + *height),
                    ]),
                ));
                out.push(Operation::new(
                    "Do",
                    vec![Object::Name(image_resource(*image).into_bytes())],
                ));
                out.push(Operation::new("Q", vec![]));
            }
        }
    }

    out
}

fn add_font(doc: &mut Document, base_font: &str) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    })
}

/// Serialize a laid-out report to PDF bytes
pub fn render_pdf(layout: &ReportLayout) -> Result<Vec<u8>, ReportError> {
    let mut doc = Document::with_version(PDF_VERSION);
    let pages_id = doc.new_object_id();

    let regular_id = add_font(&mut doc, "Helvetica");
    let bold_id = add_font(&mut doc, "Helvetica-Bold");

    let mut xobjects = Dictionary::new();
    for (index, image) in layout.images.iter().enumerate() {
        let stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(image.width),
                "Height" => i64::from(image.height),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8_i64,
                "Filter" => "DCTDecode",
            },
            image.jpeg.clone(),
        )
        .with_compression(false);
        let image_id = doc.add_object(stream);
        xobjects.set(image_resource(index), image_id);
    }

    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
        "XObject" => xobjects,
    });

    let mut kids: Vec<Object> = Vec::with_capacity(layout.pages.len());
    for page in &layout.pages {
        let content = Content {
            operations: page_operations(&page.ops),
        };
        let encoded = content
            .encode()
            .map_err(|e| ReportError::Pdf(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => layout.pages.len() as i64,
        "Resources" => resources_id,
        "MediaBox" => reals([0.0, 0.0, mm_to_pt(PAGE_WIDTH), mm_to_pt(PAGE_HEIGHT)]),
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| ReportError::Pdf(e.to_string()))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::layout::{EmbeddedImage, Page};
    use image::{DynamicImage, ImageFormat, RgbImage};
    use std::io::Cursor;

    fn text(value: &str) -> Op {
        Op::Text {
            x: 20.0,
            y: 30.0,
            text: value.to_string(),
            size: 12.0,
            font: Font::Bold,
            color: [0, 0, 0],
        }
    }

    #[test]
    fn test_page_count_survives_round_trip() {
        let layout = ReportLayout {
            pages: vec![
                Page {
                    ops: vec![text("Cover")],
                },
                Page {
                    ops: vec![text("Kitchen")],
                },
            ],
            ..ReportLayout::default()
        };

        let bytes = render_pdf(&layout).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn test_images_are_embedded_as_jpeg() {
        let img = RgbImage::from_pixel(8, 6, image::Rgb([10, 20, 30]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, ImageFormat::Jpeg)
            .unwrap();

        let layout = ReportLayout {
            pages: vec![Page {
                ops: vec![Op::Image {
                    x: 20.0,
                    y: 50.0,
                    width: 80.0,
                    height: 60.0,
                    image: 0,
                }],
            }],
            images: vec![EmbeddedImage {
                width: 8,
                height: 6,
                jpeg: buf.into_inner(),
            }],
            photo_rows: Vec::new(),
        };

        let bytes = render_pdf(&layout).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let has_dct = doc.objects.values().any(|object| match object {
            Object::Stream(stream) => stream
                .dict
                .get(b"Filter")
                .and_then(|f| f.as_name())
                .map(|name| name == b"DCTDecode")
                .unwrap_or(false),
            _ => false,
        });
        assert!(has_dct);
    }

    #[test]
    fn test_latin1_fallback() {
        assert_eq!(latin1("Café"), vec![b'C', b'a', b'f', 0xE9]);
        assert_eq!(latin1("日"), vec![b'?']);
    }

    #[test]
    fn test_y_axis_is_flipped() {
        assert!((y_pt(0.0) - mm_to_pt(PAGE_HEIGHT)).abs() < 1e-3);
        assert!(y_pt(PAGE_HEIGHT).abs() < 1e-3);
    }
}
