//! Page layout for inspection reports
//!
//! Produces a device-independent list of drawing operations per page,
//! measured in millimetres from the top-left corner of an A4 portrait page.
//! Text `y` values are baselines. The PDF writer only translates these
//! operations; every pagination decision is made here.

use std::collections::HashMap;

use chrono::{DateTime, Local, Utc};
use image::metadata::Orientation;
use image::{ExtendedColorType, GenericImageView, ImageFormat};
use tracing::warn;

use super::metrics::{pt_to_mm, text_width, wrap_text};
use crate::imaging::{decode_source, encode_jpeg, ImageError};
use crate::models::{Condition, Inspection, InspectionItem, Photo, Room};

pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;
pub const PAGE_MARGIN: f32 = 20.0;
pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * PAGE_MARGIN;

/// Where content resumes on room pages and photo continuation pages
pub const PAGE_TOP: f32 = 30.0;

pub const PHOTOS_PER_ROW: usize = 2;
pub const PHOTO_GAP: f32 = 10.0;
pub const PHOTO_WIDTH: f32 = (CONTENT_WIDTH - PHOTO_GAP) / PHOTOS_PER_ROW as f32;
pub const PHOTO_HEIGHT: f32 = PHOTO_WIDTH * 0.75;

const HEADER_FILL: [u8; 3] = [37, 99, 235];
const STRIPE_FILL: [u8; 3] = [245, 245, 245];
const RULE_COLOR: [u8; 3] = [200, 200, 200];
const TEXT_COLOR: [u8; 3] = [20, 20, 20];
const WHITE: [u8; 3] = [255, 255, 255];

const CELL_PADDING: f32 = 1.76;
const LINE_SPACING: f32 = 1.15;
const EMBED_QUALITY: u8 = 85;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

/// One drawing operation
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Text {
        x: f32,
        y: f32,
        text: String,
        size: f32,
        font: Font,
        color: [u8; 3],
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        color: [u8; 3],
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Option<[u8; 3]>,
        stroke: Option<[u8; 3]>,
    },
    /// Draw `ReportLayout::images[image]` into the box
    Image {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        image: usize,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<Op>,
}

impl Page {
    /// Every text run on the page, in drawing order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            Op::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn image_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, Op::Image { .. }))
            .count()
    }
}

/// A baseline JPEG ready to embed with DCTDecode
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedImage {
    pub width: u32,
    pub height: u32,
    pub jpeg: Vec<u8>,
}

/// Placement of one row of photos
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhotoRow {
    /// Zero-based page index
    pub page: usize,
    /// Top edge of the row
    pub y: f32,
    /// Photo slots used in the row
    pub count: usize,
}

/// The fully paginated report
#[derive(Debug, Clone, Default)]
pub struct ReportLayout {
    pub pages: Vec<Page>,
    pub images: Vec<EmbeddedImage>,
    pub photo_rows: Vec<PhotoRow>,
}

impl ReportLayout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.pages
            .iter()
            .any(|page| page.texts().any(|text| text.contains(needle)))
    }
}

/// A room with the records shown on its page
#[derive(Debug, Clone)]
pub struct RoomSection {
    pub room: Room,
    pub items: Vec<InspectionItem>,
    pub photos: Vec<Photo>,
}

/// Everything a report needs, read from the store up front
#[derive(Debug, Clone)]
pub struct ReportData {
    pub inspection: Inspection,
    pub rooms: Vec<RoomSection>,
    /// All photos of the inspection, scoped to a room or not
    pub total_photos: usize,
}

/// Lay out a report
///
/// Order: header and summary on the first page, then one section per room
/// starting on a fresh page, then a footer stamped on every page.
pub fn layout_report(data: &ReportData, brand: &str, generated_at: DateTime<Utc>) -> ReportLayout {
    let stamp = local_timestamp(generated_at);
    let mut composer = Composer::new();

    composer.header(&data.inspection, brand, &stamp);
    composer.summary(data);

    for section in &data.rooms {
        composer.add_page();
        composer.room(section);
    }

    composer.footers(brand, &stamp);
    composer.finish()
}

/// Condition tally in first-seen order, e.g. `GOOD: 3, FAIR: 1`
pub fn condition_tally(items: &[InspectionItem]) -> String {
    let mut order: Vec<Condition> = Vec::new();
    let mut counts: HashMap<Condition, usize> = HashMap::new();

    for item in items {
        let count = counts.entry(item.condition).or_insert(0);
        if *count == 0 {
            order.push(item.condition);
        }
        *count += 1;
    }

    if order.is_empty() {
        return "N/A".to_string();
    }

    order
        .iter()
        .map(|c| format!("{}: {}", c.label(), counts.get(c).copied().unwrap_or(0)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn local_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string()
}

/// Turn stored photo bytes into something a PDF can embed
///
/// Upright JPEGs encoded as RGB pass through untouched. Anything else
/// decodable (CMYK or greyscale JPEG, rotated EXIF, PNG) is re-encoded.
pub fn embeddable_jpeg(data: &[u8]) -> Result<EmbeddedImage, ImageError> {
    let source = decode_source(data)?;
    let (width, height) = source.image.dimensions();

    let passthrough = source.format == Some(ImageFormat::Jpeg)
        && source.original_color == ExtendedColorType::Rgb8
        && source.orientation == Orientation::NoTransforms;
    let jpeg = if passthrough {
        data.to_vec()
    } else {
        encode_jpeg(&source.image.to_rgb8(), EMBED_QUALITY)?
    };

    Ok(EmbeddedImage {
        width,
        height,
        jpeg,
    })
}

struct Column {
    header: &'static str,
    width: f32,
}

struct Cell {
    text: String,
    /// Filled cells draw white text
    fill: Option<[u8; 3]>,
}

impl Cell {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            fill: None,
        }
    }

    fn filled(text: impl Into<String>, fill: [u8; 3]) -> Self {
        Self {
            text: text.into(),
            fill: Some(fill),
        }
    }
}

struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<Cell>>,
    font_size: f32,
}

struct Composer {
    pages: Vec<Page>,
    images: Vec<EmbeddedImage>,
    photo_rows: Vec<PhotoRow>,
}

impl Composer {
    fn new() -> Self {
        Self {
            pages: vec![Page::default()],
            images: Vec::new(),
            photo_rows: Vec::new(),
        }
    }

    fn finish(self) -> ReportLayout {
        ReportLayout {
            pages: self.pages,
            images: self.images,
            photo_rows: self.photo_rows,
        }
    }

    fn add_page(&mut self) {
        self.pages.push(Page::default());
    }

    fn page_index(&self) -> usize {
        self.pages.len() - 1
    }

    fn push(&mut self, op: Op) {
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    fn text(&mut self, x: f32, y: f32, text: impl Into<String>, size: f32, font: Font) {
        self.colored_text(x, y, text, size, font, TEXT_COLOR);
    }

    fn colored_text(
        &mut self,
        x: f32,
        y: f32,
        text: impl Into<String>,
        size: f32,
        font: Font,
        color: [u8; 3],
    ) {
        self.push(Op::Text {
            x,
            y,
            text: text.into(),
            size,
            font,
            color,
        });
    }

    fn centered_text(&mut self, y: f32, text: &str, size: f32, font: Font) {
        let x = (PAGE_WIDTH - text_width(text, size, font)) / 2.0;
        self.text(x, y, text, size, font);
    }

    fn right_text(&mut self, right: f32, y: f32, text: &str, size: f32, font: Font) {
        let x = right - text_width(text, size, font);
        self.text(x, y, text, size, font);
    }

    fn rule(&mut self, y: f32) {
        self.push(Op::Line {
            from: (PAGE_MARGIN, y),
            to: (PAGE_WIDTH - PAGE_MARGIN, y),
            color: RULE_COLOR,
        });
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, fill: [u8; 3]) {
        self.push(Op::Rect {
            x,
            y,
            width,
            height,
            fill: Some(fill),
            stroke: None,
        });
    }

    // ==================== Sections ====================

    fn header(&mut self, inspection: &Inspection, brand: &str, stamp: &str) {
        self.centered_text(30.0, "MOVE-OUT INSPECTION REPORT", 24.0, Font::Bold);
        self.centered_text(40.0, &format!("{} Documentation", brand), 16.0, Font::Regular);

        let date = inspection.inspection_date.format("%B %-d, %Y").to_string();
        let fields = [
            (60.0, "Property Address:", inspection.property_address.as_str()),
            (70.0, "Inspection Date:", date.as_str()),
            (80.0, "Report Generated:", stamp),
        ];
        for (y, label, value) in fields {
            self.text(PAGE_MARGIN, y, label, 12.0, Font::Bold);
            self.text(PAGE_MARGIN + 40.0, y, value, 12.0, Font::Regular);
        }

        self.rule(90.0);
    }

    fn summary(&mut self, data: &ReportData) {
        let inspection = &data.inspection;
        let mut y = 110.0;

        self.text(PAGE_MARGIN, y, "INSPECTION SUMMARY", 16.0, Font::Bold);
        y += 15.0;

        let mut rows = vec![
            vec![
                Cell::plain("Total Rooms Inspected"),
                Cell::plain(data.rooms.len().to_string()),
            ],
            vec![
                Cell::plain("Inspection Status"),
                Cell::plain(inspection.status.label()),
            ],
            vec![
                Cell::plain("Total Photos Taken"),
                Cell::plain(data.total_photos.to_string()),
            ],
        ];
        if let Some(notes) = &inspection.notes {
            rows.push(vec![Cell::plain("General Notes"), Cell::plain(notes.clone())]);
        }

        y = self.table(
            y,
            &Table {
                columns: vec![
                    Column {
                        header: "Category",
                        width: 60.0,
                    },
                    Column {
                        header: "Details",
                        width: 110.0,
                    },
                ],
                rows,
                font_size: 10.0,
            },
        );

        y += 20.0;
        if y + 30.0 > PAGE_HEIGHT - PAGE_MARGIN {
            self.add_page();
            y = PAGE_TOP;
        }
        self.text(PAGE_MARGIN, y, "ROOM SUMMARY", 14.0, Font::Bold);
        y += 10.0;

        let rows = data
            .rooms
            .iter()
            .map(|section| {
                vec![
                    Cell::plain(section.room.name.clone()),
                    Cell::plain(section.room.room_type.label()),
                    Cell::plain(section.items.len().to_string()),
                    Cell::plain(section.photos.len().to_string()),
                    Cell::plain(condition_tally(&section.items)),
                ]
            })
            .collect();

        self.table(
            y,
            &Table {
                columns: vec![
                    Column {
                        header: "Room Name",
                        width: 45.0,
                    },
                    Column {
                        header: "Type",
                        width: 32.0,
                    },
                    Column {
                        header: "Items",
                        width: 18.0,
                    },
                    Column {
                        header: "Photos",
                        width: 25.0,
                    },
                    Column {
                        header: "Conditions",
                        width: 50.0,
                    },
                ],
                rows,
                font_size: 9.0,
            },
        );
    }

    fn room(&mut self, section: &RoomSection) {
        let room = &section.room;
        let mut y = PAGE_TOP;

        self.text(
            PAGE_MARGIN,
            y,
            format!("{} ({})", room.name, room.room_type.label()),
            18.0,
            Font::Bold,
        );
        y += 20.0;

        if let Some(notes) = &room.notes {
            self.text(PAGE_MARGIN, y, "Room Notes:", 12.0, Font::Regular);
            y += 10.0;

            let lines = wrap_text(notes, CONTENT_WIDTH, 12.0, Font::Regular);
            let line_height = pt_to_mm(12.0) * LINE_SPACING;
            for (i, line) in lines.iter().enumerate() {
                self.text(PAGE_MARGIN, y + i as f32 * line_height, line.clone(), 12.0, Font::Regular);
            }
            y += lines.len() as f32 * 5.0 + 10.0;
        }

        if !section.items.is_empty() {
            self.text(PAGE_MARGIN, y, "INSPECTION ITEMS", 14.0, Font::Bold);
            y += 10.0;

            let rows = section
                .items
                .iter()
                .map(|item| {
                    vec![
                        Cell::plain(item.name.clone()),
                        Cell::filled(item.condition.label(), item.condition.color()),
                        Cell::plain(item.notes.clone().unwrap_or_else(|| "No notes".to_string())),
                        Cell::plain(
                            item.checked_at
                                .map(local_timestamp)
                                .unwrap_or_else(|| "Not checked".to_string()),
                        ),
                    ]
                })
                .collect();

            y = self.table(
                y,
                &Table {
                    columns: vec![
                        Column {
                            header: "Item",
                            width: 55.0,
                        },
                        Column {
                            header: "Condition",
                            width: 25.0,
                        },
                        Column {
                            header: "Notes",
                            width: 50.0,
                        },
                        Column {
                            header: "Checked At",
                            width: 40.0,
                        },
                    ],
                    rows,
                    font_size: 9.0,
                },
            );
            y += 20.0;
        }

        if !section.photos.is_empty() {
            self.photos(y, &section.photos);
        }
    }

    fn photos(&mut self, start_y: f32, photos: &[Photo]) {
        let mut y = start_y;
        if y + 15.0 + PHOTO_HEIGHT + 30.0 > PAGE_HEIGHT - PAGE_MARGIN {
            self.add_page();
            y = PAGE_TOP;
        }

        self.text(PAGE_MARGIN, y, "PHOTOS", 14.0, Font::Bold);
        y += 15.0;

        let caption_line = pt_to_mm(8.0) * LINE_SPACING;

        for row in photos.chunks(PHOTOS_PER_ROW) {
            if y + PHOTO_HEIGHT + 30.0 > PAGE_HEIGHT - PAGE_MARGIN {
                self.add_page();
                y = PAGE_TOP;
            }

            self.photo_rows.push(PhotoRow {
                page: self.page_index(),
                y,
                count: row.len(),
            });

            for (slot, photo) in row.iter().enumerate() {
                let x = PAGE_MARGIN + slot as f32 * (PHOTO_WIDTH + PHOTO_GAP);

                match embeddable_jpeg(&photo.data) {
                    Ok(image) => {
                        let index = self.images.len();
                        self.images.push(image);
                        self.push(Op::Image {
                            x,
                            y,
                            width: PHOTO_WIDTH,
                            height: PHOTO_HEIGHT,
                            image: index,
                        });

                        let caption_y = y + PHOTO_HEIGHT + 5.0;
                        self.text(x, caption_y, photo.filename.clone(), 8.0, Font::Regular);
                        self.text(
                            x,
                            caption_y + caption_line,
                            local_timestamp(photo.taken_at),
                            8.0,
                            Font::Regular,
                        );
                    }
                    Err(e) => {
                        warn!(photo = %photo.id, "Photo could not be embedded: {}", e);
                        self.push(Op::Rect {
                            x,
                            y,
                            width: PHOTO_WIDTH,
                            height: PHOTO_HEIGHT,
                            fill: None,
                            stroke: Some(RULE_COLOR),
                        });
                        self.text(x + 5.0, y + 10.0, "Photo unavailable", 8.0, Font::Regular);
                    }
                }
            }

            y += PHOTO_HEIGHT + 25.0;
        }
    }

    /// Draw a table starting at `y`; returns the y just below it
    ///
    /// Rows never split. A row that does not fit moves to a new page, where
    /// the header row is repeated.
    fn table(&mut self, start_y: f32, table: &Table) -> f32 {
        let line_height = pt_to_mm(table.font_size) * LINE_SPACING;
        let bottom = PAGE_HEIGHT - PAGE_MARGIN;
        let header_height = line_height + 2.0 * CELL_PADDING;

        let mut y = start_y;
        if y + header_height > bottom {
            self.add_page();
            y = PAGE_MARGIN;
        }
        y = self.table_header(y, table, line_height);

        for (index, row) in table.rows.iter().enumerate() {
            let wrapped: Vec<Vec<String>> = row
                .iter()
                .zip(&table.columns)
                .map(|(cell, column)| {
                    wrap_text(
                        &cell.text,
                        column.width - 2.0 * CELL_PADDING,
                        table.font_size,
                        Font::Regular,
                    )
                })
                .collect();
            let lines = wrapped.iter().map(Vec::len).max().unwrap_or(1).max(1);
            let height = lines as f32 * line_height + 2.0 * CELL_PADDING;

            if y + height > bottom {
                self.add_page();
                y = self.table_header(PAGE_MARGIN, table, line_height);
            }

            if index % 2 == 1 {
                self.fill_rect(PAGE_MARGIN, y, CONTENT_WIDTH, height, STRIPE_FILL);
            }

            let mut x = PAGE_MARGIN;
            for ((cell, column), cell_lines) in row.iter().zip(&table.columns).zip(&wrapped) {
                let color = match cell.fill {
                    Some(fill) => {
                        self.fill_rect(x, y, column.width, height, fill);
                        WHITE
                    }
                    None => TEXT_COLOR,
                };
                for (i, line) in cell_lines.iter().enumerate() {
                    let baseline = y + CELL_PADDING + pt_to_mm(table.font_size) * 0.8
                        + i as f32 * line_height;
                    self.colored_text(
                        x + CELL_PADDING,
                        baseline,
                        line.clone(),
                        table.font_size,
                        Font::Regular,
                        color,
                    );
                }
                x += column.width;
            }

            y += height;
        }

        y
    }

    fn table_header(&mut self, y: f32, table: &Table, line_height: f32) -> f32 {
        let height = line_height + 2.0 * CELL_PADDING;
        self.fill_rect(PAGE_MARGIN, y, CONTENT_WIDTH, height, HEADER_FILL);

        let baseline = y + CELL_PADDING + pt_to_mm(table.font_size) * 0.8;
        let mut x = PAGE_MARGIN;
        for column in &table.columns {
            self.colored_text(
                x + CELL_PADDING,
                baseline,
                column.header,
                table.font_size,
                Font::Bold,
                WHITE,
            );
            x += column.width;
        }

        y + height
    }

    /// Stamp every page once the page count is known
    fn footers(&mut self, brand: &str, stamp: &str) {
        let total = self.pages.len();
        let line_y = PAGE_HEIGHT - 20.0;
        let text_y = PAGE_HEIGHT - 10.0;

        for index in 0..total {
            let footer = [
                Op::Line {
                    from: (PAGE_MARGIN, line_y),
                    to: (PAGE_WIDTH - PAGE_MARGIN, line_y),
                    color: RULE_COLOR,
                },
                Op::Text {
                    x: PAGE_MARGIN,
                    y: text_y,
                    text: format!("Generated by {} - Page {} of {}", brand, index + 1, total),
                    size: 8.0,
                    font: Font::Regular,
                    color: TEXT_COLOR,
                },
                Op::Text {
                    x: PAGE_WIDTH - PAGE_MARGIN - text_width(stamp, 8.0, Font::Regular),
                    y: text_y,
                    text: stamp.to_string(),
                    size: 8.0,
                    font: Font::Regular,
                    color: TEXT_COLOR,
                },
            ];
            self.pages[index].ops.extend(footer);
        }
    }
}
