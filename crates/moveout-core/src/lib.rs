//! Moveout Core Library
//!
//! This crate provides the core functionality for moveout, a local-first
//! toolkit for documenting rental move-out inspections: rooms seeded from
//! templates, per-item condition checks, watermarked photo evidence, PDF
//! reports and expiring share links.
//!
//! # Architecture
//!
//! - **SQLite**: single local database, one row per entity
//! - **Store**: validation and lifecycle rules on top of the database
//! - **Imaging / Report**: pure transforms that never touch storage
//!
//! # Quick Start
//!
//! ```text
//! let mut store = Store::open()?;
//!
//! let inspection = store.create_inspection(NewInspection::new("12 Elm St", date))?;
//! let room = store.add_room(NewRoom::new(inspection.id, RoomType::Kitchen))?;
//!
//! let report = generate_and_store(&mut store, inspection.id)?;
//! let url = ShareManager::new(&mut store).create_share_link(inspection.id, report.id)?;
//! ```
//!
//! # Modules
//!
//! - `store`: Validated storage interface (main entry point)
//! - `models`: Inspections, rooms, items, photos, reports and share links
//! - `templates`: Built-in checklists per room type
//! - `imaging`: Photo compression, watermarking and thumbnails
//! - `report`: PDF report layout and rendering
//! - `share`: Expiring share links
//! - `storage`: SQLite schema and queries
//! - `config`: Application configuration

pub mod config;
pub mod imaging;
pub mod models;
pub mod report;
pub mod share;
pub mod storage;
pub mod store;
pub mod templates;

pub use config::Config;
pub use imaging::{process_photo, ImageError, ImageOptions, ProcessedImage};
pub use models::{
    Condition, Inspection, InspectionItem, InspectionStatus, NewInspection, NewPhoto, NewRoom,
    Photo, Report, Room, RoomType, ShareLink, ShareLinkInfo,
};
pub use report::{generate_and_store, ReportBuilder, ReportError};
pub use share::{ShareError, ShareManager};
pub use storage::{CascadeSummary, StorageError, StorageResult};
pub use store::Store;
pub use templates::{template_for, RoomTemplate, ROOM_TEMPLATES};
