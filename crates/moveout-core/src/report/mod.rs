//! Inspection reports
//!
//! Building a report happens in three steps:
//! 1. [`ReportBuilder::load`] reads the inspection, its rooms, items and
//!    photos from the store in one sequential pass
//! 2. [`layout_report`] paginates that data into a [`ReportLayout`]
//! 3. [`render_pdf`] writes the layout as PDF bytes
//!
//! Steps 2 and 3 do not touch the store, so callers may run them on a
//! blocking worker thread. The builder never writes; persisting the bytes
//! is [`store_report`]'s job.

pub mod layout;
pub mod metrics;
pub mod pdf;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{InspectionStatus, NewReport, Report};
use crate::storage::StorageError;
use crate::store::Store;

pub use layout::{layout_report, ReportData, ReportLayout, RoomSection};
pub use pdf::render_pdf;

/// Errors from building or storing a report
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Inspection not found: {0}")]
    InspectionNotFound(Uuid),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Failed to write PDF: {0}")]
    Pdf(String),
}

/// Reads an inspection from the store and turns it into a PDF
pub struct ReportBuilder<'a> {
    store: &'a Store,
    brand_label: String,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self {
            brand_label: store.config().brand_label.clone(),
            store,
        }
    }

    pub fn with_brand(mut self, brand_label: impl Into<String>) -> Self {
        self.brand_label = brand_label.into();
        self
    }

    pub fn brand_label(&self) -> &str {
        &self.brand_label
    }

    /// Gather everything the report shows
    ///
    /// Rooms keep store order. A room section lists the photos whose
    /// `room_id` matches, including item-scoped photos in that room.
    pub fn load(&self, inspection_id: Uuid) -> Result<ReportData, ReportError> {
        let inspection = self
            .store
            .get_inspection(inspection_id)?
            .ok_or(ReportError::InspectionNotFound(inspection_id))?;

        let all_photos = self.store.photos_for_inspection(inspection_id)?;
        let total_photos = all_photos.len();

        let mut rooms = Vec::new();
        for room in self.store.rooms_for_inspection(inspection_id)? {
            let items = self.store.items_for_room(room.id)?;
            let photos = all_photos
                .iter()
                .filter(|photo| photo.room_id == Some(room.id))
                .cloned()
                .collect();
            rooms.push(RoomSection {
                room,
                items,
                photos,
            });
        }

        debug!(
            inspection = %inspection_id,
            rooms = rooms.len(),
            photos = total_photos,
            "Loaded report data"
        );

        Ok(ReportData {
            inspection,
            rooms,
            total_photos,
        })
    }

    pub fn layout_at(
        &self,
        inspection_id: Uuid,
        generated_at: DateTime<Utc>,
    ) -> Result<ReportLayout, ReportError> {
        let data = self.load(inspection_id)?;
        Ok(layout_report(&data, &self.brand_label, generated_at))
    }

    /// Build the PDF for an inspection
    pub fn build(&self, inspection_id: Uuid) -> Result<Vec<u8>, ReportError> {
        self.build_at(inspection_id, Utc::now())
    }

    pub fn build_at(
        &self,
        inspection_id: Uuid,
        generated_at: DateTime<Utc>,
    ) -> Result<Vec<u8>, ReportError> {
        let data = self.load(inspection_id)?;
        render_report(&data, &self.brand_label, generated_at)
    }
}

/// Lay out and serialize already-loaded report data
pub fn render_report(
    data: &ReportData,
    brand_label: &str,
    generated_at: DateTime<Utc>,
) -> Result<Vec<u8>, ReportError> {
    let layout = layout_report(data, brand_label, generated_at);
    let bytes = render_pdf(&layout)?;
    info!(
        inspection = %data.inspection.id,
        pages = layout.page_count(),
        bytes = bytes.len(),
        "Built report"
    );
    Ok(bytes)
}

/// `inspection-report-<unix millis>.pdf`
pub fn report_filename(generated_at: DateTime<Utc>) -> String {
    format!("inspection-report-{}.pdf", generated_at.timestamp_millis())
}

/// Persist report bytes and mark the inspection completed
pub fn store_report(
    store: &mut Store,
    inspection_id: Uuid,
    data: Vec<u8>,
    generated_at: DateTime<Utc>,
) -> Result<Report, ReportError> {
    let report = store
        .save_report(NewReport {
            inspection_id,
            filename: report_filename(generated_at),
            generated_at,
            data,
        })
        .map_err(|e| match e {
            StorageError::NotFound { .. } => ReportError::InspectionNotFound(inspection_id),
            other => ReportError::Storage(other),
        })?;

    store.set_inspection_status(inspection_id, InspectionStatus::Completed)?;
    Ok(report)
}

/// Build, persist and mark completed in one call
pub fn generate_and_store(store: &mut Store, inspection_id: Uuid) -> Result<Report, ReportError> {
    generate_and_store_at(store, inspection_id, Utc::now())
}

pub fn generate_and_store_at(
    store: &mut Store,
    inspection_id: Uuid,
    generated_at: DateTime<Utc>,
) -> Result<Report, ReportError> {
    let bytes = ReportBuilder::new(store).build_at(inspection_id, generated_at)?;
    store_report(store, inspection_id, bytes, generated_at)
}
