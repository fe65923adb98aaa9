//! Unified storage interface
//!
//! The `Store` owns the SQLite connection and applies the inspection rules
//! on top of the raw collections:
//! - required fields are validated before anything is written
//! - new rooms are seeded with their template checklist
//! - partial updates are merged onto the stored record
//! - deleting an inspection cascades atomically
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = Store::open()?;
//!
//! let inspection = store.create_inspection(NewInspection::new("12 Elm St", date))?;
//! let kitchen = store.add_room(NewRoom::new(inspection.id, RoomType::Kitchen))?;
//!
//! let progress = store.inspection_progress(inspection.id)?;
//! ```

use anyhow::Context;
use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::Config;
use crate::models::{
    overall_progress, room_progress, Condition, Inspection, InspectionItem, InspectionStatus,
    InspectionUpdate, ItemUpdate, NewInspection, NewPhoto, NewReport, NewRoom, Photo, Report,
    Room, RoomUpdate, ShareLink,
};
use crate::storage::{CascadeSummary, CollectionCounts, Database, StorageError, StorageResult};
use crate::templates::template_for;

/// Unified storage interface for inspections and everything they own
pub struct Store {
    db: Database,
    config: Config,
}

impl Store {
    /// Open the store using the default configuration
    pub fn open() -> anyhow::Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Self::open_with_config(config)
    }

    /// Open the store with a specific configuration
    pub fn open_with_config(config: Config) -> anyhow::Result<Self> {
        let db = Database::open(&config).context("Failed to open SQLite database")?;
        info!("Opened store at {:?}", config.sqlite_path());
        Ok(Self { db, config })
    }

    /// Open a throwaway in-memory store (for testing)
    pub fn open_in_memory(config: Config) -> StorageResult<Self> {
        Ok(Self {
            db: Database::open_in_memory()?,
            config,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Direct access to the SQL layer
    pub fn database(&self) -> &Database {
        &self.db
    }

    // ==================== Inspections ====================

    /// Create a draft inspection
    pub fn create_inspection(&mut self, new: NewInspection) -> StorageResult<Inspection> {
        let property_address = required("property address", &new.property_address)?;
        let now = Utc::now();

        let inspection = Inspection {
            id: Uuid::new_v4(),
            property_address,
            inspection_date: new.inspection_date,
            notes: non_blank(new.notes),
            status: InspectionStatus::Draft,
            created_at: now,
            updated_at: now,
        };

        self.db.insert_inspection(&inspection)?;
        info!(id = %inspection.id, "Created inspection");
        Ok(inspection)
    }

    pub fn get_inspection(&self, id: Uuid) -> StorageResult<Option<Inspection>> {
        self.db.get_inspection(id)
    }

    /// Get an inspection or fail with `NotFound`
    pub fn require_inspection(&self, id: Uuid) -> StorageResult<Inspection> {
        self.db
            .get_inspection(id)?
            .ok_or_else(|| StorageError::not_found("inspection", id))
    }

    /// All inspections, newest first
    pub fn list_inspections(&self) -> StorageResult<Vec<Inspection>> {
        self.db.list_inspections()
    }

    /// Merge a partial update and refresh `updated_at`
    pub fn update_inspection(
        &mut self,
        id: Uuid,
        mut update: InspectionUpdate,
    ) -> StorageResult<Inspection> {
        let mut inspection = self.require_inspection(id)?;

        if let Some(address) = update.property_address.take() {
            update.property_address = Some(required("property address", &address)?);
        }
        if let Some(notes) = update.notes.take() {
            update.notes = Some(non_blank(notes));
        }

        update.apply(&mut inspection);
        inspection.updated_at = Utc::now();
        self.db.update_inspection(&inspection)?;

        debug!(id = %id, status = %inspection.status, "Updated inspection");
        Ok(inspection)
    }

    pub fn set_inspection_status(
        &mut self,
        id: Uuid,
        status: InspectionStatus,
    ) -> StorageResult<Inspection> {
        self.update_inspection(id, InspectionUpdate::status(status))
    }

    /// Delete an inspection with its rooms, items, photos, reports and
    /// share links, all or nothing
    pub fn delete_inspection(&mut self, id: Uuid) -> StorageResult<CascadeSummary> {
        self.require_inspection(id)?;
        let summary = self.db.delete_inspection_cascade(id)?;
        info!(
            id = %id,
            rooms = summary.rooms,
            items = summary.items,
            photos = summary.photos,
            reports = summary.reports,
            "Deleted inspection"
        );
        Ok(summary)
    }

    // ==================== Rooms ====================

    /// Create a room and seed its template checklist
    ///
    /// Every default item starts in `good` condition and unchecked. Without
    /// an explicit name the template display name is used.
    pub fn add_room(&mut self, new: NewRoom) -> StorageResult<Room> {
        self.require_inspection(new.inspection_id)?;

        let template = template_for(new.room_type);
        let name = match new.name {
            Some(name) => name,
            None => template.map(|t| t.name.to_string()).unwrap_or_default(),
        };

        let room = Room {
            id: Uuid::new_v4(),
            inspection_id: new.inspection_id,
            name: required("room name", &name)?,
            room_type: new.room_type,
            notes: non_blank(new.notes),
            completed_at: None,
        };

        let items: Vec<InspectionItem> = template
            .map(|t| t.default_items)
            .unwrap_or_default()
            .iter()
            .map(|name| blank_item(room.id, name))
            .collect();

        self.db.insert_room_with_items(&room, &items)?;
        info!(id = %room.id, room_type = %room.room_type, items = items.len(), "Added room");
        Ok(room)
    }

    pub fn get_room(&self, id: Uuid) -> StorageResult<Option<Room>> {
        self.db.get_room(id)
    }

    pub fn require_room(&self, id: Uuid) -> StorageResult<Room> {
        self.db
            .get_room(id)?
            .ok_or_else(|| StorageError::not_found("room", id))
    }

    /// Rooms of an inspection in the order they were added
    pub fn rooms_for_inspection(&self, inspection_id: Uuid) -> StorageResult<Vec<Room>> {
        self.db.rooms_for_inspection(inspection_id)
    }

    pub fn update_room(&mut self, id: Uuid, mut update: RoomUpdate) -> StorageResult<Room> {
        let mut room = self.require_room(id)?;

        if let Some(name) = update.name.take() {
            update.name = Some(required("room name", &name)?);
        }
        if let Some(notes) = update.notes.take() {
            update.notes = Some(non_blank(notes));
        }

        update.apply(&mut room);
        self.db.update_room(&room)?;
        debug!(id = %id, "Updated room");
        Ok(room)
    }

    /// Stamp `completed_at` on a room
    pub fn complete_room(&mut self, id: Uuid) -> StorageResult<Room> {
        self.update_room(
            id,
            RoomUpdate {
                completed_at: Some(Some(Utc::now())),
                ..RoomUpdate::default()
            },
        )
    }

    // ==================== Items ====================

    /// Append a custom checklist entry to a room
    pub fn add_item(&mut self, room_id: Uuid, name: &str) -> StorageResult<InspectionItem> {
        self.require_room(room_id)?;
        let item = blank_item(room_id, &required("item name", name)?);
        self.db.insert_item(&item)?;
        debug!(id = %item.id, room_id = %room_id, "Added item");
        Ok(item)
    }

    pub fn get_item(&self, id: Uuid) -> StorageResult<Option<InspectionItem>> {
        self.db.get_item(id)
    }

    pub fn require_item(&self, id: Uuid) -> StorageResult<InspectionItem> {
        self.db
            .get_item(id)?
            .ok_or_else(|| StorageError::not_found("item", id))
    }

    /// Items of a room in display order
    pub fn items_for_room(&self, room_id: Uuid) -> StorageResult<Vec<InspectionItem>> {
        self.db.items_for_room(room_id)
    }

    pub fn update_item(&mut self, id: Uuid, mut update: ItemUpdate) -> StorageResult<InspectionItem> {
        let mut item = self.require_item(id)?;

        if let Some(name) = update.name.take() {
            update.name = Some(required("item name", &name)?);
        }
        if let Some(notes) = update.notes.take() {
            update.notes = Some(non_blank(notes));
        }

        update.apply(&mut item);
        self.db.update_item(&item)?;
        debug!(id = %id, condition = %item.condition, "Updated item");
        Ok(item)
    }

    /// Record a condition for an item and mark it checked now
    pub fn check_item(
        &mut self,
        id: Uuid,
        condition: Condition,
        notes: Option<String>,
    ) -> StorageResult<InspectionItem> {
        self.check_item_at(id, condition, notes, Utc::now())
    }

    pub fn check_item_at(
        &mut self,
        id: Uuid,
        condition: Condition,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> StorageResult<InspectionItem> {
        self.update_item(
            id,
            ItemUpdate {
                condition: Some(condition),
                notes: notes.map(Some),
                checked_at: Some(Some(now)),
                ..ItemUpdate::default()
            },
        )
    }

    /// Clear the checked stamp, keeping condition and notes
    pub fn uncheck_item(&mut self, id: Uuid) -> StorageResult<InspectionItem> {
        self.update_item(
            id,
            ItemUpdate {
                checked_at: Some(None),
                ..ItemUpdate::default()
            },
        )
    }

    // ==================== Photos ====================

    /// Store an already-processed photo
    ///
    /// An item-scoped photo without an explicit room inherits the item's
    /// room, so room listings include it.
    pub fn add_photo(&mut self, new: NewPhoto) -> StorageResult<Photo> {
        self.require_inspection(new.inspection_id)?;
        let mut room_id = new.room_id;
        if let Some(id) = room_id {
            self.require_room(id)?;
        }
        if let Some(item_id) = new.item_id {
            let item = self.require_item(item_id)?;
            room_id.get_or_insert(item.room_id);
        }

        let photo = Photo {
            id: Uuid::new_v4(),
            item_id: new.item_id,
            room_id,
            inspection_id: new.inspection_id,
            filename: required("filename", &new.filename)?,
            original_size: new.original_size,
            compressed_size: new.data.len() as u64,
            taken_at: new.taken_at,
            data: new.data,
            thumbnail: new.thumbnail,
        };

        self.db.insert_photo(&photo)?;
        debug!(id = %photo.id, bytes = photo.compressed_size, "Added photo");
        Ok(photo)
    }

    pub fn get_photo(&self, id: Uuid) -> StorageResult<Option<Photo>> {
        self.db.get_photo(id)
    }

    pub fn photos_for_inspection(&self, inspection_id: Uuid) -> StorageResult<Vec<Photo>> {
        self.db.photos_for_inspection(inspection_id)
    }

    /// `(id, filename)` of every stored photo
    pub fn photo_labels(&self) -> StorageResult<Vec<(Uuid, String)>> {
        self.db.photo_labels()
    }

    pub fn photos_for_room(&self, room_id: Uuid) -> StorageResult<Vec<Photo>> {
        self.db.photos_for_room(room_id)
    }

    pub fn photos_for_item(&self, item_id: Uuid) -> StorageResult<Vec<Photo>> {
        self.db.photos_for_item(item_id)
    }

    // ==================== Reports ====================

    pub fn save_report(&mut self, new: NewReport) -> StorageResult<Report> {
        self.require_inspection(new.inspection_id)?;

        let report = Report {
            id: Uuid::new_v4(),
            inspection_id: new.inspection_id,
            filename: required("filename", &new.filename)?,
            generated_at: new.generated_at,
            data: new.data,
            share_token: None,
            share_expires_at: None,
        };

        self.db.insert_report(&report)?;
        info!(id = %report.id, bytes = report.data.len(), "Saved report");
        Ok(report)
    }

    pub fn get_report(&self, id: Uuid) -> StorageResult<Option<Report>> {
        self.db.get_report(id)
    }

    pub fn require_report(&self, id: Uuid) -> StorageResult<Report> {
        self.db
            .get_report(id)?
            .ok_or_else(|| StorageError::not_found("report", id))
    }

    /// Reports of an inspection, newest first
    pub fn reports_for_inspection(&self, inspection_id: Uuid) -> StorageResult<Vec<Report>> {
        self.db.reports_for_inspection(inspection_id)
    }

    /// `(id, filename)` of every stored report
    pub fn report_labels(&self) -> StorageResult<Vec<(Uuid, String)>> {
        self.db.report_labels()
    }

    pub fn latest_report(&self, inspection_id: Uuid) -> StorageResult<Option<Report>> {
        Ok(self.db.reports_for_inspection(inspection_id)?.into_iter().next())
    }

    pub fn report_for_share_token(&self, token: &str) -> StorageResult<Option<Report>> {
        self.db.report_for_share_token(token)
    }

    /// Record a new share link and stamp its token onto a report, atomically
    pub fn publish_share_link(&mut self, link: &ShareLink, report_id: Uuid) -> StorageResult<()> {
        if !self.db.publish_share_link(link, report_id)? {
            return Err(StorageError::not_found("report", report_id));
        }
        Ok(())
    }

    /// Remove a share token from whichever reports carry it
    pub fn clear_report_share(&mut self, token: &str) -> StorageResult<usize> {
        self.db.clear_share_token(token)
    }

    // ==================== Share links ====================

    pub fn get_share_link(&self, token: &str) -> StorageResult<Option<ShareLink>> {
        self.db.get_share_link(token)
    }

    pub fn share_links_for_inspection(&self, inspection_id: Uuid) -> StorageResult<Vec<ShareLink>> {
        self.db.share_links_for_inspection(inspection_id)
    }

    /// Persist the access flag and counter of a link
    pub fn record_share_access(&mut self, link: &ShareLink) -> StorageResult<()> {
        if self
            .db
            .update_share_access(&link.token, link.accessed, link.access_count)?
            == 0
        {
            return Err(StorageError::not_found("share link", &link.token));
        }
        Ok(())
    }

    /// Returns whether a link was removed
    pub fn delete_share_link(&mut self, token: &str) -> StorageResult<bool> {
        Ok(self.db.delete_share_link(token)? > 0)
    }

    /// Delete links with `expires_at <= now`; returns the number removed
    pub fn delete_expired_share_links(&mut self, now: DateTime<Utc>) -> StorageResult<usize> {
        self.db.delete_expired_share_links(now)
    }

    // ==================== Progress ====================

    /// Percentage of checked items in a room
    pub fn room_progress(&self, room_id: Uuid) -> StorageResult<u8> {
        Ok(room_progress(&self.db.items_for_room(room_id)?))
    }

    /// Mean room progress across an inspection
    pub fn inspection_progress(&self, inspection_id: Uuid) -> StorageResult<u8> {
        let per_room = self
            .db
            .rooms_for_inspection(inspection_id)?
            .iter()
            .map(|room| self.room_progress(room.id))
            .collect::<StorageResult<Vec<u8>>>()?;
        Ok(overall_progress(&per_room))
    }

    // ==================== Stats ====================

    pub fn counts(&self) -> StorageResult<CollectionCounts> {
        self.db.counts()
    }

    /// Check if this is a new store (no inspections yet)
    pub fn is_new(&self) -> bool {
        self.db.counts().map(|c| c.inspections == 0).unwrap_or(true)
    }
}

/// Trim a required text field, rejecting blank values
fn required(field: &'static str, value: &str) -> StorageResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StorageError::validation(field, "must not be blank"));
    }
    Ok(trimmed.to_string())
}

/// Blank optional text collapses to `None`
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn blank_item(room_id: Uuid, name: &str) -> InspectionItem {
    InspectionItem {
        id: Uuid::new_v4(),
        room_id,
        name: name.to_string(),
        condition: Condition::Good,
        notes: None,
        checked_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RoomType;
    use crate::templates::ROOM_TEMPLATES;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn test_config(temp_dir: &TempDir) -> Config {
        Config {
            data_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        }
    }

    fn memory_store() -> Store {
        Store::open_in_memory(Config::default()).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 31).unwrap()
    }

    fn new_inspection(store: &mut Store) -> Inspection {
        store
            .create_inspection(NewInspection::new("221B Baker Street", date()))
            .unwrap()
    }

    fn add_photo(store: &mut Store, inspection_id: Uuid, room_id: Option<Uuid>) -> Photo {
        store
            .add_photo(NewPhoto {
                inspection_id,
                room_id,
                item_id: None,
                filename: "wall.jpg".to_string(),
                original_size: 4096,
                taken_at: Utc::now(),
                data: vec![0xFF, 0xD8, 0xFF],
                thumbnail: None,
            })
            .unwrap()
    }

    #[test]
    fn test_open_creates_database_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        let store = Store::open_with_config(config.clone()).unwrap();

        assert!(config.sqlite_path().exists());
        assert!(store.is_new());
    }

    #[test]
    fn test_data_persists_across_reopens() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        let inspection_id;
        {
            let mut store = Store::open_with_config(config.clone()).unwrap();
            let inspection = new_inspection(&mut store);
            store
                .add_room(NewRoom::new(inspection.id, RoomType::Garage))
                .unwrap();
            inspection_id = inspection.id;
        }

        let store = Store::open_with_config(config).unwrap();
        let loaded = store.require_inspection(inspection_id).unwrap();
        assert_eq!(loaded.property_address, "221B Baker Street");
        assert_eq!(store.rooms_for_inspection(inspection_id).unwrap().len(), 1);
    }

    #[test]
    fn test_create_inspection_starts_as_draft() {
        let mut store = memory_store();
        let inspection = store
            .create_inspection(NewInspection::new("  4 Privet Drive ", date()).with_notes("   "))
            .unwrap();

        assert_eq!(inspection.status, InspectionStatus::Draft);
        assert_eq!(inspection.property_address, "4 Privet Drive");
        assert!(inspection.notes.is_none());
        assert_eq!(inspection.created_at, inspection.updated_at);
    }

    #[test]
    fn test_blank_address_is_rejected() {
        let mut store = memory_store();
        let err = store
            .create_inspection(NewInspection::new("   ", date()))
            .unwrap_err();

        assert!(matches!(
            err,
            StorageError::Validation {
                field: "property address",
                ..
            }
        ));
        assert!(store.list_inspections().unwrap().is_empty());
    }

    #[test]
    fn test_list_inspections_newest_first() {
        let mut store = memory_store();
        let first = new_inspection(&mut store);
        let second = store
            .create_inspection(NewInspection::new("742 Evergreen Terrace", date()))
            .unwrap();

        let ids: Vec<Uuid> = store
            .list_inspections()
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn test_update_inspection_merges_and_refreshes_timestamp() {
        let mut store = memory_store();
        let inspection = new_inspection(&mut store);

        let updated = store
            .update_inspection(
                inspection.id,
                InspectionUpdate {
                    notes: Some(Some("Landlord present".to_string())),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.property_address, inspection.property_address);
        assert_eq!(updated.notes.as_deref(), Some("Landlord present"));
        assert!(updated.updated_at >= inspection.updated_at);

        let reloaded = store.require_inspection(inspection.id).unwrap();
        assert_eq!(reloaded.notes.as_deref(), Some("Landlord present"));
    }

    #[test]
    fn test_status_transitions_are_not_validated() {
        let mut store = memory_store();
        let inspection = new_inspection(&mut store);

        store
            .set_inspection_status(inspection.id, InspectionStatus::Shared)
            .unwrap();
        let back = store
            .set_inspection_status(inspection.id, InspectionStatus::Draft)
            .unwrap();
        assert_eq!(back.status, InspectionStatus::Draft);
    }

    #[test]
    fn test_missing_inspection_is_not_found() {
        let mut store = memory_store();
        let err = store
            .update_inspection(Uuid::new_v4(), InspectionUpdate::default())
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_add_room_seeds_template_items_in_order() {
        let mut store = memory_store();
        let inspection = new_inspection(&mut store);

        for template in ROOM_TEMPLATES.iter() {
            let room = store
                .add_room(NewRoom::new(inspection.id, template.room_type))
                .unwrap();
            assert_eq!(room.name, template.name);

            let items = store.items_for_room(room.id).unwrap();
            assert_eq!(items.len(), template.default_items.len());
            for (item, expected) in items.iter().zip(template.default_items) {
                assert_eq!(item.name, *expected);
                assert_eq!(item.condition, Condition::Good);
                assert!(item.checked_at.is_none());
            }
        }
    }

    #[test]
    fn test_add_room_with_custom_name() {
        let mut store = memory_store();
        let inspection = new_inspection(&mut store);

        let room = store
            .add_room(NewRoom::new(inspection.id, RoomType::Bedroom).named("Master Bedroom"))
            .unwrap();
        assert_eq!(room.name, "Master Bedroom");
        assert_eq!(store.items_for_room(room.id).unwrap().len(), 10);
    }

    #[test]
    fn test_add_room_requires_inspection() {
        let mut store = memory_store();
        let err = store
            .add_room(NewRoom::new(Uuid::new_v4(), RoomType::Kitchen))
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(store.counts().unwrap().items, 0);
    }

    #[test]
    fn test_check_and_uncheck_item() {
        let mut store = memory_store();
        let inspection = new_inspection(&mut store);
        let room = store
            .add_room(NewRoom::new(inspection.id, RoomType::Bathroom))
            .unwrap();
        let item = store.items_for_room(room.id).unwrap().remove(0);

        let checked = store
            .check_item(item.id, Condition::Damaged, Some("Cracked seat".to_string()))
            .unwrap();
        assert_eq!(checked.condition, Condition::Damaged);
        assert_eq!(checked.notes.as_deref(), Some("Cracked seat"));
        assert!(checked.is_checked());

        let unchecked = store.uncheck_item(item.id).unwrap();
        assert!(!unchecked.is_checked());
        assert_eq!(unchecked.condition, Condition::Damaged);
    }

    #[test]
    fn test_custom_item_is_appended() {
        let mut store = memory_store();
        let inspection = new_inspection(&mut store);
        let room = store
            .add_room(NewRoom::new(inspection.id, RoomType::Closet))
            .unwrap();

        let item = store.add_item(room.id, "Mirror door").unwrap();
        let items = store.items_for_room(room.id).unwrap();
        assert_eq!(items.last().unwrap().id, item.id);
        assert!(store.add_item(room.id, " ").is_err());
    }

    #[test]
    fn test_progress() {
        let mut store = memory_store();
        let inspection = new_inspection(&mut store);
        assert_eq!(store.inspection_progress(inspection.id).unwrap(), 0);

        // Hallway has 8 items, Closet has 8 items
        let hallway = store
            .add_room(NewRoom::new(inspection.id, RoomType::Hallway))
            .unwrap();
        let closet = store
            .add_room(NewRoom::new(inspection.id, RoomType::Closet))
            .unwrap();

        for item in store.items_for_room(hallway.id).unwrap() {
            store.check_item(item.id, Condition::Good, None).unwrap();
        }
        let closet_items = store.items_for_room(closet.id).unwrap();
        for item in closet_items.iter().take(2) {
            store.check_item(item.id, Condition::Fair, None).unwrap();
        }

        assert_eq!(store.room_progress(hallway.id).unwrap(), 100);
        assert_eq!(store.room_progress(closet.id).unwrap(), 25);
        assert_eq!(store.inspection_progress(inspection.id).unwrap(), 63);
    }

    #[test]
    fn test_photo_lookups_by_scope() {
        let mut store = memory_store();
        let inspection = new_inspection(&mut store);
        let room = store
            .add_room(NewRoom::new(inspection.id, RoomType::Kitchen))
            .unwrap();

        let in_room = add_photo(&mut store, inspection.id, Some(room.id));
        add_photo(&mut store, inspection.id, None);

        assert_eq!(store.photos_for_inspection(inspection.id).unwrap().len(), 2);
        let room_photos = store.photos_for_room(room.id).unwrap();
        assert_eq!(room_photos.len(), 1);
        assert_eq!(room_photos[0].id, in_room.id);
        assert_eq!(room_photos[0].compressed_size, 3);
        assert_eq!(room_photos[0].data, vec![0xFF, 0xD8, 0xFF]);
    }

    #[test]
    fn test_delete_inspection_removes_all_dependents() {
        let mut store = memory_store();
        let inspection = new_inspection(&mut store);
        let other = store
            .create_inspection(NewInspection::new("Elsewhere", date()))
            .unwrap();

        let room = store
            .add_room(NewRoom::new(inspection.id, RoomType::Kitchen))
            .unwrap();
        store
            .add_room(NewRoom::new(other.id, RoomType::Kitchen))
            .unwrap();
        add_photo(&mut store, inspection.id, Some(room.id));
        let report = store
            .save_report(NewReport {
                inspection_id: inspection.id,
                filename: "r.pdf".to_string(),
                generated_at: Utc::now(),
                data: b"%PDF".to_vec(),
            })
            .unwrap();
        let now = Utc::now();
        let link = ShareLink {
            token: "tok".to_string(),
            inspection_id: inspection.id,
            created_at: now,
            expires_at: now,
            accessed: false,
            access_count: 0,
        };
        store.publish_share_link(&link, report.id).unwrap();

        let summary = store.delete_inspection(inspection.id).unwrap();
        assert_eq!(summary.items, 13);
        assert_eq!(summary.photos, 1);
        assert_eq!(summary.reports, 1);
        assert_eq!(summary.share_links, 1);

        assert!(store.get_inspection(inspection.id).unwrap().is_none());
        assert_eq!(store.database().dependent_row_count(inspection.id).unwrap(), 0);
        assert_eq!(store.database().dependent_row_count(other.id).unwrap(), 14);
    }

    #[test]
    fn test_delete_inspection_fault_leaves_everything_intact() {
        let mut store = memory_store();
        let inspection = new_inspection(&mut store);
        let room = store
            .add_room(NewRoom::new(inspection.id, RoomType::Bathroom))
            .unwrap();
        add_photo(&mut store, inspection.id, Some(room.id));
        store
            .save_report(NewReport {
                inspection_id: inspection.id,
                filename: "r.pdf".to_string(),
                generated_at: Utc::now(),
                data: b"%PDF".to_vec(),
            })
            .unwrap();

        let before = store.counts().unwrap();

        // Fail midway, after photos, items and rooms are already gone
        store
            .database()
            .connection()
            .execute_batch(
                "CREATE TRIGGER fail_report_delete BEFORE DELETE ON reports \
                 BEGIN SELECT RAISE(ABORT, 'simulated fault'); END;",
            )
            .unwrap();

        let err = store.delete_inspection(inspection.id).unwrap_err();
        assert!(matches!(
            err,
            StorageError::TransactionFailure { inspection_id, .. } if inspection_id == inspection.id
        ));

        assert_eq!(store.counts().unwrap(), before);
        assert!(store.get_inspection(inspection.id).unwrap().is_some());
        assert_eq!(store.items_for_room(room.id).unwrap().len(), 12);
    }

    #[test]
    fn test_reports_newest_first_and_share_stamp() {
        let mut store = memory_store();
        let inspection = new_inspection(&mut store);
        let t0 = Utc::now();

        let older = store
            .save_report(NewReport {
                inspection_id: inspection.id,
                filename: "a.pdf".to_string(),
                generated_at: t0,
                data: vec![1],
            })
            .unwrap();
        let newer = store
            .save_report(NewReport {
                inspection_id: inspection.id,
                filename: "b.pdf".to_string(),
                generated_at: t0 + chrono::Duration::seconds(5),
                data: vec![2],
            })
            .unwrap();

        let latest = store.latest_report(inspection.id).unwrap().unwrap();
        assert_eq!(latest.id, newer.id);

        let link = ShareLink {
            token: "abc".to_string(),
            inspection_id: inspection.id,
            created_at: t0,
            expires_at: t0 + chrono::Duration::days(7),
            accessed: false,
            access_count: 0,
        };
        store.publish_share_link(&link, older.id).unwrap();
        let found = store.report_for_share_token("abc").unwrap().unwrap();
        assert_eq!(found.id, older.id);

        assert_eq!(store.clear_report_share("abc").unwrap(), 1);
        assert!(store.report_for_share_token("abc").unwrap().is_none());
    }

    #[test]
    fn test_publish_share_link_to_missing_report_is_not_found() {
        let mut store = memory_store();
        let inspection = new_inspection(&mut store);
        let now = Utc::now();
        let link = ShareLink {
            token: "lost".to_string(),
            inspection_id: inspection.id,
            created_at: now,
            expires_at: now + chrono::Duration::days(7),
            accessed: false,
            access_count: 0,
        };

        let err = store.publish_share_link(&link, Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
        assert!(store.get_share_link("lost").unwrap().is_none());
    }
}
