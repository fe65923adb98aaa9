//! SQLite access layer
//!
//! Raw reads and writes for the six entity collections. Callers get model
//! values back; row decoding problems surface as
//! [`StorageError::InvalidRecord`]. Validation, template seeding and
//! timestamp bookkeeping live one level up in [`crate::store::Store`].
//!
//! ## Tables
//!
//! - `inspections` - top-level records
//! - `rooms` - rooms, by `inspection_id`
//! - `inspection_items` - checklist entries, by `room_id`
//! - `photos` - compressed images and thumbnails
//! - `reports` - generated PDF bytes plus share token stamp
//! - `share_links` - expiring public tokens

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::config::Config;
use crate::models::{Inspection, InspectionItem, Photo, Report, Room, ShareLink};
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::schema::{init_schema, needs_init};

const DATE_FORMAT: &str = "%Y-%m-%d";

const INSPECTION_COLUMNS: &str =
    "id, property_address, inspection_date, notes, status, created_at, updated_at";
const ROOM_COLUMNS: &str = "id, inspection_id, name, room_type, notes, completed_at";
const ITEM_COLUMNS: &str = "id, room_id, name, condition, notes, checked_at";
const PHOTO_COLUMNS: &str = "id, item_id, room_id, inspection_id, filename, original_size, compressed_size, taken_at, data, thumbnail";
const REPORT_COLUMNS: &str =
    "id, inspection_id, filename, generated_at, data, share_token, share_expires_at";
const SHARE_LINK_COLUMNS: &str =
    "token, inspection_id, created_at, expires_at, accessed, access_count";

/// Row counts removed by a cascading inspection delete
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeSummary {
    pub photos: usize,
    pub items: usize,
    pub rooms: usize,
    pub reports: usize,
    pub share_links: usize,
    pub inspections: usize,
}

/// Row counts per collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionCounts {
    pub inspections: i64,
    pub rooms: i64,
    pub items: i64,
    pub photos: i64,
    pub reports: i64,
    pub share_links: i64,
}

/// SQLite-backed entity collections
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create the SQLite database
    pub fn open(config: &Config) -> StorageResult<Self> {
        let path = config.sqlite_path();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::from_io(e, parent.to_path_buf()))?;
        }

        let conn = Connection::open(&path)?;
        debug!("Opened database at {:?}", path);
        Self::from_connection(conn)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StorageResult<Self> {
        if needs_init(&conn) {
            init_schema(&conn)?;
        }
        Ok(Self { conn })
    }

    /// Get a reference to the underlying connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    // ==================== Inspections ====================

    pub fn insert_inspection(&self, inspection: &Inspection) -> StorageResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO inspections (id, property_address, inspection_date, notes, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                inspection.id.to_string(),
                inspection.property_address,
                inspection.inspection_date.format(DATE_FORMAT).to_string(),
                inspection.notes,
                inspection.status.as_str(),
                inspection.created_at.timestamp_millis(),
                inspection.updated_at.timestamp_millis(),
            ],
        )?;
        Ok(())
    }

    pub fn get_inspection(&self, id: Uuid) -> StorageResult<Option<Inspection>> {
        let sql = format!("SELECT {INSPECTION_COLUMNS} FROM inspections WHERE id = ?");
        let row = self
            .conn
            .query_row(&sql, params![id.to_string()], InspectionRow::from_row)
            .optional()?;
        row.map(InspectionRow::hydrate).transpose()
    }

    /// All inspections, newest first
    pub fn list_inspections(&self) -> StorageResult<Vec<Inspection>> {
        let sql = format!(
            "SELECT {INSPECTION_COLUMNS} FROM inspections ORDER BY created_at DESC, rowid DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], InspectionRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(InspectionRow::hydrate).collect()
    }

    /// Overwrite every mutable column of an inspection
    pub fn update_inspection(&self, inspection: &Inspection) -> StorageResult<usize> {
        let changed = self.conn.execute(
            r#"
            UPDATE inspections
            SET property_address = ?, inspection_date = ?, notes = ?, status = ?, updated_at = ?
            WHERE id = ?
            "#,
            params![
                inspection.property_address,
                inspection.inspection_date.format(DATE_FORMAT).to_string(),
                inspection.notes,
                inspection.status.as_str(),
                inspection.updated_at.timestamp_millis(),
                inspection.id.to_string(),
            ],
        )?;
        Ok(changed)
    }

    /// Delete an inspection and everything it owns in one transaction
    ///
    /// Order: photos of the inspection, items of each room, rooms, reports,
    /// share links, the inspection. Any failure rolls the whole delete back.
    pub fn delete_inspection_cascade(&mut self, inspection_id: Uuid) -> StorageResult<CascadeSummary> {
        let fail = |source| StorageError::TransactionFailure {
            inspection_id,
            source,
        };

        let tx = self.conn.transaction().map_err(fail)?;
        let summary = cascade_delete(&tx, &inspection_id.to_string()).map_err(fail)?;
        tx.commit().map_err(fail)?;

        Ok(summary)
    }

    // ==================== Rooms ====================

    /// Insert a room together with its seeded checklist items
    pub fn insert_room_with_items(
        &mut self,
        room: &Room,
        items: &[InspectionItem],
    ) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        insert_room(&tx, room)?;
        for item in items {
            insert_item(&tx, item)?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn get_room(&self, id: Uuid) -> StorageResult<Option<Room>> {
        let sql = format!("SELECT {ROOM_COLUMNS} FROM rooms WHERE id = ?");
        let row = self
            .conn
            .query_row(&sql, params![id.to_string()], RoomRow::from_row)
            .optional()?;
        row.map(RoomRow::hydrate).transpose()
    }

    /// Rooms of an inspection, in creation order
    pub fn rooms_for_inspection(&self, inspection_id: Uuid) -> StorageResult<Vec<Room>> {
        let sql = format!("SELECT {ROOM_COLUMNS} FROM rooms WHERE inspection_id = ? ORDER BY rowid");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![inspection_id.to_string()], RoomRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(RoomRow::hydrate).collect()
    }

    pub fn update_room(&self, room: &Room) -> StorageResult<usize> {
        let changed = self.conn.execute(
            "UPDATE rooms SET name = ?, room_type = ?, notes = ?, completed_at = ? WHERE id = ?",
            params![
                room.name,
                room.room_type.as_str(),
                room.notes,
                room.completed_at.map(|t| t.timestamp_millis()),
                room.id.to_string(),
            ],
        )?;
        Ok(changed)
    }

    // ==================== Items ====================

    pub fn insert_item(&self, item: &InspectionItem) -> StorageResult<()> {
        insert_item(&self.conn, item)?;
        Ok(())
    }

    pub fn get_item(&self, id: Uuid) -> StorageResult<Option<InspectionItem>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM inspection_items WHERE id = ?");
        let row = self
            .conn
            .query_row(&sql, params![id.to_string()], ItemRow::from_row)
            .optional()?;
        row.map(ItemRow::hydrate).transpose()
    }

    /// Items of a room, in insertion (display) order
    pub fn items_for_room(&self, room_id: Uuid) -> StorageResult<Vec<InspectionItem>> {
        let sql =
            format!("SELECT {ITEM_COLUMNS} FROM inspection_items WHERE room_id = ? ORDER BY rowid");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![room_id.to_string()], ItemRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(ItemRow::hydrate).collect()
    }

    pub fn update_item(&self, item: &InspectionItem) -> StorageResult<usize> {
        let changed = self.conn.execute(
            "UPDATE inspection_items SET name = ?, condition = ?, notes = ?, checked_at = ? WHERE id = ?",
            params![
                item.name,
                item.condition.as_str(),
                item.notes,
                item.checked_at.map(|t| t.timestamp_millis()),
                item.id.to_string(),
            ],
        )?;
        Ok(changed)
    }

    // ==================== Photos ====================

    pub fn insert_photo(&self, photo: &Photo) -> StorageResult<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO photos ({PHOTO_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
            ),
            params![
                photo.id.to_string(),
                photo.item_id.map(|id| id.to_string()),
                photo.room_id.map(|id| id.to_string()),
                photo.inspection_id.to_string(),
                photo.filename,
                photo.original_size as i64,
                photo.compressed_size as i64,
                photo.taken_at.timestamp_millis(),
                photo.data,
                photo.thumbnail,
            ],
        )?;
        Ok(())
    }

    pub fn get_photo(&self, id: Uuid) -> StorageResult<Option<Photo>> {
        let sql = format!("SELECT {PHOTO_COLUMNS} FROM photos WHERE id = ?");
        let row = self
            .conn
            .query_row(&sql, params![id.to_string()], PhotoRow::from_row)
            .optional()?;
        row.map(PhotoRow::hydrate).transpose()
    }

    pub fn photos_for_inspection(&self, inspection_id: Uuid) -> StorageResult<Vec<Photo>> {
        self.photos_where("inspection_id", inspection_id)
    }

    pub fn photos_for_room(&self, room_id: Uuid) -> StorageResult<Vec<Photo>> {
        self.photos_where("room_id", room_id)
    }

    pub fn photos_for_item(&self, item_id: Uuid) -> StorageResult<Vec<Photo>> {
        self.photos_where("item_id", item_id)
    }

    /// `(id, filename)` of every photo, without loading image bytes
    pub fn photo_labels(&self) -> StorageResult<Vec<(Uuid, String)>> {
        self.labels("photos")
    }

    fn labels(&self, table: &'static str) -> StorageResult<Vec<(Uuid, String)>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT id, filename FROM {table} ORDER BY rowid"))?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter()
            .map(|(id, filename)| Ok((parse_uuid(table, "id", &id)?, filename)))
            .collect()
    }

    /// Photos matching an indexed reference column, in capture order
    fn photos_where(&self, column: &'static str, id: Uuid) -> StorageResult<Vec<Photo>> {
        let sql = format!("SELECT {PHOTO_COLUMNS} FROM photos WHERE {column} = ? ORDER BY rowid");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![id.to_string()], PhotoRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(PhotoRow::hydrate).collect()
    }

    // ==================== Reports ====================

    pub fn insert_report(&self, report: &Report) -> StorageResult<()> {
        self.conn.execute(
            &format!("INSERT INTO reports ({REPORT_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?)"),
            params![
                report.id.to_string(),
                report.inspection_id.to_string(),
                report.filename,
                report.generated_at.timestamp_millis(),
                report.data,
                report.share_token,
                report.share_expires_at.map(|t| t.timestamp_millis()),
            ],
        )?;
        Ok(())
    }

    pub fn get_report(&self, id: Uuid) -> StorageResult<Option<Report>> {
        let sql = format!("SELECT {REPORT_COLUMNS} FROM reports WHERE id = ?");
        let row = self
            .conn
            .query_row(&sql, params![id.to_string()], ReportRow::from_row)
            .optional()?;
        row.map(ReportRow::hydrate).transpose()
    }

    /// Reports of an inspection, newest first
    pub fn reports_for_inspection(&self, inspection_id: Uuid) -> StorageResult<Vec<Report>> {
        let sql = format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE inspection_id = ? ORDER BY generated_at DESC, rowid DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![inspection_id.to_string()], ReportRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(ReportRow::hydrate).collect()
    }

    /// `(id, filename)` of every report, without loading the PDF bytes
    pub fn report_labels(&self) -> StorageResult<Vec<(Uuid, String)>> {
        self.labels("reports")
    }

    /// The most recent report stamped with a share token
    pub fn report_for_share_token(&self, token: &str) -> StorageResult<Option<Report>> {
        let sql = format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE share_token = ? ORDER BY generated_at DESC LIMIT 1"
        );
        let row = self
            .conn
            .query_row(&sql, params![token], ReportRow::from_row)
            .optional()?;
        row.map(ReportRow::hydrate).transpose()
    }

    /// Clear the share stamp from every report carrying `token`
    pub fn clear_share_token(&self, token: &str) -> StorageResult<usize> {
        let changed = self.conn.execute(
            "UPDATE reports SET share_token = NULL, share_expires_at = NULL WHERE share_token = ?",
            params![token],
        )?;
        Ok(changed)
    }

    // ==================== Share links ====================

    /// Insert a link and stamp it onto a report in one transaction
    ///
    /// Returns `false`, leaving nothing behind, when the report row does
    /// not exist.
    pub fn publish_share_link(&mut self, link: &ShareLink, report_id: Uuid) -> StorageResult<bool> {
        let tx = self.conn.transaction()?;
        insert_share_link(&tx, link)?;
        let stamped = tx.execute(
            "UPDATE reports SET share_token = ?, share_expires_at = ? WHERE id = ?",
            params![
                link.token,
                link.expires_at.timestamp_millis(),
                report_id.to_string()
            ],
        )?;
        if stamped == 0 {
            tx.rollback()?;
            return Ok(false);
        }
        tx.commit()?;
        Ok(true)
    }

    pub fn get_share_link(&self, token: &str) -> StorageResult<Option<ShareLink>> {
        let sql = format!("SELECT {SHARE_LINK_COLUMNS} FROM share_links WHERE token = ?");
        let row = self
            .conn
            .query_row(&sql, params![token], ShareLinkRow::from_row)
            .optional()?;
        row.map(ShareLinkRow::hydrate).transpose()
    }

    pub fn share_links_for_inspection(&self, inspection_id: Uuid) -> StorageResult<Vec<ShareLink>> {
        let sql = format!(
            "SELECT {SHARE_LINK_COLUMNS} FROM share_links WHERE inspection_id = ? ORDER BY created_at DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![inspection_id.to_string()], ShareLinkRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(ShareLinkRow::hydrate).collect()
    }

    pub fn update_share_access(&self, token: &str, accessed: bool, count: u32) -> StorageResult<usize> {
        let changed = self.conn.execute(
            "UPDATE share_links SET accessed = ?, access_count = ? WHERE token = ?",
            params![accessed, i64::from(count), token],
        )?;
        Ok(changed)
    }

    pub fn delete_share_link(&self, token: &str) -> StorageResult<usize> {
        let deleted = self
            .conn
            .execute("DELETE FROM share_links WHERE token = ?", params![token])?;
        Ok(deleted)
    }

    /// Delete links whose expiry is at or before `now`
    pub fn delete_expired_share_links(&self, now: DateTime<Utc>) -> StorageResult<usize> {
        let deleted = self.conn.execute(
            "DELETE FROM share_links WHERE expires_at <= ?",
            params![now.timestamp_millis()],
        )?;
        Ok(deleted)
    }

    // ==================== Stats ====================

    pub fn counts(&self) -> StorageResult<CollectionCounts> {
        let count = |table: &str| -> StorageResult<i64> {
            let n = self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
            Ok(n)
        };

        Ok(CollectionCounts {
            inspections: count("inspections")?,
            rooms: count("rooms")?,
            items: count("inspection_items")?,
            photos: count("photos")?,
            reports: count("reports")?,
            share_links: count("share_links")?,
        })
    }

    /// Rows in any dependent collection still referencing an inspection
    pub fn dependent_row_count(&self, inspection_id: Uuid) -> StorageResult<i64> {
        let n = self.conn.query_row(
            r#"
            SELECT
                (SELECT COUNT(*) FROM photos WHERE inspection_id = ?1)
              + (SELECT COUNT(*) FROM inspection_items
                 WHERE room_id IN (SELECT id FROM rooms WHERE inspection_id = ?1))
              + (SELECT COUNT(*) FROM rooms WHERE inspection_id = ?1)
              + (SELECT COUNT(*) FROM reports WHERE inspection_id = ?1)
              + (SELECT COUNT(*) FROM share_links WHERE inspection_id = ?1)
            "#,
            params![inspection_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(n)
    }
}

// ==================== Private helpers ====================

fn cascade_delete(tx: &Transaction, inspection_id: &str) -> rusqlite::Result<CascadeSummary> {
    let room_ids: Vec<String> = {
        let mut stmt = tx.prepare("SELECT id FROM rooms WHERE inspection_id = ?")?;
        let ids = stmt
            .query_map(params![inspection_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        ids
    };

    let mut summary = CascadeSummary {
        photos: tx.execute(
            "DELETE FROM photos WHERE inspection_id = ?",
            params![inspection_id],
        )?,
        ..CascadeSummary::default()
    };

    for room_id in &room_ids {
        summary.items += tx.execute(
            "DELETE FROM inspection_items WHERE room_id = ?",
            params![room_id],
        )?;
    }

    summary.rooms = tx.execute(
        "DELETE FROM rooms WHERE inspection_id = ?",
        params![inspection_id],
    )?;
    summary.reports = tx.execute(
        "DELETE FROM reports WHERE inspection_id = ?",
        params![inspection_id],
    )?;
    summary.share_links = tx.execute(
        "DELETE FROM share_links WHERE inspection_id = ?",
        params![inspection_id],
    )?;
    summary.inspections = tx.execute("DELETE FROM inspections WHERE id = ?", params![inspection_id])?;

    Ok(summary)
}

fn insert_room(conn: &Connection, room: &Room) -> rusqlite::Result<()> {
    conn.execute(
        &format!("INSERT INTO rooms ({ROOM_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?)"),
        params![
            room.id.to_string(),
            room.inspection_id.to_string(),
            room.name,
            room.room_type.as_str(),
            room.notes,
            room.completed_at.map(|t| t.timestamp_millis()),
        ],
    )?;
    Ok(())
}

fn insert_share_link(conn: &Connection, link: &ShareLink) -> rusqlite::Result<()> {
    conn.execute(
        &format!("INSERT INTO share_links ({SHARE_LINK_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?)"),
        params![
            link.token,
            link.inspection_id.to_string(),
            link.created_at.timestamp_millis(),
            link.expires_at.timestamp_millis(),
            link.accessed,
            i64::from(link.access_count),
        ],
    )?;
    Ok(())
}

fn insert_item(conn: &Connection, item: &InspectionItem) -> rusqlite::Result<()> {
    conn.execute(
        &format!("INSERT INTO inspection_items ({ITEM_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?)"),
        params![
            item.id.to_string(),
            item.room_id.to_string(),
            item.name,
            item.condition.as_str(),
            item.notes,
            item.checked_at.map(|t| t.timestamp_millis()),
        ],
    )?;
    Ok(())
}

fn parse_uuid(table: &'static str, column: &'static str, value: &str) -> StorageResult<Uuid> {
    Uuid::parse_str(value).map_err(|e| StorageError::InvalidRecord {
        table,
        column,
        details: format!("'{}': {}", value, e),
    })
}

fn parse_opt_uuid(
    table: &'static str,
    column: &'static str,
    value: Option<String>,
) -> StorageResult<Option<Uuid>> {
    value.map(|v| parse_uuid(table, column, &v)).transpose()
}

fn parse_enum<T>(table: &'static str, column: &'static str, value: &str) -> StorageResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| StorageError::InvalidRecord {
        table,
        column,
        details: e.to_string(),
    })
}

fn parse_millis(table: &'static str, column: &'static str, millis: i64) -> StorageResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| StorageError::InvalidRecord {
        table,
        column,
        details: format!("timestamp out of range: {}", millis),
    })
}

fn parse_opt_millis(
    table: &'static str,
    column: &'static str,
    millis: Option<i64>,
) -> StorageResult<Option<DateTime<Utc>>> {
    millis.map(|m| parse_millis(table, column, m)).transpose()
}

struct InspectionRow {
    id: String,
    property_address: String,
    inspection_date: String,
    notes: Option<String>,
    status: String,
    created_at: i64,
    updated_at: i64,
}

impl InspectionRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            property_address: row.get(1)?,
            inspection_date: row.get(2)?,
            notes: row.get(3)?,
            status: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    fn hydrate(self) -> StorageResult<Inspection> {
        const T: &str = "inspections";
        let inspection_date = NaiveDate::parse_from_str(&self.inspection_date, DATE_FORMAT)
            .map_err(|e| StorageError::InvalidRecord {
                table: T,
                column: "inspection_date",
                details: e.to_string(),
            })?;

        Ok(Inspection {
            id: parse_uuid(T, "id", &self.id)?,
            property_address: self.property_address,
            inspection_date,
            notes: self.notes,
            status: parse_enum(T, "status", &self.status)?,
            created_at: parse_millis(T, "created_at", self.created_at)?,
            updated_at: parse_millis(T, "updated_at", self.updated_at)?,
        })
    }
}

struct RoomRow {
    id: String,
    inspection_id: String,
    name: String,
    room_type: String,
    notes: Option<String>,
    completed_at: Option<i64>,
}

impl RoomRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            inspection_id: row.get(1)?,
            name: row.get(2)?,
            room_type: row.get(3)?,
            notes: row.get(4)?,
            completed_at: row.get(5)?,
        })
    }

    fn hydrate(self) -> StorageResult<Room> {
        const T: &str = "rooms";
        Ok(Room {
            id: parse_uuid(T, "id", &self.id)?,
            inspection_id: parse_uuid(T, "inspection_id", &self.inspection_id)?,
            name: self.name,
            room_type: parse_enum(T, "room_type", &self.room_type)?,
            notes: self.notes,
            completed_at: parse_opt_millis(T, "completed_at", self.completed_at)?,
        })
    }
}

struct ItemRow {
    id: String,
    room_id: String,
    name: String,
    condition: String,
    notes: Option<String>,
    checked_at: Option<i64>,
}

impl ItemRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            room_id: row.get(1)?,
            name: row.get(2)?,
            condition: row.get(3)?,
            notes: row.get(4)?,
            checked_at: row.get(5)?,
        })
    }

    fn hydrate(self) -> StorageResult<InspectionItem> {
        const T: &str = "inspection_items";
        Ok(InspectionItem {
            id: parse_uuid(T, "id", &self.id)?,
            room_id: parse_uuid(T, "room_id", &self.room_id)?,
            name: self.name,
            condition: parse_enum(T, "condition", &self.condition)?,
            notes: self.notes,
            checked_at: parse_opt_millis(T, "checked_at", self.checked_at)?,
        })
    }
}

struct PhotoRow {
    id: String,
    item_id: Option<String>,
    room_id: Option<String>,
    inspection_id: String,
    filename: String,
    original_size: i64,
    compressed_size: i64,
    taken_at: i64,
    data: Vec<u8>,
    thumbnail: Option<Vec<u8>>,
}

impl PhotoRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            item_id: row.get(1)?,
            room_id: row.get(2)?,
            inspection_id: row.get(3)?,
            filename: row.get(4)?,
            original_size: row.get(5)?,
            compressed_size: row.get(6)?,
            taken_at: row.get(7)?,
            data: row.get(8)?,
            thumbnail: row.get(9)?,
        })
    }

    fn hydrate(self) -> StorageResult<Photo> {
        const T: &str = "photos";
        Ok(Photo {
            id: parse_uuid(T, "id", &self.id)?,
            item_id: parse_opt_uuid(T, "item_id", self.item_id)?,
            room_id: parse_opt_uuid(T, "room_id", self.room_id)?,
            inspection_id: parse_uuid(T, "inspection_id", &self.inspection_id)?,
            filename: self.filename,
            original_size: self.original_size.max(0) as u64,
            compressed_size: self.compressed_size.max(0) as u64,
            taken_at: parse_millis(T, "taken_at", self.taken_at)?,
            data: self.data,
            thumbnail: self.thumbnail,
        })
    }
}

struct ReportRow {
    id: String,
    inspection_id: String,
    filename: String,
    generated_at: i64,
    data: Vec<u8>,
    share_token: Option<String>,
    share_expires_at: Option<i64>,
}

impl ReportRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            inspection_id: row.get(1)?,
            filename: row.get(2)?,
            generated_at: row.get(3)?,
            data: row.get(4)?,
            share_token: row.get(5)?,
            share_expires_at: row.get(6)?,
        })
    }

    fn hydrate(self) -> StorageResult<Report> {
        const T: &str = "reports";
        Ok(Report {
            id: parse_uuid(T, "id", &self.id)?,
            inspection_id: parse_uuid(T, "inspection_id", &self.inspection_id)?,
            filename: self.filename,
            generated_at: parse_millis(T, "generated_at", self.generated_at)?,
            data: self.data,
            share_token: self.share_token,
            share_expires_at: parse_opt_millis(T, "share_expires_at", self.share_expires_at)?,
        })
    }
}

struct ShareLinkRow {
    token: String,
    inspection_id: String,
    created_at: i64,
    expires_at: i64,
    accessed: bool,
    access_count: i64,
}

impl ShareLinkRow {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            token: row.get(0)?,
            inspection_id: row.get(1)?,
            created_at: row.get(2)?,
            expires_at: row.get(3)?,
            accessed: row.get(4)?,
            access_count: row.get(5)?,
        })
    }

    fn hydrate(self) -> StorageResult<ShareLink> {
        const T: &str = "share_links";
        Ok(ShareLink {
            token: self.token,
            inspection_id: parse_uuid(T, "inspection_id", &self.inspection_id)?,
            created_at: parse_millis(T, "created_at", self.created_at)?,
            expires_at: parse_millis(T, "expires_at", self.expires_at)?,
            accessed: self.accessed,
            access_count: u32::try_from(self.access_count).unwrap_or(u32::MAX),
        })
    }
}
