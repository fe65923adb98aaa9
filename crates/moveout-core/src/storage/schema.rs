//! SQLite schema for the inspection store
//!
//! One table per entity collection. Secondary indexes back the lookups the
//! store exposes (rooms by inspection, items by room, photos by
//! inspection/room/item, reports by inspection or share token, share links
//! by inspection or expiry). There are no foreign keys: ownership is
//! enforced by the cascading inspection delete.

use rusqlite::{Connection, Result};

/// Current schema version for migrations
pub const SCHEMA_VERSION: i32 = 1;

/// Names of the entity tables, in cascade-delete order
pub const ENTITY_TABLES: [&str; 6] = [
    "photos",
    "inspection_items",
    "rooms",
    "reports",
    "share_links",
    "inspections",
];

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Schema version tracking
        CREATE TABLE IF NOT EXISTS schema_info (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS inspections (
            id TEXT PRIMARY KEY,
            property_address TEXT NOT NULL,
            inspection_date TEXT NOT NULL,
            notes TEXT,
            status TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS rooms (
            id TEXT PRIMARY KEY,
            inspection_id TEXT NOT NULL,
            name TEXT NOT NULL,
            room_type TEXT NOT NULL,
            notes TEXT,
            completed_at INTEGER
        );

        CREATE TABLE IF NOT EXISTS inspection_items (
            id TEXT PRIMARY KEY,
            room_id TEXT NOT NULL,
            name TEXT NOT NULL,
            condition TEXT NOT NULL,
            notes TEXT,
            checked_at INTEGER
        );

        CREATE TABLE IF NOT EXISTS photos (
            id TEXT PRIMARY KEY,
            item_id TEXT,
            room_id TEXT,
            inspection_id TEXT NOT NULL,
            filename TEXT NOT NULL,
            original_size INTEGER NOT NULL,
            compressed_size INTEGER NOT NULL,
            taken_at INTEGER NOT NULL,
            data BLOB NOT NULL,
            thumbnail BLOB
        );

        CREATE TABLE IF NOT EXISTS reports (
            id TEXT PRIMARY KEY,
            inspection_id TEXT NOT NULL,
            filename TEXT NOT NULL,
            generated_at INTEGER NOT NULL,
            data BLOB NOT NULL,
            share_token TEXT,
            share_expires_at INTEGER
        );

        CREATE TABLE IF NOT EXISTS share_links (
            token TEXT PRIMARY KEY,
            inspection_id TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            expires_at INTEGER NOT NULL,
            accessed INTEGER NOT NULL DEFAULT 0,
            access_count INTEGER NOT NULL DEFAULT 0
        );

        -- Indexes for the secondary lookups
        CREATE INDEX IF NOT EXISTS idx_inspections_created_at ON inspections(created_at);
        CREATE INDEX IF NOT EXISTS idx_inspections_status ON inspections(status);

        CREATE INDEX IF NOT EXISTS idx_rooms_inspection_id ON rooms(inspection_id);

        CREATE INDEX IF NOT EXISTS idx_items_room_id ON inspection_items(room_id);

        CREATE INDEX IF NOT EXISTS idx_photos_inspection_id ON photos(inspection_id);
        CREATE INDEX IF NOT EXISTS idx_photos_room_id ON photos(room_id);
        CREATE INDEX IF NOT EXISTS idx_photos_item_id ON photos(item_id);

        CREATE INDEX IF NOT EXISTS idx_reports_inspection_id ON reports(inspection_id);
        CREATE INDEX IF NOT EXISTS idx_reports_share_token ON reports(share_token);

        CREATE INDEX IF NOT EXISTS idx_share_links_inspection_id ON share_links(inspection_id);
        CREATE INDEX IF NOT EXISTS idx_share_links_expires_at ON share_links(expires_at);
        "#,
    )?;

    // Set schema version
    conn.execute(
        "INSERT OR REPLACE INTO schema_info (key, value) VALUES ('version', ?)",
        [SCHEMA_VERSION.to_string()],
    )?;

    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> Result<Option<i32>> {
    let mut stmt = conn.prepare("SELECT value FROM schema_info WHERE key = 'version'")?;
    let result: Result<String> = stmt.query_row([], |row| row.get(0));

    match result {
        Ok(version_str) => Ok(version_str.parse().ok()),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Check if schema needs initialization or migration
pub fn needs_init(conn: &Connection) -> bool {
    let table_exists: bool = conn
        .prepare("SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_info'")
        .and_then(|mut stmt| stmt.exists([]))
        .unwrap_or(false);

    if !table_exists {
        return true;
    }

    match get_schema_version(conn) {
        Ok(Some(v)) => v < SCHEMA_VERSION,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        for table in ENTITY_TABLES {
            assert!(tables.contains(&table.to_string()), "missing table {table}");
        }
    }

    #[test]
    fn test_schema_version() {
        let conn = Connection::open_in_memory().unwrap();

        assert!(needs_init(&conn));

        init_schema(&conn).unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), Some(SCHEMA_VERSION));
        assert!(!needs_init(&conn));
    }

    #[test]
    fn test_init_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), Some(SCHEMA_VERSION));
    }

    #[test]
    fn test_indexes_exist() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let indexes: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='index' AND name LIKE 'idx_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(indexes.contains(&"idx_rooms_inspection_id".to_string()));
        assert!(indexes.contains(&"idx_items_room_id".to_string()));
        assert!(indexes.contains(&"idx_photos_room_id".to_string()));
        assert!(indexes.contains(&"idx_reports_share_token".to_string()));
        assert!(indexes.contains(&"idx_share_links_expires_at".to_string()));
    }
}
