//! Command handlers
//!
//! IDs on the command line may be a full UUID or any unique prefix of one,
//! as printed in the short listings.

pub mod config;
pub mod inspection;
pub mod item;
pub mod photo;
pub mod report;
pub mod room;
pub mod share;
pub mod status;
pub mod templates;

use std::path::Path;

use anyhow::{bail, Context, Result};
use uuid::Uuid;

use moveout_core::Store;

/// Pick the single candidate whose ID starts with `prefix`
fn match_prefix(entity: &str, prefix: &str, candidates: &[(Uuid, String)]) -> Result<Uuid> {
    let prefix = prefix.to_lowercase();
    let matches: Vec<_> = candidates
        .iter()
        .filter(|(id, _)| id.to_string().starts_with(&prefix))
        .collect();

    match matches.len() {
        0 => bail!("No {} found matching: {}", entity, prefix),
        1 => Ok(matches[0].0),
        _ => {
            eprintln!("Multiple {}s match '{}':", entity, prefix);
            for (id, label) in &matches {
                eprintln!("  {} - {}", id, label);
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}

/// Resolve an ID, building the candidate list only when `id` is not a full UUID
fn resolve<F>(entity: &str, id: &str, candidates: F) -> Result<Uuid>
where
    F: FnOnce() -> Result<Vec<(Uuid, String)>>,
{
    if let Ok(uuid) = Uuid::parse_str(id) {
        return Ok(uuid);
    }
    match_prefix(entity, id, &candidates()?)
}

pub fn resolve_inspection(store: &Store, id: &str) -> Result<Uuid> {
    resolve("inspection", id, || {
        Ok(store
            .list_inspections()?
            .into_iter()
            .map(|i| (i.id, i.property_address))
            .collect())
    })
}

pub fn resolve_room(store: &Store, id: &str) -> Result<Uuid> {
    resolve("room", id, || {
        let mut rooms = Vec::new();
        for inspection in store.list_inspections()? {
            for room in store.rooms_for_inspection(inspection.id)? {
                rooms.push((room.id, format!("{} ({})", room.name, inspection.property_address)));
            }
        }
        Ok(rooms)
    })
}

pub fn resolve_item(store: &Store, id: &str) -> Result<Uuid> {
    resolve("item", id, || {
        let mut items = Vec::new();
        for inspection in store.list_inspections()? {
            for room in store.rooms_for_inspection(inspection.id)? {
                for item in store.items_for_room(room.id)? {
                    items.push((item.id, format!("{} / {}", room.name, item.name)));
                }
            }
        }
        Ok(items)
    })
}

pub fn resolve_photo(store: &Store, id: &str) -> Result<Uuid> {
    resolve("photo", id, || Ok(store.photo_labels()?))
}

pub fn resolve_report(store: &Store, id: &str) -> Result<Uuid> {
    resolve("report", id, || Ok(store.report_labels()?))
}

/// Write bytes to a file the user asked for
pub fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
    }
    std::fs::write(path, bytes).with_context(|| format!("Failed to write file: {:?}", path))
}

/// Hand a written file to the desktop's default viewer
pub fn open_file(path: &Path) -> Result<()> {
    open::that(path).with_context(|| format!("Failed to open {:?}", path))
}
