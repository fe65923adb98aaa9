//! Checklist item command handlers

use anyhow::{bail, Context, Result};

use moveout_core::models::ItemUpdate;
use moveout_core::{Condition, Store};

use crate::commands::{resolve_item, resolve_room};
use crate::output::Output;

/// Add a custom checklist item to a room
pub fn add(store: &mut Store, room_id: String, name: String, output: &Output) -> Result<()> {
    let room_id = resolve_room(store, &room_id)?;
    let item = store
        .add_item(room_id, &name)
        .context("Failed to add item")?;

    output.success(&format!("Added item: {}", item.name));
    output.print_item(&item);
    Ok(())
}

/// Rate an item and stamp it as checked
pub fn check(
    store: &mut Store,
    id: String,
    condition: Condition,
    notes: Option<String>,
    output: &Output,
) -> Result<()> {
    let uuid = resolve_item(store, &id)?;
    let item = store
        .check_item(uuid, condition, notes)
        .context("Failed to check item")?;
    let progress = store.room_progress(item.room_id)?;

    output.success(&format!(
        "Checked {} as {} (room {}% done)",
        item.name,
        item.condition.label(),
        progress
    ));
    output.print_item(&item);
    Ok(())
}

/// Clear an item's checked stamp
pub fn uncheck(store: &mut Store, id: String, output: &Output) -> Result<()> {
    let uuid = resolve_item(store, &id)?;
    let item = store.uncheck_item(uuid).context("Failed to uncheck item")?;

    output.success(&format!("Unchecked {}", item.name));
    Ok(())
}

/// Rename an item or change its condition or notes without checking it
pub fn update(
    store: &mut Store,
    id: String,
    name: Option<String>,
    condition: Option<Condition>,
    notes: Option<String>,
    clear_notes: bool,
    output: &Output,
) -> Result<()> {
    let uuid = resolve_item(store, &id)?;

    let update = ItemUpdate {
        name,
        condition,
        notes: if clear_notes { Some(None) } else { notes.map(Some) },
        checked_at: None,
    };
    if update.name.is_none() && update.condition.is_none() && update.notes.is_none() {
        bail!("Nothing to update. Pass --name, --condition, --notes or --clear-notes.");
    }

    let item = store
        .update_item(uuid, update)
        .context("Failed to update item")?;

    output.success("Item updated");
    output.print_item(&item);
    Ok(())
}
