//! Room command handlers

use anyhow::{bail, Context, Result};

use moveout_core::models::RoomUpdate;
use moveout_core::{NewRoom, RoomType, Store};

use crate::commands::{resolve_inspection, resolve_room};
use crate::editor::edit_notes;
use crate::output::{Output, RoomDetail};

/// Add a room; its checklist is seeded from the room type's template
pub fn add(
    store: &mut Store,
    inspection_id: String,
    room_type: RoomType,
    name: Option<String>,
    notes: Option<String>,
    output: &Output,
) -> Result<()> {
    let inspection_id = resolve_inspection(store, &inspection_id)?;

    let mut new = NewRoom::new(inspection_id, room_type);
    if let Some(name) = name {
        new = new.named(name);
    }
    if let Some(notes) = notes {
        new = new.with_notes(notes);
    }

    let room = store.add_room(new).context("Failed to add room")?;
    let items = store.items_for_room(room.id)?;

    output.success(&format!(
        "Added room: {} ({} checklist items)",
        room.name,
        items.len()
    ));
    output.print_room(&RoomDetail {
        room: &room,
        progress: 0,
        items: &items,
    });
    Ok(())
}

/// List rooms of an inspection in creation order
pub fn list(store: &Store, inspection_id: String, output: &Output) -> Result<()> {
    let inspection_id = resolve_inspection(store, &inspection_id)?;
    store.require_inspection(inspection_id)?;

    let mut rooms = Vec::new();
    for room in store.rooms_for_inspection(inspection_id)? {
        let progress = store.room_progress(room.id)?;
        rooms.push((room, progress));
    }

    output.print_rooms(&rooms);
    Ok(())
}

/// Show a room and its checklist
pub fn show(store: &Store, id: String, output: &Output) -> Result<()> {
    let uuid = resolve_room(store, &id)?;
    let room = store.require_room(uuid)?;
    let items = store.items_for_room(uuid)?;
    let progress = store.room_progress(uuid)?;

    output.print_room(&RoomDetail {
        room: &room,
        progress,
        items: &items,
    });
    Ok(())
}

/// Update room fields; `--edit` opens the notes in $EDITOR
#[allow(clippy::too_many_arguments)]
pub fn update(
    store: &mut Store,
    id: String,
    name: Option<String>,
    room_type: Option<RoomType>,
    notes: Option<String>,
    clear_notes: bool,
    edit: bool,
    output: &Output,
) -> Result<()> {
    let uuid = resolve_room(store, &id)?;

    let notes = if edit {
        let room = store.require_room(uuid)?;
        Some(edit_notes(&room.name, room.notes.as_deref())?)
    } else if clear_notes {
        Some(None)
    } else {
        notes.map(Some)
    };

    if name.is_none() && room_type.is_none() && notes.is_none() {
        bail!("Nothing to update. Pass --name, --type, --notes, --clear-notes or --edit.");
    }

    let room = store
        .update_room(
            uuid,
            RoomUpdate {
                name,
                room_type,
                notes,
                completed_at: None,
            },
        )
        .context("Failed to update room")?;

    output.success(&format!("Updated room: {}", room.name));
    Ok(())
}

/// Mark a room as complete
pub fn complete(store: &mut Store, id: String, output: &Output) -> Result<()> {
    let uuid = resolve_room(store, &id)?;
    let room = store.complete_room(uuid).context("Failed to complete room")?;
    let progress = store.room_progress(uuid)?;

    if progress < 100 {
        output.message(&format!(
            "Note: {} is only {}% checked",
            room.name, progress
        ));
    }
    output.success(&format!("Completed room: {}", room.name));
    Ok(())
}
