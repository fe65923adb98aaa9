//! Inspection command handlers

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate, Utc};

use moveout_core::models::InspectionUpdate;
use moveout_core::{InspectionStatus, NewInspection, Store};

use crate::commands::resolve_inspection;
use crate::editor::confirm;
use crate::output::{Output, OutputFormat};

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}'. Use YYYY-MM-DD.", value))
}

/// Create a new inspection; the date defaults to today
pub fn create(
    store: &mut Store,
    address: String,
    date: Option<String>,
    notes: Option<String>,
    output: &Output,
) -> Result<()> {
    let date = match date {
        Some(ref d) => parse_date(d)?,
        None => Local::now().date_naive(),
    };

    let mut new = NewInspection::new(address, date);
    if let Some(notes) = notes {
        new = new.with_notes(notes);
    }

    let inspection = store
        .create_inspection(new)
        .context("Failed to create inspection")?;

    output.success(&format!("Created inspection: {}", inspection.id));
    output.print_inspection(&inspection, 0);
    Ok(())
}

/// List all inspections, newest first
pub fn list(store: &Store, output: &Output) -> Result<()> {
    let inspections = store.list_inspections()?;
    output.print_inspections(&inspections);
    Ok(())
}

/// Show an inspection with its rooms
pub fn show(store: &Store, id: String, output: &Output) -> Result<()> {
    let uuid = resolve_inspection(store, &id)?;
    let inspection = store.require_inspection(uuid)?;
    let progress = store.inspection_progress(uuid)?;

    let mut rooms = Vec::new();
    for room in store.rooms_for_inspection(uuid)? {
        let room_progress = store.room_progress(room.id)?;
        rooms.push((room, room_progress));
    }
    let share_links = store.share_links_for_inspection(uuid)?;

    match output.format {
        OutputFormat::Json => output.json(&serde_json::json!({
            "inspection": inspection,
            "progress": progress,
            "rooms": rooms
                .iter()
                .map(|(room, p)| serde_json::json!({ "room": room, "progress": p }))
                .collect::<Vec<_>>(),
            "photos": store.photos_for_inspection(uuid)?.len(),
            "reports": store.reports_for_inspection(uuid)?.len(),
            "shareLinks": share_links,
        })),
        OutputFormat::Quiet => println!("{}", inspection.id),
        OutputFormat::Human => {
            output.print_inspection(&inspection, progress);
            println!();
            println!("── Rooms ({}) ──", rooms.len());
            output.print_rooms(&rooms);

            if !share_links.is_empty() {
                let now = Utc::now();
                println!();
                println!("── Share links ({}) ──", share_links.len());
                for link in &share_links {
                    let state = if link.is_expired_at(now) { "expired" } else { "active" };
                    println!(
                        "  {}  {:<7}  expires {}  viewed {}x",
                        link.token,
                        state,
                        link.expires_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                        link.access_count
                    );
                }
            }
        }
    }
    Ok(())
}

/// Update inspection fields
#[allow(clippy::too_many_arguments)]
pub fn update(
    store: &mut Store,
    id: String,
    address: Option<String>,
    date: Option<String>,
    notes: Option<String>,
    clear_notes: bool,
    status: Option<InspectionStatus>,
    output: &Output,
) -> Result<()> {
    let uuid = resolve_inspection(store, &id)?;

    let update = InspectionUpdate {
        property_address: address,
        inspection_date: date.as_deref().map(parse_date).transpose()?,
        notes: if clear_notes { Some(None) } else { notes.map(Some) },
        status,
    };

    if update.is_empty() {
        bail!("Nothing to update. Pass --address, --date, --notes, --clear-notes or --status.");
    }

    let inspection = store
        .update_inspection(uuid, update)
        .context("Failed to update inspection")?;
    let progress = store.inspection_progress(uuid)?;

    output.success("Inspection updated");
    output.print_inspection(&inspection, progress);
    Ok(())
}

/// Delete an inspection and everything that belongs to it
pub fn delete(store: &mut Store, id: String, output: &Output) -> Result<()> {
    let uuid = resolve_inspection(store, &id)?;
    let inspection = store.require_inspection(uuid)?;

    if output.should_prompt() {
        println!(
            "Delete inspection: {} - {}",
            &inspection.id.to_string()[..8],
            inspection.property_address
        );
        println!("All rooms, items, photos, reports and share links will be removed.");
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let summary = store
        .delete_inspection(uuid)
        .context("Failed to delete inspection")?;

    if output.is_json() {
        output.json(&serde_json::json!({
            "deleted": uuid,
            "rooms": summary.rooms,
            "items": summary.items,
            "photos": summary.photos,
            "reports": summary.reports,
            "shareLinks": summary.share_links,
        }));
    } else {
        output.success(&format!(
            "Deleted inspection {} ({} rooms, {} items, {} photos, {} reports, {} share links)",
            uuid, summary.rooms, summary.items, summary.photos, summary.reports, summary.share_links
        ));
    }
    Ok(())
}

/// Show completion percentages
pub fn progress(store: &Store, id: String, output: &Output) -> Result<()> {
    let uuid = resolve_inspection(store, &id)?;
    let overall = store.inspection_progress(uuid)?;
    let rooms = store.rooms_for_inspection(uuid)?;

    match output.format {
        OutputFormat::Json => {
            let mut per_room = Vec::new();
            for room in &rooms {
                per_room.push(serde_json::json!({
                    "roomId": room.id,
                    "name": room.name,
                    "progress": store.room_progress(room.id)?,
                }));
            }
            output.json(&serde_json::json!({ "progress": overall, "rooms": per_room }));
        }
        OutputFormat::Quiet => println!("{}", overall),
        OutputFormat::Human => {
            for room in &rooms {
                println!("{:<24} {:>3}%", room.name, store.room_progress(room.id)?);
            }
            if !rooms.is_empty() {
                println!();
            }
            println!("Overall: {}%", overall);
        }
    }
    Ok(())
}
