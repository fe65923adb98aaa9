//! Photo command handlers

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use tracing::debug;

use moveout_core::{process_photo, Condition, ImageOptions, NewPhoto, Store};

use crate::commands::{open_file, resolve_inspection, resolve_item, resolve_photo, resolve_room, write_file};
use crate::output::{human_size, Output};

/// Where a new photo is attached
pub struct PhotoTarget {
    pub inspection: String,
    pub room: Option<String>,
    pub item: Option<String>,
}

/// Compress, watermark and store one or more image files
///
/// The watermark condition defaults to the item's current rating, or
/// `good` for room and inspection photos.
pub async fn add(
    store: &mut Store,
    target: PhotoTarget,
    files: Vec<PathBuf>,
    condition: Option<Condition>,
    output: &Output,
) -> Result<()> {
    if files.is_empty() {
        bail!("No image files given");
    }

    let inspection_id = resolve_inspection(store, &target.inspection)?;
    let room_id = target
        .room
        .as_deref()
        .map(|id| resolve_room(store, id))
        .transpose()?;
    let item_id = target
        .item
        .as_deref()
        .map(|id| resolve_item(store, id))
        .transpose()?;

    let condition = match (condition, item_id) {
        (Some(condition), _) => condition,
        (None, Some(item_id)) => store.require_item(item_id)?.condition,
        (None, None) => Condition::Good,
    };

    let options = ImageOptions::from_config(store.config());

    for path in files {
        let raw = tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read image: {:?}", path))?;
        let taken_at = Utc::now();

        let opts = options.clone();
        let processed =
            tokio::task::spawn_blocking(move || process_photo(&raw, condition, taken_at, &opts))
                .await
                .context("Image processing task failed")?
                .with_context(|| format!("Failed to process image: {:?}", path))?;

        debug!(
            width = processed.width,
            height = processed.height,
            "Processed {:?}",
            path
        );

        let photo = store
            .add_photo(NewPhoto {
                inspection_id,
                room_id,
                item_id,
                filename: display_name(&path)?,
                original_size: processed.original_size,
                taken_at,
                data: processed.bytes,
                thumbnail: processed.thumbnail,
            })
            .context("Failed to store photo")?;

        if output.is_quiet() {
            println!("{}", photo.id);
        } else {
            output.success(&format!(
                "Added photo {} ({} -> {})",
                photo.filename,
                human_size(photo.original_size),
                human_size(photo.compressed_size)
            ));
        }
    }

    Ok(())
}

/// List photos of an inspection, narrowed to a room or item when given
pub fn list(
    store: &Store,
    inspection: String,
    room: Option<String>,
    item: Option<String>,
    output: &Output,
) -> Result<()> {
    let photos = if let Some(item) = item {
        store.photos_for_item(resolve_item(store, &item)?)?
    } else if let Some(room) = room {
        store.photos_for_room(resolve_room(store, &room)?)?
    } else {
        store.photos_for_inspection(resolve_inspection(store, &inspection)?)?
    };

    output.print_photos(&photos);
    Ok(())
}

/// Write a stored photo (or its thumbnail) to disk
pub fn export(
    store: &Store,
    id: String,
    dest: Option<PathBuf>,
    thumbnail: bool,
    open: bool,
    output: &Output,
) -> Result<()> {
    let uuid = resolve_photo(store, &id)?;
    let photo = store
        .get_photo(uuid)?
        .ok_or_else(|| anyhow!("Photo not found: {}", id))?;

    let bytes = if thumbnail {
        photo
            .thumbnail
            .as_deref()
            .ok_or_else(|| anyhow!("Photo {} has no thumbnail", photo.filename))?
    } else {
        photo.data.as_slice()
    };

    let dest = dest.unwrap_or_else(|| {
        let stem = Path::new(&photo.filename)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| photo.id.to_string());
        let suffix = if thumbnail { "-thumb" } else { "" };
        PathBuf::from(format!("{}{}.jpg", stem, suffix))
    });

    write_file(&dest, bytes)?;
    output.success(&format!("Wrote {}", dest.display()));

    if open {
        open_file(&dest)?;
    }
    Ok(())
}

fn display_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("Not a file: {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        assert_eq!(
            display_name(Path::new("/tmp/shots/kitchen-sink.png")).unwrap(),
            "kitchen-sink.png"
        );
        assert!(display_name(Path::new("/")).is_err());
    }
}
