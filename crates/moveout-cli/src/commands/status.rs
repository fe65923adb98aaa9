//! Status command handler

use anyhow::Result;

use moveout_core::storage::SCHEMA_VERSION;
use moveout_core::Store;

use crate::output::{human_size, Output, OutputFormat};

/// Show storage location and collection counts
pub fn show(store: &Store, output: &Output) -> Result<()> {
    let config = store.config();
    let counts = store.counts()?;
    let db_path = config.sqlite_path();
    let db_size = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

    match output.format {
        OutputFormat::Json => {
            output.json(&serde_json::json!({
                "database": db_path,
                "database_size": db_size,
                "schema_version": SCHEMA_VERSION,
                "share_origin": config.share_origin,
                "counts": {
                    "inspections": counts.inspections,
                    "rooms": counts.rooms,
                    "items": counts.items,
                    "photos": counts.photos,
                    "reports": counts.reports,
                    "share_links": counts.share_links
                }
            }));
        }
        OutputFormat::Quiet => {
            println!("{}", counts.inspections);
        }
        OutputFormat::Human => {
            println!("Moveout Status");
            println!("==============");
            println!();
            println!("Storage:");
            println!("  Database: {}", db_path.display());
            println!("  Size:     {}", human_size(db_size));
            println!("  Schema:   v{}", SCHEMA_VERSION);
            println!();
            println!("Sharing:");
            println!("  Origin:   {}", config.share_origin);
            println!("  Expiry:   {} day(s)", config.share_expiry_days);
            println!();
            println!("Contents:");
            println!("  Inspections: {}", counts.inspections);
            println!("  Rooms:       {}", counts.rooms);
            println!("  Items:       {}", counts.items);
            println!("  Photos:      {}", counts.photos);
            println!("  Reports:     {}", counts.reports);
            println!("  Share links: {}", counts.share_links);

            if store.is_new() {
                println!();
                println!("No inspections yet. Start one with:");
                println!("  moveout inspection create \"12 Elm Street\"");
            }
        }
    }

    Ok(())
}
