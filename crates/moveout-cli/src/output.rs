//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use serde::Serialize;
use uuid::Uuid;

use moveout_core::{Inspection, InspectionItem, Photo, Report, Room, ShareLinkInfo};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// A room together with its checklist, as printed by `room show`
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetail<'a> {
    #[serde(flatten)]
    pub room: &'a Room,
    pub progress: u8,
    pub items: &'a [InspectionItem],
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Pretty-print any serializable value as JSON
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("Failed to serialize output: {}", e),
        }
    }

    /// Print a single inspection with its overall progress
    pub fn print_inspection(&self, inspection: &Inspection, progress: u8) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:       {}", inspection.id);
                println!("Address:  {}", inspection.property_address);
                println!("Date:     {}", inspection.inspection_date.format("%Y-%m-%d"));
                println!("Status:   {}", inspection.status.label());
                println!("Progress: {}%", progress);
                if let Some(ref notes) = inspection.notes {
                    println!("Notes:    {}", notes);
                }
                println!(
                    "Created:  {}",
                    inspection.created_at.format("%Y-%m-%d %H:%M")
                );
                println!(
                    "Updated:  {}",
                    inspection.updated_at.format("%Y-%m-%d %H:%M")
                );
            }
            OutputFormat::Json => self.json(&serde_json::json!({
                "inspection": inspection,
                "progress": progress,
            })),
            OutputFormat::Quiet => println!("{}", inspection.id),
        }
    }

    /// Print a list of inspections
    pub fn print_inspections(&self, inspections: &[Inspection]) {
        match self.format {
            OutputFormat::Human => {
                if inspections.is_empty() {
                    println!("No inspections found.");
                    return;
                }
                for inspection in inspections {
                    println!(
                        "{} | {} | {:<11} | {}",
                        short_id(&inspection.id),
                        inspection.inspection_date.format("%Y-%m-%d"),
                        inspection.status.label(),
                        truncate(&inspection.property_address, 45)
                    );
                }
                println!("\n{} inspection(s)", inspections.len());
            }
            OutputFormat::Json => self.json(inspections),
            OutputFormat::Quiet => {
                for inspection in inspections {
                    println!("{}", inspection.id);
                }
            }
        }
    }

    /// Print rooms with their progress
    pub fn print_rooms(&self, rooms: &[(Room, u8)]) {
        match self.format {
            OutputFormat::Human => {
                if rooms.is_empty() {
                    println!("No rooms yet.");
                    return;
                }
                for (room, progress) in rooms {
                    let done = if room.completed_at.is_some() { " ✓" } else { "" };
                    println!(
                        "{} | {:<24} | {:<12} | {:>3}%{}",
                        short_id(&room.id),
                        truncate(&room.name, 24),
                        room.room_type.label(),
                        progress,
                        done
                    );
                }
                println!("\n{} room(s)", rooms.len());
            }
            OutputFormat::Json => {
                let rooms: Vec<_> = rooms
                    .iter()
                    .map(|(room, progress)| {
                        serde_json::json!({ "room": room, "progress": progress })
                    })
                    .collect();
                self.json(&rooms);
            }
            OutputFormat::Quiet => {
                for (room, _) in rooms {
                    println!("{}", room.id);
                }
            }
        }
    }

    /// Print a room and its checklist
    pub fn print_room(&self, detail: &RoomDetail<'_>) {
        match self.format {
            OutputFormat::Human => {
                let room = detail.room;
                println!("ID:       {}", room.id);
                println!("Name:     {}", room.name);
                println!("Type:     {}", room.room_type.label());
                println!("Progress: {}%", detail.progress);
                if let Some(ref notes) = room.notes {
                    println!("Notes:    {}", notes);
                }
                if let Some(completed_at) = room.completed_at {
                    println!("Complete: {}", completed_at.format("%Y-%m-%d %H:%M"));
                }
                println!();
                println!("── Items ({}) ──", detail.items.len());
                for item in detail.items {
                    print_item_line(item);
                }
            }
            OutputFormat::Json => self.json(detail),
            OutputFormat::Quiet => println!("{}", detail.room.id),
        }
    }

    /// Print a single checklist item
    pub fn print_item(&self, item: &InspectionItem) {
        match self.format {
            OutputFormat::Human => print_item_line(item),
            OutputFormat::Json => self.json(item),
            OutputFormat::Quiet => println!("{}", item.id),
        }
    }

    /// Print photo metadata (never the image bytes)
    pub fn print_photos(&self, photos: &[Photo]) {
        match self.format {
            OutputFormat::Human => {
                if photos.is_empty() {
                    println!("No photos found.");
                    return;
                }
                for photo in photos {
                    println!(
                        "{} | {} | {:>8} | {}",
                        short_id(&photo.id),
                        photo.taken_at.format("%Y-%m-%d %H:%M"),
                        human_size(photo.compressed_size),
                        truncate(&photo.filename, 40)
                    );
                }
                println!("\n{} photo(s)", photos.len());
            }
            OutputFormat::Json => self.json(photos),
            OutputFormat::Quiet => {
                for photo in photos {
                    println!("{}", photo.id);
                }
            }
        }
    }

    /// Print report metadata (never the PDF bytes)
    pub fn print_reports(&self, reports: &[Report]) {
        match self.format {
            OutputFormat::Human => {
                if reports.is_empty() {
                    println!("No reports generated yet.");
                    return;
                }
                for report in reports {
                    let shared = match (&report.share_token, report.share_expires_at) {
                        (Some(_), Some(expires)) => {
                            format!(" (shared until {})", expires.format("%Y-%m-%d %H:%M"))
                        }
                        (Some(_), None) => " (shared)".to_string(),
                        _ => String::new(),
                    };
                    println!(
                        "{} | {} | {:>8} | {}{}",
                        short_id(&report.id),
                        report.generated_at.format("%Y-%m-%d %H:%M"),
                        human_size(report.data.len() as u64),
                        report.filename,
                        shared
                    );
                }
                println!("\n{} report(s)", reports.len());
            }
            OutputFormat::Json => self.json(reports),
            OutputFormat::Quiet => {
                for report in reports {
                    println!("{}", report.id);
                }
            }
        }
    }

    /// Print share link state
    pub fn print_share_info(&self, token: &str, info: &ShareLinkInfo) {
        match self.format {
            OutputFormat::Human => {
                if !info.exists {
                    println!("No share link with token {}", token);
                    return;
                }
                println!("Token:    {}", token);
                println!(
                    "Status:   {}",
                    if info.expired { "expired" } else { "active" }
                );
                println!("Accessed: {} time(s)", info.access_count);
                if let Some(expires_at) = info.expires_at {
                    println!("Expires:  {}", expires_at.format("%Y-%m-%d %H:%M"));
                }
            }
            OutputFormat::Json => self.json(info),
            OutputFormat::Quiet => println!("{}", info.exists && !info.expired),
        }
    }

    /// Print a share URL; quiet mode prints just the URL
    pub fn print_url(&self, url: &str) {
        match self.format {
            OutputFormat::Human => {
                println!("Share link: {}", url);
            }
            OutputFormat::Json => self.json(&serde_json::json!({ "url": url })),
            OutputFormat::Quiet => println!("{}", url),
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_item_line(item: &InspectionItem) {
    let checked = match item.checked_at {
        Some(at) => at.format("%Y-%m-%d %H:%M").to_string(),
        None => "Not checked".to_string(),
    };
    println!(
        "{} | {:<28} | {:<7} | {:<16} | {}",
        short_id(&item.id),
        truncate(&item.name, 28),
        item.condition.label(),
        checked,
        item.notes.as_deref().map(|n| truncate_line(n, 40)).unwrap_or_default()
    );
}

/// First 8 characters of a UUID, enough to pass back as a prefix
pub fn short_id(id: &Uuid) -> String {
    id.to_string()[..8].to_string()
}

/// Format bytes as human-readable size
pub fn human_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Truncate to first line and max length
fn truncate_line(s: &str, max_len: usize) -> String {
    let first_line = s.lines().next().unwrap_or("");
    truncate(first_line, max_len)
}
