//! Moveout CLI
//!
//! Command-line interface for moveout - move-out inspections, photo
//! evidence, PDF reports and share links.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use moveout_core::{
    Condition, Config, InspectionStatus, ReportError, RoomType, ShareError, StorageError, Store,
};

mod commands;
mod editor;
mod output;

use commands::photo::PhotoTarget;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "moveout")]
#[command(about = "Moveout - document rental move-out inspections")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use a specific config file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Debug logging (MOVEOUT_LOG overrides the level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage inspections
    #[command(alias = "i")]
    Inspection {
        #[command(subcommand)]
        command: InspectionCommands,
    },
    /// Manage rooms of an inspection
    Room {
        #[command(subcommand)]
        command: RoomCommands,
    },
    /// Rate checklist items
    Item {
        #[command(subcommand)]
        command: ItemCommands,
    },
    /// Add and export photo evidence
    Photo {
        #[command(subcommand)]
        command: PhotoCommands,
    },
    /// Generate and export PDF reports
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Manage expiring share links
    Share {
        #[command(subcommand)]
        command: ShareCommands,
    },
    /// Show room templates and their default checklists
    Templates {
        /// Room type (e.g. kitchen, living-room)
        room_type: Option<RoomType>,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Show storage status and counts
    Status,
}

#[derive(Subcommand)]
enum InspectionCommands {
    /// Start a new inspection
    #[command(alias = "new")]
    Create {
        /// Property address
        address: String,
        /// Inspection date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
        /// General notes
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// List inspections, newest first
    #[command(alias = "ls")]
    List,
    /// Show an inspection with its rooms
    Show {
        /// Inspection ID (full UUID or prefix)
        id: String,
    },
    /// Update an inspection
    Update {
        /// Inspection ID (full UUID or prefix)
        id: String,
        #[arg(long)]
        address: Option<String>,
        /// New date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
        #[arg(long, conflicts_with = "clear_notes")]
        notes: Option<String>,
        #[arg(long)]
        clear_notes: bool,
        /// draft, in-progress, completed or shared
        #[arg(long)]
        status: Option<InspectionStatus>,
    },
    /// Delete an inspection and everything attached to it
    #[command(alias = "rm")]
    Delete {
        /// Inspection ID (full UUID or prefix)
        id: String,
    },
    /// Show completion percentages
    Progress {
        /// Inspection ID (full UUID or prefix)
        id: String,
    },
}

#[derive(Subcommand)]
enum RoomCommands {
    /// Add a room seeded with its template checklist
    Add {
        /// Inspection ID (full UUID or prefix)
        inspection: String,
        /// Room type (see `moveout templates`)
        room_type: RoomType,
        /// Room name (defaults to the template name)
        #[arg(short, long)]
        name: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List rooms of an inspection
    #[command(alias = "ls")]
    List {
        /// Inspection ID (full UUID or prefix)
        inspection: String,
    },
    /// Show a room and its checklist
    Show {
        /// Room ID (full UUID or prefix)
        id: String,
    },
    /// Update a room
    Update {
        /// Room ID (full UUID or prefix)
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "type")]
        room_type: Option<RoomType>,
        #[arg(long, conflicts_with_all = ["clear_notes", "edit"])]
        notes: Option<String>,
        #[arg(long, conflicts_with = "edit")]
        clear_notes: bool,
        /// Edit notes in $EDITOR
        #[arg(short, long)]
        edit: bool,
    },
    /// Mark a room as complete
    Complete {
        /// Room ID (full UUID or prefix)
        id: String,
    },
}

#[derive(Subcommand)]
enum ItemCommands {
    /// Add a custom checklist item
    Add {
        /// Room ID (full UUID or prefix)
        room: String,
        /// Item name
        name: String,
    },
    /// Rate an item and mark it checked
    Check {
        /// Item ID (full UUID or prefix)
        id: String,
        /// good, fair, poor or damaged
        condition: Condition,
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Clear an item's checked mark
    Uncheck {
        /// Item ID (full UUID or prefix)
        id: String,
    },
    /// Update an item without checking it
    Update {
        /// Item ID (full UUID or prefix)
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        condition: Option<Condition>,
        #[arg(long, conflicts_with = "clear_notes")]
        notes: Option<String>,
        #[arg(long)]
        clear_notes: bool,
    },
}

#[derive(Subcommand)]
enum PhotoCommands {
    /// Compress, watermark and store image files
    Add {
        /// Inspection ID (full UUID or prefix)
        inspection: String,
        /// Image files (JPEG or PNG)
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Attach to a room
        #[arg(long)]
        room: Option<String>,
        /// Attach to a checklist item
        #[arg(long)]
        item: Option<String>,
        /// Condition shown on the watermark
        #[arg(short, long)]
        condition: Option<Condition>,
    },
    /// List photos
    #[command(alias = "ls")]
    List {
        /// Inspection ID (full UUID or prefix)
        inspection: String,
        #[arg(long)]
        room: Option<String>,
        #[arg(long)]
        item: Option<String>,
    },
    /// Write a stored photo to disk
    Export {
        /// Photo ID (full UUID or prefix)
        id: String,
        /// Destination file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Export the thumbnail instead
        #[arg(long)]
        thumbnail: bool,
        /// Open after writing
        #[arg(long)]
        open: bool,
    },
}

#[derive(Subcommand)]
enum ReportCommands {
    /// Generate a PDF report and mark the inspection completed
    Generate {
        /// Inspection ID (full UUID or prefix)
        inspection: String,
        /// Also write the PDF to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Open after writing
        #[arg(long)]
        open: bool,
    },
    /// List reports of an inspection
    #[command(alias = "ls")]
    List {
        /// Inspection ID (full UUID or prefix)
        inspection: String,
    },
    /// Write a stored report to disk
    Export {
        /// Report ID (full UUID or prefix)
        id: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        open: bool,
    },
}

#[derive(Subcommand)]
enum ShareCommands {
    /// Share an inspection's newest report (generating one if needed)
    Create {
        /// Inspection ID (full UUID or prefix)
        inspection: String,
    },
    /// Create a link for a specific report
    Link {
        /// Inspection ID (full UUID or prefix)
        inspection: String,
        /// Report ID (full UUID or prefix)
        report: String,
    },
    /// Fetch a shared report as a recipient would
    Open {
        /// Share token or URL
        token: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Open the PDF after writing
        #[arg(long)]
        launch: bool,
    },
    /// Show a link's state without counting an access
    Info {
        /// Share token or URL
        token: String,
    },
    /// Revoke a link
    Revoke {
        /// Share token or URL
        token: String,
    },
    /// Delete expired links
    Cleanup,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, share_origin, share_expiry_days, brand_label, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        if let Some(hint) = error_hint(&e) {
            eprintln!("Hint: {}", hint);
        }
        std::process::exit(1);
    }
}

/// The storage failure behind an error, looking through share and report errors
fn storage_cause(error: &anyhow::Error) -> Option<&StorageError> {
    error.chain().find_map(|cause| {
        if let Some(storage) = cause.downcast_ref::<StorageError>() {
            return Some(storage);
        }
        match cause.downcast_ref::<ShareError>() {
            Some(ShareError::Storage(storage)) => return Some(storage),
            Some(_) => return None,
            None => {}
        }
        match cause.downcast_ref::<ReportError>() {
            Some(ReportError::Storage(storage)) => Some(storage),
            _ => None,
        }
    })
}

/// What the user can do about a storage failure, if anything
fn error_hint(error: &anyhow::Error) -> Option<String> {
    let storage = storage_cause(error)?;
    let suggestion = storage.recovery_suggestion()?;
    if storage.is_recoverable() {
        Some(suggestion.to_string())
    } else {
        Some(format!(
            "{} The data directory is shown by 'moveout config show'.",
            suggestion
        ))
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    // Commands that don't need the store
    match &cli.command {
        Commands::Config { command } => {
            return handle_config_command(command.clone(), config_path, &output);
        }
        Commands::Templates { room_type } => {
            return commands::templates::show(*room_type, &output);
        }
        _ => {}
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    init_logging(&config, cli.verbose);

    let mut store = Store::open_with_config(config)?;

    match cli.command {
        Commands::Inspection { command } => handle_inspection_command(command, &mut store, &output),
        Commands::Room { command } => handle_room_command(command, &mut store, &output),
        Commands::Item { command } => handle_item_command(command, &mut store, &output),
        Commands::Photo { command } => handle_photo_command(command, &mut store, &output).await,
        Commands::Report { command } => handle_report_command(command, &mut store, &output).await,
        Commands::Share { command } => handle_share_command(command, &mut store, &output),
        Commands::Status => commands::status::show(&store, &output),
        Commands::Config { .. } | Commands::Templates { .. } => Ok(()), // Handled above
    }
}

fn handle_inspection_command(
    command: InspectionCommands,
    store: &mut Store,
    output: &Output,
) -> Result<()> {
    use commands::inspection;

    match command {
        InspectionCommands::Create {
            address,
            date,
            notes,
        } => inspection::create(store, address, date, notes, output),
        InspectionCommands::List => inspection::list(store, output),
        InspectionCommands::Show { id } => inspection::show(store, id, output),
        InspectionCommands::Update {
            id,
            address,
            date,
            notes,
            clear_notes,
            status,
        } => inspection::update(store, id, address, date, notes, clear_notes, status, output),
        InspectionCommands::Delete { id } => inspection::delete(store, id, output),
        InspectionCommands::Progress { id } => inspection::progress(store, id, output),
    }
}

fn handle_room_command(command: RoomCommands, store: &mut Store, output: &Output) -> Result<()> {
    use commands::room;

    match command {
        RoomCommands::Add {
            inspection,
            room_type,
            name,
            notes,
        } => room::add(store, inspection, room_type, name, notes, output),
        RoomCommands::List { inspection } => room::list(store, inspection, output),
        RoomCommands::Show { id } => room::show(store, id, output),
        RoomCommands::Update {
            id,
            name,
            room_type,
            notes,
            clear_notes,
            edit,
        } => room::update(store, id, name, room_type, notes, clear_notes, edit, output),
        RoomCommands::Complete { id } => room::complete(store, id, output),
    }
}

fn handle_item_command(command: ItemCommands, store: &mut Store, output: &Output) -> Result<()> {
    use commands::item;

    match command {
        ItemCommands::Add { room, name } => item::add(store, room, name, output),
        ItemCommands::Check {
            id,
            condition,
            notes,
        } => item::check(store, id, condition, notes, output),
        ItemCommands::Uncheck { id } => item::uncheck(store, id, output),
        ItemCommands::Update {
            id,
            name,
            condition,
            notes,
            clear_notes,
        } => item::update(store, id, name, condition, notes, clear_notes, output),
    }
}

async fn handle_photo_command(
    command: PhotoCommands,
    store: &mut Store,
    output: &Output,
) -> Result<()> {
    use commands::photo;

    match command {
        PhotoCommands::Add {
            inspection,
            files,
            room,
            item,
            condition,
        } => {
            let target = PhotoTarget {
                inspection,
                room,
                item,
            };
            photo::add(store, target, files, condition, output).await
        }
        PhotoCommands::List {
            inspection,
            room,
            item,
        } => photo::list(store, inspection, room, item, output),
        PhotoCommands::Export {
            id,
            output: dest,
            thumbnail,
            open,
        } => photo::export(store, id, dest, thumbnail, open, output),
    }
}

async fn handle_report_command(
    command: ReportCommands,
    store: &mut Store,
    output: &Output,
) -> Result<()> {
    use commands::report;

    match command {
        ReportCommands::Generate {
            inspection,
            output: dest,
            open,
        } => report::generate(store, inspection, dest, open, output).await,
        ReportCommands::List { inspection } => report::list(store, inspection, output),
        ReportCommands::Export {
            id,
            output: dest,
            open,
        } => report::export(store, id, dest, open, output),
    }
}

fn handle_share_command(command: ShareCommands, store: &mut Store, output: &Output) -> Result<()> {
    use commands::share;

    match command {
        ShareCommands::Create { inspection } => share::create(store, inspection, output),
        ShareCommands::Link { inspection, report } => {
            share::link(store, inspection, report, output)
        }
        ShareCommands::Open {
            token,
            output: dest,
            launch,
        } => share::open(store, token, dest, launch, output),
        ShareCommands::Info { token } => share::info(store, token, output),
        ShareCommands::Revoke { token } => share::revoke(store, token, output),
        ShareCommands::Cleanup => share::cleanup(store, output),
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Initialize logging
///
/// Level is `warn`, or `debug` with `--verbose`; MOVEOUT_LOG overrides
/// both. Logs go to `config.log_file` when set, otherwise stderr.
fn init_logging(config: &Config, verbose: bool) {
    let log_level = std::env::var("MOVEOUT_LOG")
        .unwrap_or_else(|_| if verbose { "debug" } else { "warn" }.to_string());
    let env_filter = EnvFilter::new(format!(
        "moveout_core={},moveout_cli={}",
        log_level, log_level
    ));

    if let Some(ref log_path) = config.log_file {
        match OpenOptions::new().create(true).append(true).open(log_path) {
            Ok(file) => {
                // Ignore error if already initialized
                let _ = tracing_subscriber::fmt()
                    .with_env_filter(env_filter)
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .try_init();
                info!("Logging to {:?}", log_path);
                return;
            }
            Err(e) => {
                eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
            }
        }
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_item_check() {
        let cli = Cli::try_parse_from([
            "moveout", "--json", "item", "check", "1a2b3c", "damaged", "--notes", "Cracked tile",
        ])
        .unwrap();

        assert!(cli.json);
        match cli.command {
            Commands::Item {
                command:
                    ItemCommands::Check {
                        id,
                        condition,
                        notes,
                    },
            } => {
                assert_eq!(id, "1a2b3c");
                assert_eq!(condition, Condition::Damaged);
                assert_eq!(notes.as_deref(), Some("Cracked tile"));
            }
            _ => panic!("expected item check"),
        }
    }

    #[test]
    fn test_unknown_room_type_is_rejected() {
        assert!(Cli::try_parse_from(["moveout", "room", "add", "abc", "attic"]).is_err());
        assert!(Cli::try_parse_from(["moveout", "room", "add", "abc", "living-room"]).is_ok());
    }

    #[test]
    fn test_error_hint_looks_through_wrapped_storage_errors() {
        let err = anyhow::Error::from(ShareError::Storage(StorageError::validation(
            "property_address",
            "must not be empty",
        )))
        .context("Failed to create share link");
        assert_eq!(
            error_hint(&err).as_deref(),
            Some("Provide a non-empty value and try again.")
        );

        let err = anyhow::Error::from(ReportError::Storage(StorageError::CreateDirectory {
            path: PathBuf::from("/nowhere"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "boom"),
        }));
        let hint = error_hint(&err).unwrap();
        assert!(hint.starts_with("Check that the parent directory exists"));
        assert!(hint.contains("moveout config show"));
    }

    #[test]
    fn test_error_hint_absent_without_suggestion() {
        let err = anyhow::Error::from(StorageError::not_found("room", "abc"));
        assert!(error_hint(&err).is_none());

        let err = anyhow::Error::from(ShareError::ExpiryOutOfRange { days: 1 });
        assert!(error_hint(&err).is_none());
        assert!(error_hint(&anyhow::anyhow!("plain failure")).is_none());
    }
}
