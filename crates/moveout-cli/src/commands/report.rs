//! Report command handlers

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;

use moveout_core::report::{render_report, store_report};
use moveout_core::{ReportBuilder, Store};

use crate::commands::{open_file, resolve_inspection, resolve_report, write_file};
use crate::output::{human_size, Output};

/// Build a PDF report, store it and mark the inspection completed
///
/// Data is read from the store first; layout and PDF encoding run on a
/// blocking worker.
pub async fn generate(
    store: &mut Store,
    inspection: String,
    dest: Option<PathBuf>,
    open: bool,
    output: &Output,
) -> Result<()> {
    let inspection_id = resolve_inspection(store, &inspection)?;

    let builder = ReportBuilder::new(store);
    let brand = builder.brand_label().to_string();
    let data = builder.load(inspection_id)?;
    let generated_at = Utc::now();

    let bytes = tokio::task::spawn_blocking(move || render_report(&data, &brand, generated_at))
        .await
        .context("Report task failed")??;

    let report = store_report(store, inspection_id, bytes, generated_at)
        .context("Failed to store report")?;

    if output.is_quiet() {
        println!("{}", report.id);
    } else {
        output.success(&format!(
            "Generated {} ({})",
            report.filename,
            human_size(report.data.len() as u64)
        ));
    }

    if dest.is_some() || open {
        let path = dest.unwrap_or_else(|| PathBuf::from(&report.filename));
        write_file(&path, &report.data)?;
        output.message(&format!("Wrote {}", path.display()));
        if open {
            open_file(&path)?;
        }
    }
    Ok(())
}

/// List reports of an inspection, newest first
pub fn list(store: &Store, inspection: String, output: &Output) -> Result<()> {
    let inspection_id = resolve_inspection(store, &inspection)?;
    store.require_inspection(inspection_id)?;
    let reports = store.reports_for_inspection(inspection_id)?;
    output.print_reports(&reports);
    Ok(())
}

/// Write a stored report to disk
pub fn export(
    store: &Store,
    id: String,
    dest: Option<PathBuf>,
    open: bool,
    output: &Output,
) -> Result<()> {
    let uuid = resolve_report(store, &id)?;
    let report = store
        .get_report(uuid)?
        .ok_or_else(|| anyhow!("Report not found: {}", id))?;

    let path = dest.unwrap_or_else(|| PathBuf::from(&report.filename));
    write_file(&path, &report.data)?;
    output.success(&format!("Wrote {}", path.display()));

    if open {
        open_file(&path)?;
    }
    Ok(())
}
