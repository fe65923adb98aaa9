//! Share link command handlers

use std::path::PathBuf;

use anyhow::{Context, Result};

use moveout_core::{ShareManager, Store};

use crate::commands::{open_file, resolve_inspection, resolve_report, write_file};
use crate::output::Output;

/// Accept either a bare token or a full share URL
pub fn token_from_arg(arg: &str) -> &str {
    let trimmed = arg.trim().trim_end_matches('/');
    match trimmed.rfind("/share/") {
        Some(pos) => &trimmed[pos + "/share/".len()..],
        None => trimmed,
    }
}

/// Share an inspection: reuse its newest report or generate one
pub fn create(store: &mut Store, inspection: String, output: &Output) -> Result<()> {
    let inspection_id = resolve_inspection(store, &inspection)?;
    let url = ShareManager::new(store)
        .share_inspection(inspection_id)
        .context("Failed to share inspection")?;

    output.print_url(&url);
    Ok(())
}

/// Create a link for one specific stored report
pub fn link(store: &mut Store, inspection: String, report: String, output: &Output) -> Result<()> {
    let inspection_id = resolve_inspection(store, &inspection)?;
    let report_id = resolve_report(store, &report)?;
    let url = ShareManager::new(store)
        .create_share_link(inspection_id, report_id)
        .context("Failed to create share link")?;

    output.print_url(&url);
    Ok(())
}

/// Open a shared report the way a recipient would; counts as an access
pub fn open(
    store: &mut Store,
    token: String,
    dest: Option<PathBuf>,
    launch: bool,
    output: &Output,
) -> Result<()> {
    let token = token_from_arg(&token);
    let report = ShareManager::new(store).open_shared_report(token)?;

    let path = dest.unwrap_or_else(|| PathBuf::from(&report.filename));
    write_file(&path, &report.data)?;
    output.success(&format!("Wrote {}", path.display()));

    if launch {
        open_file(&path)?;
    }
    Ok(())
}

/// Show link state without recording an access
pub fn info(store: &mut Store, token: String, output: &Output) -> Result<()> {
    let token = token_from_arg(&token);
    let info = ShareManager::new(store).share_link_info(token)?;
    output.print_share_info(token, &info);
    Ok(())
}

pub fn revoke(store: &mut Store, token: String, output: &Output) -> Result<()> {
    let token = token_from_arg(&token);
    ShareManager::new(store).revoke_share_link(token)?;
    output.success("Share link revoked");
    Ok(())
}

/// Remove expired links
pub fn cleanup(store: &mut Store, output: &Output) -> Result<()> {
    let deleted = ShareManager::new(store).cleanup_expired_shares()?;
    if output.is_json() {
        output.json(&serde_json::json!({ "deleted": deleted }));
    } else if output.is_quiet() {
        println!("{}", deleted);
    } else {
        output.success(&format!("Removed {} expired share link(s)", deleted));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_from_url_or_token() {
        let token = "6a1f9a1e-4b1c-4c8e-9a53-2f3c1d2e4b5a";
        assert_eq!(token_from_arg(token), token);
        assert_eq!(
            token_from_arg(&format!("http://localhost:3000/share/{}", token)),
            token
        );
        assert_eq!(
            token_from_arg(&format!(" https://inspect.example.com/share/{}/ ", token)),
            token
        );
    }
}
