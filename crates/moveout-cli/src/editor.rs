//! Notes editing and confirmation prompts
//!
//! `room update --edit` seeds a temporary file with the current notes and
//! hands it to `$VISUAL` / `$EDITOR`. Lines starting with `#` are
//! instructions and never end up in the stored notes.

use std::env;
use std::fs;
use std::io::{self, Write};
use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::debug;

#[cfg(windows)]
const FALLBACK_EDITOR: &str = "notepad";
#[cfg(not(windows))]
const FALLBACK_EDITOR: &str = "vi";

/// Edit the notes of `label` interactively
///
/// Returns the new notes, or `None` when the user saved an empty file.
pub fn edit_notes(label: &str, current: Option<&str>) -> Result<Option<String>> {
    let command = editor_command(env::var("VISUAL").ok(), env::var("EDITOR").ok());
    run_editor(&command, label, current)
}

fn run_editor(command: &[String], label: &str, current: Option<&str>) -> Result<Option<String>> {
    let Some((program, args)) = command.split_first() else {
        bail!("No editor configured. Set $EDITOR, for example: export EDITOR=nano");
    };

    let mut file = tempfile::Builder::new()
        .prefix("moveout-notes-")
        .suffix(".md")
        .tempfile()
        .context("Failed to create a temporary notes file")?;
    file.write_all(seed(label, current).as_bytes())?;
    file.flush()?;

    debug!(editor = %program, path = ?file.path(), "Opening notes in editor");
    let status = Command::new(program)
        .args(args)
        .arg(file.path())
        .status()
        .with_context(|| format!("Failed to run editor: {}", program))?;
    if !status.success() {
        bail!("Editor '{}' exited with {}. Notes were left unchanged.", program, status);
    }

    let edited = fs::read_to_string(file.path()).context("Failed to read the edited notes")?;
    Ok(parse_notes(&edited))
}

/// The editor invocation, split into program and arguments (`code --wait`)
fn editor_command(visual: Option<String>, editor: Option<String>) -> Vec<String> {
    [visual, editor]
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_EDITOR.to_string())
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn seed(label: &str, current: Option<&str>) -> String {
    let mut text = format!(
        "# Notes for {}. Lines starting with '#' are ignored.\n\
         # Save an empty file to clear the notes.\n",
        label
    );
    if let Some(notes) = current {
        text.push_str(notes);
        text.push('\n');
    }
    text
}

fn parse_notes(content: &str) -> Option<String> {
    let kept: Vec<&str> = content
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect();
    let notes = kept.join("\n");
    let notes = notes.trim();
    (!notes.is_empty()).then(|| notes.to_string())
}

/// Ask a yes/no question on the terminal
///
/// Without an interactive stdin the answer is always no.
pub fn confirm(prompt: &str) -> Result<bool> {
    if !atty::is(atty::Stream::Stdin) {
        return Ok(false);
    }

    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
