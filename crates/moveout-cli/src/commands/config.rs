//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use moveout_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            output.json(&serde_json::json!({
                "data_dir": config.data_dir,
                "share_origin": config.share_origin,
                "share_expiry_days": config.share_expiry_days,
                "brand_label": config.brand_label,
                "log_file": config.log_file
            }));
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:          {}", config.data_dir.display());
            println!("  share_origin:      {}", config.share_origin);
            println!("  share_expiry_days: {}", config.share_expiry_days);
            println!("  brand_label:       {}", config.brand_label);
            println!(
                "  log_file:          {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Apply one `key = value` assignment to a config
fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "data_dir" => {
            config.data_dir = value.into();
        }
        "share_origin" => {
            if value.is_empty() {
                bail!("share_origin must not be empty");
            }
            config.share_origin = value.trim_end_matches('/').to_string();
        }
        "share_expiry_days" => {
            let days: u32 = value
                .parse()
                .context("Invalid value for share_expiry_days. Use a whole number of days.")?;
            if days == 0 {
                bail!("share_expiry_days must be at least 1");
            }
            config.share_expiry_days = days;
        }
        "brand_label" => {
            if value.trim().is_empty() {
                bail!("brand_label must not be empty");
            }
            config.brand_label = value.to_string();
        }
        "log_file" => {
            config.log_file = if value.is_empty() || value == "none" {
                None
            } else {
                Some(value.into())
            };
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: data_dir, share_origin, share_expiry_days, brand_label, log_file",
                key
            );
        }
    }
    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_known_keys() {
        let mut config = Config::default();

        apply(&mut config, "share_origin", "https://inspect.example.com/").unwrap();
        assert_eq!(config.share_origin, "https://inspect.example.com");

        apply(&mut config, "share_expiry_days", "14").unwrap();
        assert_eq!(config.share_expiry_days, 14);

        apply(&mut config, "brand_label", "Acme Lettings").unwrap();
        assert_eq!(config.brand_label, "Acme Lettings");

        apply(&mut config, "log_file", "/tmp/moveout.log").unwrap();
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/moveout.log")));
        apply(&mut config, "log_file", "none").unwrap();
        assert_eq!(config.log_file, None);
    }

    #[test]
    fn test_apply_rejects_bad_values() {
        let mut config = Config::default();
        assert!(apply(&mut config, "share_expiry_days", "soon").is_err());
        assert!(apply(&mut config, "share_expiry_days", "0").is_err());
        assert!(apply(&mut config, "brand_label", "  ").is_err());
        assert!(apply(&mut config, "sync_url", "ws://x").is_err());
        assert_eq!(config.share_expiry_days, 7);
    }
}
