//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/moveout/config.toml)
//! 3. Environment variables (MOVEOUT_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{Context, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable prefix
const ENV_PREFIX: &str = "MOVEOUT";

/// Default origin used to build share URLs
pub const DEFAULT_SHARE_ORIGIN: &str = "http://localhost:3000";

/// Default lifetime of a share link in days
pub const DEFAULT_SHARE_EXPIRY_DAYS: u32 = 7;

/// Default label stamped onto watermarks and report subtitles
pub const DEFAULT_BRAND_LABEL: &str = "DepositDefender";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for data storage (SQLite db)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Origin prepended to share tokens, e.g. `https://inspect.example.com`
    #[serde(default = "default_share_origin")]
    pub share_origin: String,

    /// Days until a freshly created share link expires
    #[serde(default = "default_share_expiry_days")]
    pub share_expiry_days: u32,

    /// Label used in photo watermarks and report headers
    #[serde(default = "default_brand_label")]
    pub brand_label: String,

    /// Optional log file; logs go to stderr when unset
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            share_origin: default_share_origin(),
            share_expiry_days: DEFAULT_SHARE_EXPIRY_DAYS,
            brand_label: default_brand_label(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (MOVEOUT_DATA_DIR, MOVEOUT_SHARE_ORIGIN, MOVEOUT_SHARE_EXPIRY_DAYS)
    /// 2. Config file (~/.config/moveout/config.toml or MOVEOUT_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring an explicit path given on the command line
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_path(p),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var(format!("{}_SHARE_ORIGIN", ENV_PREFIX)) {
            if !val.is_empty() {
                self.share_origin = val;
            }
        }

        // Unparseable values are ignored rather than failing startup
        if let Ok(val) = std::env::var(format!("{}_SHARE_EXPIRY_DAYS", ENV_PREFIX)) {
            if let Ok(days) = val.trim().parse::<u32>() {
                self.share_expiry_days = days;
            }
        }
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Save configuration to the default config file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, config_path: &PathBuf) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with MOVEOUT_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("moveout")
            .join("config.toml")
    }

    /// Get the path to the SQLite database
    pub fn sqlite_path(&self) -> PathBuf {
        self.data_dir.join("moveout.db")
    }

    /// Lifetime of newly created share links
    pub fn share_expiry(&self) -> Duration {
        Duration::days(i64::from(self.share_expiry_days))
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("moveout")
}

fn default_share_origin() -> String {
    DEFAULT_SHARE_ORIGIN.to_string()
}

fn default_share_expiry_days() -> u32 {
    DEFAULT_SHARE_EXPIRY_DAYS
}

fn default_brand_label() -> String {
    DEFAULT_BRAND_LABEL.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "MOVEOUT_DATA_DIR",
        "MOVEOUT_SHARE_ORIGIN",
        "MOVEOUT_SHARE_EXPIRY_DAYS",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.share_origin, DEFAULT_SHARE_ORIGIN);
        assert_eq!(config.share_expiry_days, 7);
        assert_eq!(config.brand_label, "DepositDefender");
        assert!(config.log_file.is_none());
        assert!(config.data_dir.ends_with("moveout"));
    }

    #[test]
    fn test_file_paths() {
        let config = Config::default();
        assert!(config.sqlite_path().ends_with("moveout.db"));
    }

    #[test]
    fn test_share_expiry_duration() {
        let mut config = Config::default();
        assert_eq!(config.share_expiry(), Duration::days(7));

        config.share_expiry_days = 1;
        assert_eq!(config.share_expiry(), Duration::hours(24));
    }

    #[test]
    fn test_env_override_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("MOVEOUT_DATA_DIR", "/tmp/moveout-test");
        config.apply_env_overrides();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/moveout-test"));
    }

    #[test]
    fn test_env_override_share_origin() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("MOVEOUT_SHARE_ORIGIN", "https://inspect.example.com");
        config.apply_env_overrides();
        assert_eq!(config.share_origin, "https://inspect.example.com");

        // Empty string keeps the current value
        env::set_var("MOVEOUT_SHARE_ORIGIN", "");
        config.apply_env_overrides();
        assert_eq!(config.share_origin, "https://inspect.example.com");
    }

    #[test]
    fn test_env_override_expiry_days() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("MOVEOUT_SHARE_EXPIRY_DAYS", "14");
        config.apply_env_overrides();
        assert_eq!(config.share_expiry_days, 14);

        env::set_var("MOVEOUT_SHARE_EXPIRY_DAYS", "soon");
        config.apply_env_overrides();
        assert_eq!(config.share_expiry_days, 14);
    }

    #[test]
    fn test_serialization() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config {
            data_dir: PathBuf::from("/data/moveout"),
            share_origin: "https://share.example.com".to_string(),
            share_expiry_days: 3,
            brand_label: "Acme Rentals".to_string(),
            log_file: None,
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("data_dir"));
        assert!(toml_str.contains("share_origin"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.data_dir, config.data_dir);
        assert_eq!(parsed.share_origin, config.share_origin);
        assert_eq!(parsed.share_expiry_days, 3);
        assert_eq!(parsed.brand_label, "Acme Rentals");
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            data_dir = "/custom/data"
            share_origin = "https://example.com"
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert_eq!(config.share_origin, "https://example.com");
        assert_eq!(config.share_expiry_days, DEFAULT_SHARE_EXPIRY_DAYS);
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();
        env::set_var("MOVEOUT_DATA_DIR", temp_dir.path().join("data"));

        let path = PathBuf::from("/nonexistent/config.toml");
        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.share_origin, DEFAULT_SHARE_ORIGIN);
        assert!(config.data_dir.exists());
    }

    #[test]
    fn test_save_and_reload() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let config = Config {
            data_dir: temp_dir.path().join("data"),
            share_origin: "https://saved.example.com".to_string(),
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.share_origin, "https://saved.example.com");
        assert_eq!(loaded.data_dir, temp_dir.path().join("data"));
    }
}
