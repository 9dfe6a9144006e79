//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.fairway.toml` files.

use crate::catalog::HttpCatalogConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".fairway.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// External course catalog settings.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Sync trigger settings.
    #[serde(default)]
    pub sync: SyncConfig,

    /// Scorecard rendering settings.
    #[serde(default)]
    pub scorecard: ScorecardConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Path of the SQLite catalog database.
    #[serde(default = "default_database")]
    pub database: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            verbose: false,
        }
    }
}

fn default_database() -> String {
    "fairway.db".to_string()
}

/// Course catalog API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Base URL of the catalog API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer key sent to the catalog API.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Number of courses requested per fetch.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Read items from this JSON file instead of the API.
    #[serde(default)]
    pub items_file: Option<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_seconds: default_timeout(),
            page_size: default_page_size(),
            items_file: None,
        }
    }
}

fn default_base_url() -> String {
    HttpCatalogConfig::default().base_url
}

fn default_timeout() -> u64 {
    120
}

fn default_page_size() -> usize {
    8000
}

impl From<&CatalogConfig> for HttpCatalogConfig {
    fn from(config: &CatalogConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            timeout_seconds: config.timeout_seconds,
            page_size: config.page_size,
        }
    }
}

/// Sync trigger settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Shared secret a trigger must present. Sync is refused when unset.
    #[serde(default)]
    pub secret: Option<String>,

    /// How long a sync waits for another writer's lock, in milliseconds.
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_ms: u64,

    /// Show a progress bar while syncing.
    #[serde(default = "default_true")]
    pub show_progress: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            secret: None,
            busy_timeout_ms: default_busy_timeout(),
            show_progress: true,
        }
    }
}

fn default_busy_timeout() -> u64 {
    5000
}

fn default_true() -> bool {
    true
}

/// Scorecard rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorecardConfig {
    /// Glyph shown for an unknown par, score or total.
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

impl Default for ScorecardConfig {
    fn default() -> Self {
        Self {
            placeholder: default_placeholder(),
        }
    }
}

fn default_placeholder() -> String {
    "—".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings and only
    /// override when explicitly provided.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref database) = args.database {
            self.general.database = database.display().to_string();
        }

        if let Some(ref url) = args.catalog_url {
            self.catalog.base_url = url.clone();
        }
        if let Some(ref key) = args.catalog_api_key {
            self.catalog.api_key = Some(key.clone());
        }
        if let Some(timeout) = args.timeout {
            self.catalog.timeout_seconds = timeout;
        }
        if let Some(ref items) = args.items {
            self.catalog.items_file = Some(items.display().to_string());
        }

        if let Some(ref secret) = args.expected_secret {
            self.sync.secret = Some(secret.clone());
        }
        if args.quiet {
            self.sync.show_progress = false;
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.database, "fairway.db");
        assert_eq!(config.catalog.page_size, 8000);
        assert_eq!(config.sync.busy_timeout_ms, 5000);
        assert!(config.sync.secret.is_none());
        assert_eq!(config.scorecard.placeholder, "—");
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
database = "/var/lib/fairway/catalog.db"
verbose = true

[catalog]
base_url = "https://catalog.example.com/api"
page_size = 500

[sync]
secret = "hunter2"
show_progress = false

[scorecard]
placeholder = "-"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.database, "/var/lib/fairway/catalog.db");
        assert!(config.general.verbose);
        assert_eq!(config.catalog.base_url, "https://catalog.example.com/api");
        assert_eq!(config.catalog.page_size, 500);
        assert_eq!(config.catalog.timeout_seconds, 120);
        assert_eq!(config.sync.secret.as_deref(), Some("hunter2"));
        assert!(!config.sync.show_progress);
        assert_eq!(config.scorecard.placeholder, "-");
    }

    #[test]
    fn test_http_config_from_catalog() {
        let mut catalog = CatalogConfig::default();
        catalog.api_key = Some("k".to_string());
        let http = HttpCatalogConfig::from(&catalog);
        assert_eq!(http.api_key.as_deref(), Some("k"));
        assert_eq!(http.page_size, 8000);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[catalog]"));
        assert!(toml_str.contains("[sync]"));
        assert!(toml_str.contains("[scorecard]"));
    }
}
