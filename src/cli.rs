//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::{ArgGroup, Parser};
use std::path::PathBuf;

/// Fairway - golf course catalog sync and round scorecards
///
/// Keeps a local course catalog in step with the external course catalog
/// and renders hole-by-hole scorecards for recorded rounds.
///
/// Examples:
///   fairway --sync --secret "$FAIRWAY_SYNC_SECRET"
///   fairway --sync --items ./courses.json --dry-run
///   fairway --record-play ./round.json
///   fairway --scorecard 6f0c1c9e-... --format text
///   fairway --history 1b9d6bcd-... --format json
///   fairway --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(group(
    ArgGroup::new("action")
        .required(true)
        .args(["sync", "scorecard", "history", "record_play", "init_config"])
))]
pub struct Args {
    /// Run a catalog sync
    ///
    /// Requires a credential (--secret or --authorization) matching the
    /// configured sync secret.
    #[arg(long)]
    pub sync: bool,

    /// Read catalog items from a JSON file instead of the catalog API
    #[arg(long, value_name = "FILE")]
    pub items: Option<PathBuf>,

    /// Course catalog API base URL
    #[arg(long, value_name = "URL", env = "FAIRWAY_CATALOG_URL")]
    pub catalog_url: Option<String>,

    /// Bearer key for the course catalog API
    #[arg(long, value_name = "KEY", env = "FAIRWAY_CATALOG_API_KEY", hide_env_values = true)]
    pub catalog_api_key: Option<String>,

    /// Catalog request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Credential presented to the sync trigger (query-parameter style)
    #[arg(long, value_name = "TOKEN", env = "FAIRWAY_TRIGGER_SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    /// Raw Authorization header presented to the sync trigger
    ///
    /// Example: --authorization "Bearer <token>"
    #[arg(long, value_name = "HEADER")]
    pub authorization: Option<String>,

    /// Secret the sync trigger expects (overrides [sync].secret)
    #[arg(long, value_name = "TOKEN", env = "FAIRWAY_SYNC_SECRET", hide_env_values = true)]
    pub expected_secret: Option<String>,

    /// Render the scorecard of a recorded play
    #[arg(long, value_name = "PLAY_ID")]
    pub scorecard: Option<String>,

    /// List recorded plays of a course, newest first
    #[arg(long, value_name = "COURSE_ID")]
    pub history: Option<String>,

    /// Record a play described by a JSON file
    #[arg(long, value_name = "FILE")]
    pub record_play: Option<PathBuf>,

    /// Output format (markdown, text, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Write output to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path of the SQLite catalog database
    #[arg(short, long, value_name = "PATH", env = "FAIRWAY_DATABASE")]
    pub database: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .fairway.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Fetch and validate catalog items without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .fairway.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for rendered results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown tables (default)
    #[default]
    Markdown,
    /// Plain aligned text
    Text,
    /// JSON
    Json,
}

/// What a single invocation does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Sync,
    Scorecard(String),
    History(String),
    RecordPlay(PathBuf),
    InitConfig,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The requested action. Clap guarantees exactly one is present.
    pub fn action(&self) -> Action {
        if self.init_config {
            Action::InitConfig
        } else if let Some(ref play_id) = self.scorecard {
            Action::Scorecard(play_id.clone())
        } else if let Some(ref course_id) = self.history {
            Action::History(course_id.clone())
        } else if let Some(ref path) = self.record_play {
            Action::RecordPlay(path.clone())
        } else {
            Action::Sync
        }
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.dry_run && !self.sync {
            return Err("--dry-run only applies to --sync".to_string());
        }

        if let Some(ref url) = self.catalog_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Catalog URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        for path in [&self.items, &self.record_play].into_iter().flatten() {
            if !path.is_file() {
                return Err(format!("File does not exist: {}", path.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings. `--quiet` beats a
    /// config file that turns verbose logging on.
    pub fn log_level(&self, verbose_by_default: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || verbose_by_default {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
