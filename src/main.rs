//! Fairway - golf course catalog sync and round scorecards
//!
//! A CLI tool that mirrors an external golf course catalog into a local
//! SQLite database and renders hole-by-hole scorecards for recorded rounds.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (catalog fetch, persistence, config, etc.)
//!   3 - Sync trigger rejected the presented credential

mod catalog;
mod cli;
mod config;
mod models;
mod report;
mod scorecard;
mod store;
mod sync;

use anyhow::{Context, Result};
use catalog::{CatalogSource, FileCatalog, HttpCatalog, HttpCatalogConfig};
use cli::{Action, Args, OutputFormat};
use config::{Config, CONFIG_FILE};
use models::{Course, NewPlay};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use store::{SqliteStore, StoreError};
use sync::{CatalogSyncEngine, SyncSecret, TriggerRequest, TriggerResponse};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit code for a rejected sync credential.
const EXIT_UNAUTHORIZED: i32 = 3;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.action() == Action::InitConfig {
        return handle_init_config();
    }

    let (config, config_origin) = match load_config(&args) {
        Ok((mut config, origin)) => {
            config.merge_with_args(&args);
            (config, origin)
        }
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(&args, &config);

    info!("Fairway v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    info!("Configuration: {}", config_origin);

    match run(args, config).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Command failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .fairway.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to set the catalog URL, sync secret and database path.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config: &Config) {
    let level = args.log_level(config.general.verbose);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Dispatch the requested action. Returns the process exit code.
async fn run(args: Args, config: Config) -> Result<i32> {
    match args.action() {
        Action::Sync => run_sync(&args, &config).await,
        Action::Scorecard(play_id) => {
            let store = open_store(&config)?;
            let input = store
                .load_scorecard(&play_id)
                .with_context(|| format!("Failed to load scorecard for play {}", play_id))?;
            let view = input.build();
            debug!(
                "Scorecard for play {}: {} rows, par {}, score {}",
                play_id,
                view.rows.len(),
                view.total_par(),
                view.total_score()
            );
            let placeholder = config.scorecard.placeholder.as_str();

            let output = match args.format {
                OutputFormat::Markdown => {
                    report::generate_markdown_scorecard(&input.header, &view, placeholder)
                }
                OutputFormat::Text => {
                    report::generate_text_scorecard(&input.header, &view, placeholder)
                }
                OutputFormat::Json => report::generate_json_scorecard(&input.header, &view)?,
            };
            write_output(args.output.as_deref(), &output)?;
            Ok(0)
        }
        Action::History(course_id) => {
            let store = open_store(&config)?;
            let course = resolve_course(&store, &course_id)?;
            let counts = store.child_counts(&course.id)?;
            debug!(
                "Course {}: {} tees, {} holes, {} hole tees",
                course.id, counts.tees, counts.holes, counts.hole_tees
            );
            let plays = store
                .play_history(&course.id)
                .with_context(|| format!("Failed to load play history for {}", course_id))?;
            info!("{} plays recorded for {}", plays.len(), course.display_name);

            let output = match args.format {
                OutputFormat::Markdown => {
                    report::generate_markdown_history(&course.display_name, &plays)
                }
                OutputFormat::Text => report::generate_text_history(&course.display_name, &plays),
                OutputFormat::Json => report::generate_json_history(&plays)?,
            };
            write_output(args.output.as_deref(), &output)?;
            Ok(0)
        }
        Action::RecordPlay(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read play file: {}", path.display()))?;
            let new_play: NewPlay = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse play file: {}", path.display()))?;

            let mut store = open_store(&config)?;
            let play_id = store
                .record_play(&new_play)
                .context("Failed to record play")?;
            info!(
                "Recorded play {} on course {} ({} hole scores)",
                play_id,
                new_play.course_id,
                new_play.scores.len()
            );

            write_output(args.output.as_deref(), &format!("{}\n", play_id))?;
            Ok(0)
        }
        Action::InitConfig => {
            handle_init_config()?;
            Ok(0)
        }
    }
}

/// Run the credential-guarded sync and print its JSON response body.
async fn run_sync(args: &Args, config: &Config) -> Result<i32> {
    let start_time = Instant::now();

    let secret = config.sync.secret.clone().and_then(SyncSecret::new);
    if secret.is_none() {
        warn!("No sync secret configured; every sync request will be rejected");
    }

    let request = TriggerRequest {
        authorization: args.authorization.clone(),
        query_secret: args.secret.clone(),
    };

    let source = build_source(config)?;

    if args.dry_run {
        return handle_dry_run(&request, secret.as_ref(), &source).await;
    }

    let store = open_store(config)?;
    let mut engine = CatalogSyncEngine::new(store).with_progress(config.sync.show_progress);

    eprintln!("🔄 Syncing course catalog from {}", source.describe());
    let response = sync::trigger::handle(&request, secret.as_ref(), &source, &mut engine).await;

    let body = serde_json::to_string_pretty(&response.body())?;
    write_output(args.output.as_deref(), &format!("{}\n", body))?;

    let duration = start_time.elapsed().as_secs_f64();
    debug!("Sync trigger responded {}", response.status());
    match response {
        TriggerResponse::Synced { synced } => {
            let total = engine.store().course_count()?;
            eprintln!(
                "✅ Sync complete: {} courses in {:.1}s ({} in catalog)",
                synced, duration, total
            );
            Ok(0)
        }
        TriggerResponse::Unauthorized => {
            eprintln!("⛔ Sync rejected: missing or invalid credential.");
            Ok(EXIT_UNAUTHORIZED)
        }
        TriggerResponse::Failed { message } => {
            error!("Sync failed after {:.1}s: {}", duration, message);
            Ok(1)
        }
    }
}

/// Handle --dry-run: authorize, fetch and validate items, write nothing.
async fn handle_dry_run(
    request: &TriggerRequest,
    secret: Option<&SyncSecret>,
    source: &CatalogSource,
) -> Result<i32> {
    if !sync::authorize(secret, request.credential()).is_granted() {
        eprintln!("⛔ Sync rejected: missing or invalid credential.");
        return Ok(EXIT_UNAUTHORIZED);
    }

    println!("\n🔍 Dry run: reading catalog from {} (nothing is written)...\n", source.describe());

    let items = source
        .fetch_courses()
        .await
        .context("Failed to fetch course catalog")?;

    if items.is_empty() {
        println!("   The catalog has no courses.");
    } else {
        for item in &items {
            println!(
                "     ⛳ {} [{}] ({} tees, {} holes)",
                item.display_name,
                item.id,
                item.tees.len(),
                item.holes.len()
            );
        }
    }

    let preview = sync::preview_catalog(&items);
    println!("\n   {}", report::generate_sync_summary(&preview, true));
    println!("\n✅ Dry run complete. The database was not touched.");
    Ok(0)
}

/// Pick the catalog source: an items file when configured, the HTTP API otherwise.
fn build_source(config: &Config) -> Result<CatalogSource> {
    if let Some(ref items_file) = config.catalog.items_file {
        info!("Using catalog items file: {}", items_file);
        return Ok(CatalogSource::File(FileCatalog::new(PathBuf::from(items_file))));
    }

    let http_config = HttpCatalogConfig::from(&config.catalog);
    let client = HttpCatalog::new(http_config).context("Failed to create catalog client")?;
    Ok(CatalogSource::Http(client))
}

/// Look a course up by internal id, then by catalog id.
fn resolve_course(store: &SqliteStore, course_id: &str) -> Result<Course> {
    match store.get_course(course_id) {
        Ok(course) => Ok(course),
        Err(StoreError::NotFound { .. }) => store
            .find_course_by_external_id(course_id)?
            .with_context(|| format!("No course with id {}", course_id)),
        Err(e) => Err(e).with_context(|| format!("Failed to load course {}", course_id)),
    }
}

fn open_store(config: &Config) -> Result<SqliteStore> {
    let busy_timeout = Duration::from_millis(config.sync.busy_timeout_ms);
    SqliteStore::open(&config.general.database, busy_timeout)
        .with_context(|| format!("Failed to open database: {}", config.general.database))
}

/// Write to the --output file, or stdout.
fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            info!("Output written to {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}

/// Load configuration from file or use defaults. Runs before logging is
/// set up, so it also returns where the configuration came from.
fn load_config(args: &Args) -> Result<(Config, String)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, config_path.display().to_string()));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok((config, CONFIG_FILE.to_string())),
        Ok(None) => Ok((Config::default(), "defaults".to_string())),
        Err(e) => {
            eprintln!("⚠️  Ignoring {}: {:#}", CONFIG_FILE, e);
            Ok((Config::default(), "defaults".to_string()))
        }
    }
}
