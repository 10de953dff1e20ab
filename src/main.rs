//! catalog-facets - filter a catalog file and print its facet counts

use anyhow::{Context, Result};
use catalog_facets::engine::membership::parse_identity_list;
use catalog_facets::engine::{DamagedFilter, DateFilter, DateFilterType};
use catalog_facets::state::recompute_in_background;
use catalog_facets::{
    CatalogSnapshot, ConfigLoader, FacetDimension, FacetEngine, FacetSession, FilterState,
};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Trace modules for recomputation tracing
#[derive(Debug, Clone, ValueEnum)]
enum TraceModule {
    Filter,
    Counts,
    Session,
    All,
}

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "catalog-facets",
    about = "Faceted filtering and facet counts over a package catalog",
    version
)]
struct Cli {
    /// Catalog file (YAML, or JSON by extension)
    #[clap(long)]
    catalog: PathBuf,

    /// Config file; defaults to the project/user lookup
    #[clap(long)]
    config: Option<PathBuf>,

    /// Free-text search
    #[clap(long, default_value = "")]
    search: String,

    #[clap(long)]
    status: Vec<String>,
    #[clap(long)]
    creator: Vec<String>,
    #[clap(long)]
    category: Vec<String>,
    #[clap(long)]
    license: Vec<String>,
    /// File size bucket label
    #[clap(long)]
    size: Vec<String>,
    #[clap(long)]
    subfolder: Vec<String>,
    #[clap(long)]
    destination: Vec<String>,
    #[clap(long)]
    playlist: Vec<String>,
    #[clap(long)]
    collection: Vec<String>,
    #[clap(long)]
    location: Vec<String>,

    /// all, damaged or valid
    #[clap(long, default_value = "all")]
    damaged: DamagedFilter,

    /// all-time, today, past-week, past-month, past-3-months, past-year, custom
    #[clap(long)]
    date: Option<DateFilterType>,

    /// Custom range start (RFC 3339 or YYYY-MM-DD)
    #[clap(long, value_parser = parse_date)]
    from: Option<DateTime<Utc>>,

    /// Custom range end (RFC 3339 or YYYY-MM-DD)
    #[clap(long, value_parser = parse_date)]
    to: Option<DateTime<Utc>>,

    /// Newline-separated list of favorite item identities
    #[clap(long)]
    favorites: Option<PathBuf>,

    /// Newline-separated list of auto-install item identities
    #[clap(long)]
    auto_install: Option<PathBuf>,

    /// Use cascading facet counts
    #[clap(long)]
    cascade: bool,

    /// Print JSON instead of text
    #[clap(long)]
    json: bool,

    /// Enable recomputation tracing (comma-separated: filter,counts,session,all)
    #[clap(long, value_delimiter = ',')]
    trace: Vec<TraceModule>,

    /// Set log level
    #[clap(long, default_value = "warn")]
    log_level: LogLevel,
}

impl Cli {
    fn selections(&self) -> [(FacetDimension, &[String]); 10] {
        [
            (FacetDimension::Status, self.status.as_slice()),
            (FacetDimension::Creator, self.creator.as_slice()),
            (FacetDimension::Category, self.category.as_slice()),
            (FacetDimension::License, self.license.as_slice()),
            (FacetDimension::FileSize, self.size.as_slice()),
            (FacetDimension::Subfolder, self.subfolder.as_slice()),
            (FacetDimension::Destination, self.destination.as_slice()),
            (FacetDimension::Playlist, self.playlist.as_slice()),
            (FacetDimension::Collection, self.collection.as_slice()),
            (FacetDimension::Location, self.location.as_slice()),
        ]
    }

    fn date_filter(&self) -> DateFilter {
        match self.date {
            Some(DateFilterType::CustomRange) | None if self.from.is_some() || self.to.is_some() => {
                DateFilter::custom(self.from, self.to)
            }
            Some(filter_type) => DateFilter::new(filter_type),
            None => DateFilter::default(),
        }
    }
}

fn parse_date(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Ok(date.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.and_time(chrono::NaiveTime::MIN).and_utc())
        .map_err(|e| format!("Invalid date '{}': {}", value, e))
}

fn initialize_tracing(log_level: &LogLevel, trace_modules: &[TraceModule]) {
    let mut filter = EnvFilter::new(log_level.to_filter_directive());

    for module in trace_modules {
        let directive = match module {
            TraceModule::Filter => "catalog_facets::engine=debug",
            TraceModule::Counts => "catalog_facets::engine::counter=trace",
            TraceModule::Session => "catalog_facets::state=debug",
            TraceModule::All => "catalog_facets=trace",
        };

        if let Ok(parsed) = directive.parse() {
            filter = filter.add_directive(parsed);
        }
    }

    // Logs go to stderr; stdout carries the result
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(!trace_modules.is_empty())
        .with_writer(std::io::stderr)
        .init();
}

fn load_identity_list(path: &Path) -> Result<Arc<std::collections::HashSet<catalog_facets::ItemId>>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read identity list {}", path.display()))?;
    Ok(Arc::new(parse_identity_list(&content)))
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    matched: Vec<&'a str>,
    date: &'a str,
    facets: &'a catalog_facets::FacetView,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    initialize_tracing(&cli.log_level, &cli.trace);

    let mut loader = ConfigLoader::new();
    let config = match &cli.config {
        Some(path) => loader.load_file(path)?,
        None => {
            let cwd = std::env::current_dir().context("Failed to determine working directory")?;
            loader.load_hierarchy(cwd)
        }
    };
    if config.settings.debug_mode {
        debug!("Effective config: {:?}", config);
    }

    let mut engine = FacetEngine::from_config(&config)?;
    if let Some(path) = &cli.favorites {
        engine = engine.with_favorites(load_identity_list(path)?);
    }
    if let Some(path) = &cli.auto_install {
        engine = engine.with_auto_install(load_identity_list(path)?);
    }

    let catalog = CatalogSnapshot::load(&cli.catalog)?;
    info!("Loaded {} items from {}", catalog.len(), cli.catalog.display());

    let state = FilterState::new().with_cascade_mode(cli.cascade || config.settings.cascade_mode);
    let mut session = FacetSession::with_state(engine, catalog, state);
    session.set_deferred(true);
    {
        let mut batch = session.begin_batch();
        for (dimension, names) in cli.selections() {
            if names.is_empty() {
                continue;
            }
            batch.set_selection(dimension, names);
        }
        batch.set_search_text(cli.search.clone());
        batch.set_damaged_filter(cli.damaged);
        batch.set_date_filter(cli.date_filter());
    }

    let shared = session.into_shared();
    recompute_in_background(&shared).await?;
    let session = shared.lock().await;

    let view = session.view();
    let matched: Vec<&str> = session
        .filtered_items()
        .into_iter()
        .map(|item| {
            if item.name.is_empty() {
                item.id.as_str()
            } else {
                item.name.as_str()
            }
        })
        .collect();

    if cli.json {
        let output = JsonOutput {
            matched,
            date: &view.date_description,
            facets: view,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "{} of {} items match (date: {})",
        matched.len(),
        session.catalog().len(),
        view.date_description
    );
    for name in &matched {
        println!("  {name}");
    }
    for list in &view.lists {
        if list.entries.is_empty() {
            continue;
        }
        println!("\n{}:", list.dimension);
        for entry in &list.entries {
            let mark = if entry.selected { "x" } else { " " };
            println!("  [{}] {} ({})", mark, entry.value, entry.count);
        }
    }

    Ok(())
}
