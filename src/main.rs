//! # osm-route-updater CLI
//!
//! Command-line interface for the osm-route-updater library.
//! Map-matches a GeoJSON route and writes the result as an OSM route relation.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use osm_route_updater::{
    MapMatcher, MatcherConfig, ModeKind, ReplaceMembers, Result, RunObserver, RunOptions,
    RunSummary, DEFAULT_ENDPOINT,
};

mod cli;

/// Command-line interface for osm-route-updater
#[derive(Parser)]
#[command(name = "osm-route-updater")]
#[command(about = "Map-match a GeoJSON route with Valhalla and write it as an OSM route relation")]
#[command(long_about = "Converts a GeoJSON FeatureCollection into an OSM-XML route relation:
  osm-route-updater --geojson line-12.geojson --mode create
      # writes output.osm
  osm-route-updater --geojson line-12.geojson --mode update --relation-id 1234567
      # writes output_relation_1234567.osm

Collections with several features produce one numbered file per feature
(output_1.osm, output_2.osm, ...).

Logs go to stderr and to logs/app.log unless --no-log-file is given.")]
#[command(version = env!("ROUTE_UPDATER_VERSION"))]
struct Cli {
    /// GeoJSON FeatureCollection describing the route
    #[arg(long)]
    geojson: PathBuf,

    /// Operating mode
    #[arg(long, value_enum)]
    mode: CliMode,

    /// OSM relation id, required in update mode
    #[arg(long, alias = "relation_id")]
    relation_id: Option<u64>,

    /// Directory receiving the .osm files
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Valhalla trace_attributes endpoint
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Give up on a map-matching request after this many seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Log file, appended to on every run
    #[arg(long, default_value = "logs/app.log")]
    log_file: PathBuf,

    /// Log to stderr only
    #[arg(long)]
    no_log_file: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliMode {
    /// Build a new relation
    #[value(alias = "nuevo")]
    Create,
    /// Rebuild the members of an existing relation
    #[value(alias = "actualizar")]
    Update,
}

impl From<CliMode> for ModeKind {
    fn from(mode: CliMode) -> Self {
        match mode {
            CliMode::Create => ModeKind::Create,
            CliMode::Update => ModeKind::Update,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let settings = cli::LogSettings {
        file: (!cli.no_log_file).then(|| cli.log_file.clone()),
        verbose: cli.verbose,
    };
    if let Err(e) = cli::logging::init(&settings) {
        eprintln!("❌ Error: {e:#}");
        std::process::exit(1);
    }

    // Failures were already reported through the observer
    if run(cli).await.is_err() {
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<RunSummary> {
    let observer = cli::ProgressObserver::new();

    if cli.verbose {
        observer.info(&format!(
            "🗺️  osm-route-updater v{} starting...",
            env!("ROUTE_UPDATER_VERSION")
        ));
    }

    let config = MatcherConfig {
        endpoint: cli.endpoint,
        timeout: cli.timeout.map(Duration::from_secs),
        ..Default::default()
    };
    let matcher = match MapMatcher::with_config(config) {
        Ok(matcher) => matcher,
        Err(e) => {
            observer.error(&format!("❌ Could not set up the HTTP client: {e}"));
            return Err(e);
        }
    };

    let options = RunOptions {
        geojson: cli.geojson,
        mode: cli.mode.into(),
        relation_id: cli.relation_id,
        output_dir: cli.output_dir,
    };

    let summary =
        osm_route_updater::run(&options, &matcher, &ReplaceMembers, &observer).await?;

    if summary.skipped > 0 {
        observer.warn(&format!(
            "⚠️  {} feature(s) skipped, {} file(s) written",
            summary.skipped,
            summary.written.len()
        ));
    }
    Ok(summary)
}
