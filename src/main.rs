//! CLI entry point for the parking occupancy builder.
//!
//! Reads the collected occupancy history, resolves capacities and positions,
//! and writes the per-facility records consumed by the dashboard.

use anyhow::Result;
use clap::{Parser, Subcommand};
use parking_occupancy::{
    config::PipelineConfig,
    fetch::{BasicClient, load_source},
    gazetteer::{Gazetteer, slugify},
    occupancy::{pipeline, types::Coordinate},
    output::{OutputFormat, print_pretty, write_artifact},
    registry::Registry,
};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "parking_occupancy")]
#[command(
    about = "Builds occupancy histories and status for parking facilities",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the facility records from a history file
    Build {
        /// History CSV (path or URL, optionally .gz)
        #[arg(long, value_name = "FILE_OR_URL", default_value = "historique_parkings.csv")]
        history: String,

        /// Facility registry CSV with declared capacities (path or URL)
        #[arg(short, long, value_name = "FILE_OR_URL")]
        registry: Option<String>,

        /// Gazetteer JSON replacing the built-in one
        #[arg(short, long, value_name = "FILE_OR_URL")]
        gazetteer: Option<String>,

        /// Artifact to write
        #[arg(short, long, default_value = "data.js")]
        output: PathBuf,

        /// Artifact format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Js)]
        format: OutputFormat,

        /// Resampling window in minutes
        #[arg(long, default_value_t = 5)]
        bucket_minutes: u32,

        /// Most recent buckets kept per facility (0 = all)
        #[arg(long, default_value_t = 300)]
        history_limit: usize,

        /// Fallback latitude for unplaced facilities
        #[arg(long, allow_hyphen_values = true)]
        default_lat: Option<f64>,

        /// Fallback longitude for unplaced facilities
        #[arg(long, allow_hyphen_values = true)]
        default_lon: Option<f64>,
    },
    /// Show which gazetteer key each name resolves to
    Locate {
        /// Facility names
        #[arg(required = true)]
        names: Vec<String>,

        /// Gazetteer JSON replacing the built-in one
        #[arg(short, long, value_name = "FILE_OR_URL")]
        gazetteer: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/parking_occupancy.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("parking_occupancy.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive(LevelFilter::INFO.into()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(
            EnvFilter::from_env("RUST_LOG_JSON").add_directive(LevelFilter::DEBUG.into()),
        );

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            history,
            registry,
            gazetteer,
            output,
            format,
            bucket_minutes,
            history_limit,
            default_lat,
            default_lon,
        } => {
            let mut config = PipelineConfig {
                bucket_minutes,
                history_limit,
                ..Default::default()
            };
            if let (Some(lat), Some(lon)) = (default_lat, default_lon) {
                config.default_center = Coordinate::new(lat, lon);
            }
            build(&history, registry.as_deref(), gazetteer.as_deref(), &output, format, &config)
                .await?;
        }
        Commands::Locate { names, gazetteer } => {
            let client = BasicClient::new()?;
            let gazetteer = load_gazetteer(&client, gazetteer.as_deref()).await?;
            for name in &names {
                match gazetteer.lookup(name) {
                    Some(entry) => info!(
                        name = %name,
                        slug = %slugify(name),
                        key = %entry.key,
                        lat = entry.coordinate.lat,
                        lon = entry.coordinate.lon,
                        "Resolved"
                    ),
                    None => info!(name = %name, slug = %slugify(name), "Unresolved"),
                }
            }
        }
    }

    Ok(())
}

/// Loads every input, runs the pipeline and writes the artifact.
///
/// Any unreadable input aborts before the artifact is touched.
#[tracing::instrument(skip(config), fields(output = %output.display()))]
async fn build(
    history: &str,
    registry: Option<&str>,
    gazetteer: Option<&str>,
    output: &Path,
    format: OutputFormat,
    config: &PipelineConfig,
) -> Result<()> {
    config.log_config();
    let client = BasicClient::new()?;

    let history_bytes = load_source(&client, history).await?;
    let registry = match registry {
        Some(source) => Registry::from_csv(&load_source(&client, source).await?)?,
        None => Registry::default(),
    };
    let gazetteer = load_gazetteer(&client, gazetteer).await?;
    info!(
        registry = registry.len(),
        gazetteer = gazetteer.len(),
        "Reference data loaded"
    );

    let run = pipeline::run(&history_bytes, &registry, &gazetteer, config)?;
    print_pretty(&run.records);
    write_artifact(output, &run.records, format)?;

    info!(
        facilities = run.records.len(),
        rejected = run.rejected,
        dropped = run.dropped,
        "Build finished"
    );
    Ok(())
}

async fn load_gazetteer(client: &BasicClient, source: Option<&str>) -> Result<Gazetteer> {
    match source {
        Some(source) => Gazetteer::from_json(&load_source(client, source).await?),
        None => Ok(Gazetteer::builtin()),
    }
}
