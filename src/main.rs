//! sensor-insight - batch runner
//!
//! Reads a CSV export, runs the analytics pipeline and prints the JSON
//! report on stdout. Logs go to stderr (`RUST_LOG`, default `info`).

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use sensor_insight::constants::{APP_NAME, APP_VERSION};
use sensor_insight::logic::config::default_config_path;
use sensor_insight::logic::export::ReportWriter;
use sensor_insight::logic::records::RecordFilter;
use sensor_insight::{AnalyticsConfig, AnalyticsPipeline};

#[derive(Parser)]
#[command(name = "sensor-insight")]
#[command(about = "Anomaly labels and forecasts for IoT sensor exports", long_about = None)]
struct Cli {
    /// JSON config file (defaults to the user config file when present)
    #[arg(short, long, global = true, env = "SENSOR_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline over a CSV export
    Run {
        /// CSV file, first row = header
        input: PathBuf,

        /// Write JSONL exports; without a value, to the local data directory
        #[arg(short, long, num_args = 0..=1, value_name = "DIR")]
        output: Option<Option<PathBuf>>,

        /// Only keep readings from this device
        #[arg(long)]
        device: Option<String>,

        /// Inclusive lower bound (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS)
        #[arg(long)]
        start: Option<String>,

        /// Inclusive upper bound
        #[arg(long)]
        end: Option<String>,

        /// Forecast steps per target
        #[arg(long)]
        horizon: Option<usize>,

        /// Pretty-print the report
        #[arg(long)]
        pretty: bool,
    },

    /// Print the sensor schema
    Sensors,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            input,
            output,
            device,
            start,
            end,
            horizon,
            pretty,
        } => {
            log::info!("Starting {} v{}", APP_NAME, APP_VERSION);

            let mut config = config;
            if let Some(h) = horizon {
                config.forecast.horizon = h;
            }

            let filter = RecordFilter::from_strings(device.as_deref(), start.as_deref(), end.as_deref())
                .context("invalid filter")?;
            let rows = read_csv(&input)?;

            let pipeline = AnalyticsPipeline::new(config)?.with_filter(filter);
            let report = pipeline
                .run_rows(&rows)
                .with_context(|| format!("pipeline failed on {}", input.display()))?;

            if let Some(dir) = output {
                let writer = match dir {
                    Some(dir) => ReportWriter::from_path(dir)?,
                    None => ReportWriter::new()?,
                };
                let summary = writer.export(&report)?;
                log::info!("Report written to {}", summary.report_path.display());

                let (files, size_mb, latest) = writer.stats()?;
                log::debug!(
                    "{} holds {} export files ({:.2} MB), newest {}",
                    writer.base_dir().display(),
                    files,
                    size_mb,
                    latest.as_deref().unwrap_or("-")
                );
            }

            print_json(&report, pretty)?;
        }
        Commands::Sensors => {
            print_json(&config.schema.listing(), true)?;
        }
    }

    Ok(())
}

fn load_config(explicit: Option<&Path>) -> Result<AnalyticsConfig> {
    let fallback = default_config_path();
    let path = match explicit {
        Some(p) => Some(p),
        None if fallback.exists() => Some(fallback.as_path()),
        None => None,
    };

    AnalyticsConfig::load(path).context("failed to load analytics config")
}

fn read_csv(path: &Path) -> Result<Vec<Vec<String>>> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("malformed CSV in {}", path.display()))?;
        rows.push(record.iter().map(String::from).collect());
    }

    log::info!("Read {} CSV rows from {}", rows.len(), path.display());
    Ok(rows)
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if pretty {
        serde_json::to_writer_pretty(&mut out, value)?;
    } else {
        serde_json::to_writer(&mut out, value)?;
    }
    writeln!(out)?;
    Ok(())
}
