//! CLI entry point for the SEO comparison tool.
//!
//! Provides subcommands for comparing the averages of two SEO exports,
//! saving the comparison chart, and downloading fresh exports from the
//! scraping service.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use seo_compare::analyzers::compare::ComparisonSession;
use seo_compare::analyzers::types::{Slot, TargetFieldSet};
use seo_compare::config::AppConfig;
use seo_compare::export::render::{ChartView, SvgChartRenderer};
use seo_compare::export::{ExportCoordinator, RemotePayload};
use seo_compare::fetch::{BasicClient, ScrapingService};
use seo_compare::output::{ComparisonReport, print_pretty, print_table, to_json, write_csv};
use seo_compare::parser::TableParser;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const CHART_VIEW: &str = "comparison-chart";

#[derive(Parser)]
#[command(name = "seo_compare")]
#[command(about = "Compare average SEO metrics of two scraped result sets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Table,
    Json,
    Csv,
}

#[derive(clap::Args)]
struct Inputs {
    /// CSV loaded into the first slot
    #[arg(long, value_name = "CSV")]
    first: PathBuf,

    /// CSV loaded into the second slot
    #[arg(long, value_name = "CSV")]
    second: Option<PathBuf>,

    /// Field delimiter
    #[arg(long, default_value_t = ',')]
    delimiter: char,

    /// Fields to compare, in display order (defaults to the SEO metric set)
    #[arg(long = "field", value_name = "NAME")]
    fields: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Average both CSVs and print the merged series
    Compare {
        #[command(flatten)]
        inputs: Inputs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Table)]
        format: Format,

        /// Write the output to a file instead of the log / stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Save the comparison chart as an image named after both inputs
    Snapshot {
        #[command(flatten)]
        inputs: Inputs,

        /// Directory to save the image in
        #[arg(short = 'd', long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Download CSVs from the scraping service
    Fetch {
        /// Keyword to search for
        #[arg(short, long)]
        keyword: String,

        /// Also analyze this page for the keyword, in parallel with the search
        #[arg(short, long)]
        url: Option<String>,

        /// Directory to save the CSVs in
        #[arg(short = 'd', long, default_value = ".")]
        out_dir: PathBuf,

        /// Scraping service base URL (overrides SEO_SERVICE_URL)
        #[arg(long)]
        service_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let config = AppConfig::from_env()?;

    // Logging setup: colored stderr + JSON rolling log file
    let log_dir = Path::new(&config.log_file_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&config.log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("seo_compare.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compare {
            inputs,
            format,
            output,
        } => {
            let session = load_session(&inputs)?;
            let series = session.merged();
            print_pretty(&series);

            let report = ComparisonReport::new(
                session.label(Slot::First),
                session.label(Slot::Second),
                &series,
            );

            match (format, output) {
                (Format::Table, None) => print_table(&report),
                (Format::Table, Some(_)) => {
                    bail!("table output goes to the log; use --format json or csv with --output")
                }
                (Format::Json, None) => println!("{}", to_json(&report)?),
                (Format::Json, Some(path)) => {
                    std::fs::write(&path, to_json(&report)?)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    info!(path = %path.display(), "Comparison written");
                }
                (Format::Csv, None) => write_csv(std::io::stdout().lock(), &report)?,
                (Format::Csv, Some(path)) => {
                    let file = std::fs::File::create(&path)
                        .with_context(|| format!("failed to create {}", path.display()))?;
                    write_csv(file, &report)?;
                    info!(path = %path.display(), "Comparison written");
                }
            }
        }
        Commands::Snapshot { inputs, out_dir } => {
            let session = load_session(&inputs)?;
            let first = session.label(Slot::First).unwrap_or_default().to_string();
            let second = session.label(Slot::Second).unwrap_or_default().to_string();

            let service = ScrapingService::new(BasicClient::new(), &config.service_url)?;
            let mut exporter = ExportCoordinator::new(service, SvgChartRenderer::new());
            exporter.renderer_mut().register(
                CHART_VIEW,
                ChartView {
                    title: format!("{first} vs {second}"),
                    first_label: first.clone(),
                    second_label: second.clone(),
                    series: session.merged(),
                },
            );

            let snapshot = exporter.export_snapshot(CHART_VIEW, &first, &second).await?;
            save(&out_dir, &snapshot.file_name, &snapshot.bytes)?;
        }
        Commands::Fetch {
            keyword,
            url,
            out_dir,
            service_url,
        } => {
            let base_url = service_url.unwrap_or(config.service_url.clone());
            let client =
                BasicClient::with_timeouts(config.request_timeout, config.connect_timeout)?;
            let service = ScrapingService::new(client, &base_url)?;
            let exporter = ExportCoordinator::new(service, SvgChartRenderer::new());

            info!(
                keyword = %keyword,
                base_url = %base_url,
                "Requesting CSVs from scraping service"
            );

            let search = exporter.request_remote_csv(&keyword);
            let analysis = async {
                match &url {
                    Some(url) => Some(exporter.request_remote_analysis(&keyword, url).await),
                    None => None,
                }
            };
            let (search, analysis) = tokio::join!(search, analysis);

            let mut failures = 0;
            for (what, outcome) in std::iter::once(("keyword search", search))
                .chain(analysis.map(|a| ("url analysis", a)))
            {
                match outcome {
                    Ok(payload) => store(&out_dir, &payload)?,
                    Err(e) => {
                        failures += 1;
                        error!(kind = e.kind().as_str(), error = %e, "{what} failed");
                    }
                }
            }
            if failures > 0 {
                bail!("{failures} request(s) to the scraping service failed");
            }
        }
    }

    Ok(())
}

/// Loads the input CSVs into a fresh session, first slot then second.
fn load_session(inputs: &Inputs) -> Result<ComparisonSession> {
    if !inputs.delimiter.is_ascii() {
        bail!("delimiter must be a single ASCII character");
    }
    let fields = if inputs.fields.is_empty() {
        TargetFieldSet::seo()
    } else {
        TargetFieldSet::new(inputs.fields.iter().cloned())
    };
    let parser = TableParser::new().with_delimiter(inputs.delimiter as u8);
    let mut session = ComparisonSession::new(fields).with_parser(parser);

    let slots = std::iter::once((Slot::First, &inputs.first))
        .chain(inputs.second.as_ref().map(|p| (Slot::Second, p)));
    for (slot, path) in slots {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let label = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        session
            .load_bytes(slot, &bytes, label)
            .with_context(|| format!("failed to load {}", path.display()))?;
        info!(slot = %slot, path = %path.display(), "Dataset loaded");
    }

    Ok(session)
}

fn store(out_dir: &Path, payload: &RemotePayload) -> Result<()> {
    save(out_dir, &payload.file_name, &payload.bytes)
}

fn save(out_dir: &Path, file_name: &str, bytes: &[u8]) -> Result<()> {
    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join(file_name);
    std::fs::write(&path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), bytes = bytes.len(), "File saved");
    Ok(())
}
