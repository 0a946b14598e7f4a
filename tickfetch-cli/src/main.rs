//! tickfetch CLI: download and probe commands.
//!
//! Commands:
//! - `download --today`: fetch today's bundle
//! - `download --historical START [END]`: fetch one date or an inclusive range
//! - `probe DATE`: compare the estimated key with the provider's actual date

mod logging;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tickfetch_core::data::{
    probe_offset, BatchFetcher, RangeReport, RangeScheduler, SchedulePolicy, ThreadSleeper,
    TracingObserver,
};
use tickfetch_core::FetchConfig;
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "tickfetch",
    about = "Download daily derivatives tick and summary files for a date or date range"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML config file. Defaults are used for anything it leaves out.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for per-run log files.
    #[arg(long, global = true, default_value = "logs")]
    log_dir: PathBuf,

    /// Log to the console only.
    #[arg(long, global = true, default_value_t = false)]
    no_log_file: bool,

    /// Show debug output on the console.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Download bundles for today or for historical dates.
    Download {
        #[command(flatten)]
        dates: DateSelection,

        /// Output directory. Overrides `output_dir` from the config.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Write the range report as JSON to this path.
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Check how far the key estimate for a date is from the provider's numbering.
    Probe {
        /// Date to probe (YYYY-MM-DD).
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct DateSelection {
    /// Download today's files only.
    #[arg(long)]
    today: bool,

    /// One date (single day) or two dates (inclusive range), YYYY-MM-DD.
    /// Example: --historical 2025-01-09 2025-01-12
    #[arg(long, num_args = 1..=2, value_name = "DATE", value_parser = parse_date)]
    historical: Option<Vec<NaiveDate>>,
}

impl DateSelection {
    fn resolve(&self) -> Result<(NaiveDate, NaiveDate)> {
        let (start, end) = match self.historical.as_deref() {
            Some([single]) => (*single, *single),
            Some([start, end]) => (*start, *end),
            Some(_) => bail!("--historical requires exactly 1 or 2 dates in YYYY-MM-DD format"),
            None => {
                let today = chrono::Local::now().date_naive();
                (today, today)
            }
        };
        if start > end {
            bail!("--historical start date must be earlier than or equal to the end date");
        }
        Ok((start, end))
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{s}', expected YYYY-MM-DD"))
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let _log_guard = logging::init_logging(&logging::LogOptions {
        verbose: cli.verbose,
        log_dir: (!cli.no_log_file).then(|| cli.log_dir.clone()),
    })?;

    let mut config = match &cli.config {
        Some(path) => FetchConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => FetchConfig::default(),
    };

    match cli.command {
        Commands::Download {
            dates,
            output_dir,
            report,
        } => {
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            run_download(&config, &dates, report)
        }
        Commands::Probe { date } => run_probe(&config, date),
    }
}

fn run_download(
    config: &FetchConfig,
    dates: &DateSelection,
    report_path: Option<PathBuf>,
) -> Result<ExitCode> {
    let (start, end) = dates.resolve()?;
    let estimator = config.estimator();
    if !estimator.anchor_is_monday() {
        warn!(
            anchor = %estimator.anchor_date(),
            anchor_index = %estimator.anchor_index(),
            "Anchor date is not a Monday; key estimates will drift across weekends"
        );
    }

    let transport = config.http_fetcher()?;
    let batch = BatchFetcher::from_config(&transport, config);
    let scheduler =
        RangeScheduler::new(&batch, &ThreadSleeper, &TracingObserver, SchedulePolicy::from(config));

    info!(%start, %end, output_dir = %config.output_dir.display(), "Starting download");
    let report = scheduler.run(start, end)?;

    if let Some(path) = report_path {
        write_report(&report, &path)?;
    }
    print_summary(&report);
    info!("Download pipeline completed.");

    Ok(if report.all_succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn run_probe(config: &FetchConfig, date: NaiveDate) -> Result<ExitCode> {
    let transport = config.http_fetcher()?;
    let batch = BatchFetcher::from_config(&transport, config);

    let report = probe_offset(&batch, date)?;
    info!(
        requested = %report.requested,
        estimated_key = %report.estimated_key,
        actual_date = %report.actual_date,
        offset_days = report.offset_days,
        "Probe complete"
    );
    println!("{report}");
    if !report.is_aligned() {
        println!();
        println!(
            "The estimate is off by {} day(s). Recalibrate anchor_date/anchor_index in the config.",
            report.offset_days
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn write_report(report: &RangeReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("failed to serialize report")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write report {}", path.display()))?;
    info!(path = %path.display(), "Report written");
    Ok(())
}

fn print_summary(report: &RangeReport) {
    println!();
    println!("=== Download Summary ===");
    println!("Range:          {} to {}", report.start, report.end);
    println!("Succeeded:      {}", report.succeeded.len());
    println!("Attempts:       {}", report.attempts);
    println!("Bytes written:  {}", format_size(report.bytes_written));
    if report.circuit_tripped {
        println!("Circuit breaker tripped: remaining dates were not attempted");
    }
    if !report.unresolved.is_empty() {
        println!();
        println!("Needs manual retry:");
        for entry in &report.unresolved {
            println!("  {entry}");
        }
    }
    println!();
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
