//! Process-wide logging setup.
//!
//! Two layers: the console at INFO (or `RUST_LOG` / `--verbose`), and a
//! per-run file `{log_dir}/{YYYYMMDD_HHMMSS}.log` that keeps everything from
//! DEBUG up, without ANSI colors.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

pub struct LogOptions {
    pub verbose: bool,
    /// `None` disables the file layer.
    pub log_dir: Option<PathBuf>,
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop; keep it alive until
/// the process exits.
pub fn init_logging(options: &LogOptions) -> Result<Option<WorkerGuard>> {
    let default_level = if options.verbose { "debug" } else { "info" };
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let console_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false)
        .with_filter(console_filter);

    let Some(log_dir) = &options.log_dir else {
        tracing_subscriber::registry()
            .with(console_layer)
            .try_init()
            .context("failed to install tracing subscriber")?;
        return Ok(None);
    };

    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;
    let file_name = format!("{}.log", chrono::Local::now().format("%Y%m%d_%H%M%S"));
    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_filter(LevelFilter::DEBUG);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;

    tracing::debug!(dir = %log_dir.display(), "Logging is set up.");
    Ok(Some(guard))
}
