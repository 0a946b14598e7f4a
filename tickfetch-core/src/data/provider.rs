//! Transport trait, observer trait and structured error types.
//!
//! `ResourceFetcher` abstracts over the HTTP transport so the batch fetcher can
//! be driven by scripted responses in tests. `DownloadObserver` receives every
//! scheduler event; the default implementation forwards them to `tracing`.

use super::locator::{ResourceAddress, ResourceName};
use super::report::{RangeReport, Unresolved};
use super::store::PersistedBundle;
use chrono::NaiveDate;
use std::time::Duration;
use thiserror::Error;

/// Structured error types for data operations.
///
/// `Transport`, `NotFound`, `DateMismatch` and `Storage` fail a single bundle
/// and are retried by the scheduler. `Ordering` and `Config` are fatal.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable for {address}: {reason}")]
    Transport { address: String, reason: String },

    #[error("resource not found at {address} (HTTP {status})")]
    NotFound { address: String, status: u16 },

    #[error(
        "date mismatch for {resource}: requested {expected}, provider returned {}",
        found.as_deref().unwrap_or("no date")
    )]
    DateMismatch {
        resource: ResourceName,
        expected: String,
        found: Option<String>,
    },

    #[error("start date {start} is after end date {end}")]
    Ordering { start: NaiveDate, end: NaiveDate },

    #[error("no key index exists for {date}: it falls before the provider's first key")]
    KeyOutOfRange { date: NaiveDate },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("config error: {0}")]
    Config(String),
}

impl DataError {
    /// Short machine-friendly label used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            DataError::Transport { .. } => "transport",
            DataError::NotFound { .. } => "not_found",
            DataError::DateMismatch { .. } => "date_mismatch",
            DataError::Ordering { .. } => "ordering",
            DataError::KeyOutOfRange { .. } => "key_out_of_range",
            DataError::Storage(_) => "storage",
            DataError::Config(_) => "config",
        }
    }
}

/// One raw response, as seen after redirects.
#[derive(Debug, Clone, Default)]
pub struct RawResponse {
    pub status: u16,
    /// Effective URL after redirects. The provider signals missing data by
    /// redirecting here to an error page with a 200 status.
    pub final_url: String,
    pub content_disposition: Option<String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for resource transports.
///
/// A transport only moves bytes: any connection fault or timeout is reported
/// as `DataError::Transport`. Interpreting the response (error pages, dates)
/// is left to the validation layer.
pub trait ResourceFetcher: Send + Sync {
    /// Human-readable name of this transport.
    fn name(&self) -> &str;

    /// Issue one request for the given address.
    fn fetch(&self, address: &ResourceAddress) -> Result<RawResponse, DataError>;
}

/// Event sink for range downloads.
pub trait DownloadObserver {
    /// Called right before a bundle request is issued.
    fn on_attempt(&self, date: NaiveDate, attempt: u32, max_attempts: u32);

    /// Called when all four files for a date are on disk.
    fn on_success(&self, date: NaiveDate, bundle: &PersistedBundle);

    /// Called after each failed attempt.
    fn on_failure(&self, date: NaiveDate, attempt: u32, max_attempts: u32, error: &DataError);

    /// Called before sleeping ahead of the next request.
    fn on_backoff(&self, date: NaiveDate, delay: Duration);

    fn on_weekend_skip(&self, date: NaiveDate);

    /// Called when a date has used up its attempts and is left for manual retry.
    fn on_given_up(&self, date: NaiveDate);

    /// Called when the circuit breaker aborts the rest of the range.
    fn on_circuit_open(&self, consecutive_failures: u32, remaining: &Unresolved);

    /// Called once when the range is done, tripped or not.
    fn on_range_complete(&self, report: &RangeReport);
}

/// Observer that forwards every event to `tracing`.
pub struct TracingObserver;

impl DownloadObserver for TracingObserver {
    fn on_attempt(&self, date: NaiveDate, attempt: u32, max_attempts: u32) {
        tracing::info!(
            %date,
            attempt,
            max_attempts,
            "Downloading files for date {date} ({})...",
            date.format("%A")
        );
    }

    fn on_success(&self, date: NaiveDate, bundle: &PersistedBundle) {
        for file in &bundle.files {
            tracing::debug!(path = %file.path.display(), bytes = file.bytes, "Downloaded {}", file.resource);
        }
        tracing::info!(%date, key = %bundle.key, bytes = bundle.total_bytes(), "All files downloaded for date {date}");
    }

    fn on_failure(&self, date: NaiveDate, attempt: u32, max_attempts: u32, error: &DataError) {
        tracing::error!(
            %date,
            attempt,
            max_attempts,
            kind = error.kind(),
            "Failed to download files for date {date}: {error}"
        );
    }

    fn on_backoff(&self, date: NaiveDate, delay: Duration) {
        tracing::info!(%date, delay_ms = delay.as_millis() as u64, "Waiting {delay:?} before next request");
    }

    fn on_weekend_skip(&self, date: NaiveDate) {
        tracing::info!(%date, "Skipping weekend date: {date}");
    }

    fn on_given_up(&self, date: NaiveDate) {
        tracing::error!(%date, "Max retries reached for date {date}. Moving to next date.");
    }

    fn on_circuit_open(&self, consecutive_failures: u32, remaining: &Unresolved) {
        tracing::error!(
            consecutive_failures,
            %remaining,
            "{consecutive_failures} consecutive failed dates, circuit breaker triggered. Stopping further downloads."
        );
    }

    fn on_range_complete(&self, report: &RangeReport) {
        if report.all_succeeded() {
            tracing::info!(
                succeeded = report.succeeded.len(),
                attempts = report.attempts,
                bytes = report.bytes_written,
                "Range {} ~ {} complete",
                report.start,
                report.end
            );
        } else {
            let entries: Vec<String> = report.unresolved.iter().map(|u| u.to_string()).collect();
            tracing::warn!(
                succeeded = report.succeeded.len(),
                attempts = report.attempts,
                "Some dates failed to download and may require manual retries: [{}]",
                entries.join(", ")
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_range_is_success() {
        let mut resp = RawResponse {
            status: 200,
            ..Default::default()
        };
        assert!(resp.is_success());
        resp.status = 302;
        assert!(!resp.is_success());
        resp.status = 404;
        assert!(!resp.is_success());
    }

    #[test]
    fn error_messages_are_displayable() {
        let err = DataError::DateMismatch {
            resource: ResourceName::Summary,
            expected: "20250109".into(),
            found: None,
        };
        assert_eq!(
            err.to_string(),
            "date mismatch for summary: requested 20250109, provider returned no date"
        );
        assert_eq!(err.kind(), "date_mismatch");
    }
}
