//! Downloader configuration.
//!
//! Stored as TOML. Every field has a default, so an empty file (or no file at
//! all) gives the stock SGX setup:
//!
//! ```toml
//! base_url = "https://links.sgx.com/1.0.0/derivatives-historical"
//! anchor_date = "2025-01-06"
//! anchor_index = 5849
//! output_dir = "downloads"
//! request_timeout_secs = 10
//! max_attempts = 3
//! circuit_breaker_threshold = 10
//! backoff_unit_ms = 1000
//! error_page_marker = "CustomErrorPage"
//! ```

use crate::data::http::DEFAULT_USER_AGENT;
use crate::data::key_index::{DEFAULT_ANCHOR_DATE, DEFAULT_ANCHOR_INDEX};
use crate::data::validate::DEFAULT_ERROR_PAGE_MARKER;
use crate::data::{BundleStore, DataError, HttpFetcher, KeyIndexEstimator, ResourceLocator};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://links.sgx.com/1.0.0/derivatives-historical";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    /// Base path; resources live at `{base_url}/{key}/{file_name}`.
    pub base_url: String,

    /// A Monday with a known key. Recalibrate with `tickfetch probe`.
    pub anchor_date: NaiveDate,
    pub anchor_index: u64,

    /// Root of the per-date download directories.
    pub output_dir: PathBuf,

    pub request_timeout_secs: u64,
    pub user_agent: String,

    /// Attempts per date, first attempt included.
    pub max_attempts: u32,

    /// Consecutive exhausted dates before the session is aborted.
    pub circuit_breaker_threshold: u32,

    /// Backoff after attempt `n` is `backoff_unit_ms * 2^n`.
    pub backoff_unit_ms: u64,

    pub error_page_marker: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            anchor_date: DEFAULT_ANCHOR_DATE,
            anchor_index: DEFAULT_ANCHOR_INDEX,
            output_dir: PathBuf::from("downloads"),
            request_timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_attempts: 3,
            circuit_breaker_threshold: 10,
            backoff_unit_ms: 1000,
            error_page_marker: DEFAULT_ERROR_PAGE_MARKER.to_string(),
        }
    }
}

impl FetchConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, DataError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DataError::Config(format!("read {}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, DataError> {
        let config: Self =
            toml::from_str(content).map_err(|e| DataError::Config(format!("parse TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DataError> {
        if self.base_url.trim().is_empty() {
            return Err(DataError::Config("base_url must not be empty".into()));
        }
        if i64::try_from(self.anchor_index).is_err() {
            return Err(DataError::Config(format!(
                "anchor_index must not exceed {}",
                i64::MAX
            )));
        }
        if self.max_attempts == 0 {
            return Err(DataError::Config("max_attempts must be at least 1".into()));
        }
        if self.circuit_breaker_threshold == 0 {
            return Err(DataError::Config(
                "circuit_breaker_threshold must be at least 1".into(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(DataError::Config(
                "request_timeout_secs must be at least 1".into(),
            ));
        }
        if self.error_page_marker.is_empty() {
            return Err(DataError::Config("error_page_marker must not be empty".into()));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn backoff_unit(&self) -> Duration {
        Duration::from_millis(self.backoff_unit_ms)
    }

    pub fn estimator(&self) -> KeyIndexEstimator {
        KeyIndexEstimator::new(self.anchor_date, self.anchor_index)
    }

    pub fn locator(&self) -> ResourceLocator {
        ResourceLocator::new(self.base_url.clone())
    }

    pub fn store(&self) -> BundleStore {
        BundleStore::new(self.output_dir.clone())
    }

    pub fn http_fetcher(&self) -> Result<HttpFetcher, DataError> {
        HttpFetcher::new(self.request_timeout(), &self.user_agent)
    }
}
