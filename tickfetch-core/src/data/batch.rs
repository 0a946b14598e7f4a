//! Batch fetcher: one date's bundle, fetched and validated as a unit.

use super::key_index::KeyIndexEstimator;
use super::locator::{ResourceAddress, ResourceLocator, ResourceName};
use super::provider::{DataError, RawResponse, ResourceFetcher};
use super::store::{BundleStore, PersistedBundle};
use super::validate::{self, DEFAULT_ERROR_PAGE_MARKER};
use crate::config::FetchConfig;
use chrono::NaiveDate;

/// Anything that can turn a date into a persisted bundle.
///
/// The scheduler is written against this trait so it can be driven without
/// transport or disk.
pub trait BundleFetch {
    fn fetch_and_persist(&self, date: NaiveDate) -> Result<PersistedBundle, DataError>;
}

/// Fetch → validate → persist for a single date.
pub struct BatchFetcher<'a> {
    fetcher: &'a dyn ResourceFetcher,
    estimator: KeyIndexEstimator,
    locator: ResourceLocator,
    store: BundleStore,
    error_page_marker: String,
}

impl<'a> BatchFetcher<'a> {
    pub fn new(
        fetcher: &'a dyn ResourceFetcher,
        estimator: KeyIndexEstimator,
        locator: ResourceLocator,
        store: BundleStore,
    ) -> Self {
        Self {
            fetcher,
            estimator,
            locator,
            store,
            error_page_marker: DEFAULT_ERROR_PAGE_MARKER.to_string(),
        }
    }

    pub fn from_config(fetcher: &'a dyn ResourceFetcher, config: &FetchConfig) -> Self {
        Self::new(
            fetcher,
            config.estimator(),
            config.locator(),
            config.store(),
        )
        .with_error_page_marker(config.error_page_marker.clone())
    }

    pub fn with_error_page_marker(mut self, marker: impl Into<String>) -> Self {
        self.error_page_marker = marker.into();
        self
    }

    pub fn estimator(&self) -> &KeyIndexEstimator {
        &self.estimator
    }

    pub fn locator(&self) -> &ResourceLocator {
        &self.locator
    }

    pub fn store(&self) -> &BundleStore {
        &self.store
    }

    pub fn error_page_marker(&self) -> &str {
        &self.error_page_marker
    }

    /// Issue a single request through the underlying transport.
    pub fn fetch_one(&self, address: &ResourceAddress) -> Result<RawResponse, DataError> {
        self.fetcher.fetch(address)
    }
}

impl BundleFetch for BatchFetcher<'_> {
    /// Nothing touches the disk until all four responses are in hand and valid.
    fn fetch_and_persist(&self, date: NaiveDate) -> Result<PersistedBundle, DataError> {
        let key = self.estimator.estimate(date)?;
        let addresses = self.locator.build_addresses(key);

        // Stops at the first transport fault; later addresses are not requested.
        let responses = addresses
            .iter()
            .map(|address| self.fetcher.fetch(address))
            .collect::<Result<Vec<RawResponse>, DataError>>()?;

        validate::validate_bundle(date, &addresses, &responses, &self.error_page_marker)?;

        let payloads: Vec<(ResourceName, &[u8])> = addresses
            .iter()
            .zip(&responses)
            .map(|(address, response)| (address.resource, response.body.as_slice()))
            .collect();

        self.store.write_bundle(date, key, &payloads)
    }
}
