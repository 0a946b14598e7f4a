//! Core library for tickfetch: key estimation, atomic bundle fetching and range scheduling.
//!
//! The provider publishes four files per trading day and addresses them by a
//! sequential key instead of a date. This crate contains:
//! - The key estimator (date → provider key) and the offset probe
//! - The resource locator (key → four addresses)
//! - The batch fetcher: fetch all four, validate all four, persist all four
//! - The range scheduler: weekend skipping, backoff retries, circuit breaker
//!
//! Transport, sleeping and progress reporting are traits so the whole
//! pipeline runs deterministically under test.

pub mod config;
pub mod data;

pub use config::FetchConfig;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: value types handed across the CLI boundary are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<FetchConfig>();
        require_sync::<FetchConfig>();
        require_send::<data::KeyIndex>();
        require_sync::<data::KeyIndex>();
        require_send::<data::KeyIndexEstimator>();
        require_sync::<data::KeyIndexEstimator>();
        require_send::<data::ResourceAddress>();
        require_sync::<data::ResourceAddress>();
        require_send::<data::PersistedBundle>();
        require_sync::<data::PersistedBundle>();
        require_send::<data::RangeReport>();
        require_sync::<data::RangeReport>();
        require_send::<data::DataError>();
        require_sync::<data::DataError>();
        require_send::<data::HttpFetcher>();
        require_sync::<data::HttpFetcher>();
    }

    /// The scheduler only sees bundles through `BundleFetch`; it never touches
    /// transport or storage directly.
    #[test]
    fn scheduler_depends_only_on_bundle_fetch() {
        fn _check_trait_object_builds<'a>(
            fetch: &'a dyn data::BundleFetch,
            sleeper: &'a dyn data::Sleeper,
            observer: &'a dyn data::DownloadObserver,
        ) -> data::RangeScheduler<'a> {
            data::RangeScheduler::new(fetch, sleeper, observer, data::SchedulePolicy::default())
        }
    }
}
