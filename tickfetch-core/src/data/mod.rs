//! Data retrieval: key estimation, fetching, validation, persistence, scheduling

pub mod backoff;
pub mod batch;
pub mod circuit_breaker;
pub mod http;
pub mod key_index;
pub mod locator;
pub mod probe;
pub mod provider;
pub mod report;
pub mod scheduler;
pub mod store;
pub mod validate;

pub use backoff::{Backoff, Sleeper, ThreadSleeper};
pub use batch::{BatchFetcher, BundleFetch};
pub use circuit_breaker::{BreakerState, CircuitBreaker};
pub use http::HttpFetcher;
pub use key_index::{KeyIndex, KeyIndexEstimator};
pub use locator::{ResourceAddress, ResourceLocator, ResourceName};
pub use probe::{probe_offset, ProbeReport};
pub use provider::{DataError, DownloadObserver, RawResponse, ResourceFetcher, TracingObserver};
pub use report::{RangeReport, Unresolved};
pub use scheduler::{RangeScheduler, SchedulePolicy};
pub use store::{BundleStore, PersistedBundle, PersistedFile};
