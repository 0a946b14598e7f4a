//! Key offset probe, a manual recalibration aid.
//!
//! Requests the summary file at the estimated key and compares the date the
//! provider actually published under that key with the requested one. A
//! non-zero offset means the anchor needs recalibrating. The scheduler never
//! calls this.

use super::batch::BatchFetcher;
use super::key_index::KeyIndex;
use super::locator::ResourceName;
use super::provider::DataError;
use super::validate;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// Result of probing one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeReport {
    pub requested: NaiveDate,
    pub estimated_key: KeyIndex,
    /// Publication date the provider reports for `estimated_key`.
    pub actual_date: NaiveDate,
    /// `requested - actual_date` in calendar days.
    pub offset_days: i64,
    /// `estimated_key + offset_days`, when non-negative.
    pub suggested_key: Option<KeyIndex>,
}

impl ProbeReport {
    pub fn is_aligned(&self) -> bool {
        self.offset_days == 0
    }
}

impl fmt::Display for ProbeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Target Date: {}, Estimated Index: {}",
            self.requested, self.estimated_key
        )?;
        write!(f, "Actual Date: {}, ", self.actual_date)?;
        match self.suggested_key {
            Some(key) => writeln!(f, "Actual Index: {key}")?,
            None => writeln!(f, "Actual Index: unknown")?,
        }
        write!(f, "Offset: {}", self.offset_days)
    }
}

/// Probe the provider for the real publication date behind `date`'s estimate.
pub fn probe_offset(batch: &BatchFetcher<'_>, date: NaiveDate) -> Result<ProbeReport, DataError> {
    let estimated_key = batch.estimator().estimate(date)?;
    let address = batch.locator().address(estimated_key, ResourceName::Summary);

    let response = batch.fetch_one(&address)?;
    validate::check_exists(&address, &response, batch.error_page_marker())?;

    let token = response
        .content_disposition
        .as_deref()
        .and_then(validate::publication_date_token);
    let mismatch = |found: Option<&str>| DataError::DateMismatch {
        resource: ResourceName::Summary,
        expected: date.format("%Y%m%d").to_string(),
        found: found.map(str::to_string),
    };
    let token = token.ok_or_else(|| mismatch(None))?;
    let actual_date =
        NaiveDate::parse_from_str(token, "%Y%m%d").map_err(|_| mismatch(Some(token)))?;

    let offset_days = (date - actual_date).num_days();
    let suggested_key = i64::try_from(estimated_key.0)
        .ok()
        .and_then(|key| key.checked_add(offset_days))
        .and_then(|key| u64::try_from(key).ok())
        .map(KeyIndex);

    Ok(ProbeReport {
        requested: date,
        estimated_key,
        actual_date,
        offset_days,
        suggested_key,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{
        BundleStore, KeyIndexEstimator, RawResponse, ResourceAddress, ResourceFetcher,
        ResourceLocator,
    };

    /// Reports the same publication date for every key.
    struct StaleFetcher {
        published: &'static str,
    }

    impl ResourceFetcher for StaleFetcher {
        fn name(&self) -> &str {
            "stale"
        }

        fn fetch(&self, address: &ResourceAddress) -> Result<RawResponse, DataError> {
            Ok(RawResponse {
                status: 200,
                final_url: address.url.clone(),
                content_disposition: Some(format!("attachment; filename=TC_{}.txt", self.published)),
                content_type: Some("text/plain".into()),
                body: Vec::new(),
            })
        }
    }

    fn batch(fetcher: &dyn ResourceFetcher) -> BatchFetcher<'_> {
        BatchFetcher::new(
            fetcher,
            KeyIndexEstimator::default(),
            ResourceLocator::new("https://example.test/hist"),
            BundleStore::new("unused"),
        )
    }

    #[test]
    fn aligned_estimate_has_zero_offset() {
        let fetcher = StaleFetcher {
            published: "20250109",
        };
        let date = NaiveDate::from_ymd_opt(2025, 1, 9).unwrap();
        let report = probe_offset(&batch(&fetcher), date).unwrap();

        assert!(report.is_aligned());
        assert_eq!(report.estimated_key, KeyIndex(5852));
        assert_eq!(report.suggested_key, Some(KeyIndex(5852)));
    }

    #[test]
    fn drifted_estimate_reports_signed_offset() {
        // Provider's key 5852 actually holds 2025-01-08: one day behind.
        let fetcher = StaleFetcher {
            published: "20250108",
        };
        let date = NaiveDate::from_ymd_opt(2025, 1, 9).unwrap();
        let report = probe_offset(&batch(&fetcher), date).unwrap();

        assert_eq!(report.offset_days, 1);
        assert_eq!(report.actual_date, NaiveDate::from_ymd_opt(2025, 1, 8).unwrap());
        assert_eq!(report.suggested_key, Some(KeyIndex(5853)));
        assert!(report.to_string().contains("Offset: 1"));
    }

    #[test]
    fn unparseable_token_is_mismatch() {
        let fetcher = StaleFetcher {
            published: "20251399",
        };
        let date = NaiveDate::from_ymd_opt(2025, 1, 9).unwrap();
        assert!(matches!(
            probe_offset(&batch(&fetcher), date),
            Err(DataError::DateMismatch { found: Some(_), .. })
        ));
    }
}
