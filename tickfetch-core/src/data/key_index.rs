//! Date → provider key estimation.
//!
//! The provider numbers its publication days sequentially: one key per
//! weekday, none for weekends. Given an anchor Monday with a known key, the key
//! for any other date is the anchor key plus the elapsed days minus two keys
//! per elapsed week.
//!
//! Holidays are not modelled. When the provider skips or doubles a key the
//! estimate drifts for every later date until the anchor is recalibrated
//! (see `probe_offset`).

use super::provider::DataError;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The provider's sequential key for one publication day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct KeyIndex(pub u64);

impl fmt::Display for KeyIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 2025-01-06, a Monday, was published under key 5849.
pub const DEFAULT_ANCHOR_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2025, 1, 6) {
    Some(date) => date,
    None => panic!("invalid anchor date"),
};
pub const DEFAULT_ANCHOR_INDEX: u64 = 5849;

/// Pure date → key mapping relative to a calibrated anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyIndexEstimator {
    anchor_date: NaiveDate,
    anchor_index: u64,
}

impl Default for KeyIndexEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_ANCHOR_DATE, DEFAULT_ANCHOR_INDEX)
    }
}

impl KeyIndexEstimator {
    pub fn new(anchor_date: NaiveDate, anchor_index: u64) -> Self {
        Self {
            anchor_date,
            anchor_index,
        }
    }

    pub fn anchor_date(&self) -> NaiveDate {
        self.anchor_date
    }

    pub fn anchor_index(&self) -> KeyIndex {
        KeyIndex(self.anchor_index)
    }

    /// Weekly weekend correction only lines up with real weekends when the
    /// anchor is a Monday.
    pub fn anchor_is_monday(&self) -> bool {
        self.anchor_date.weekday() == Weekday::Mon
    }

    /// Estimate the key for `date`.
    ///
    /// Weekend dates map to the key of the following Monday; callers are
    /// expected to skip them.
    pub fn estimate(&self, date: NaiveDate) -> Result<KeyIndex, DataError> {
        let days_diff = (date - self.anchor_date).num_days();
        // Floor division: a date three days before the anchor is one week back.
        let weekends = 2 * days_diff.div_euclid(7);
        let out_of_range = || DataError::KeyOutOfRange { date };
        let anchor = i64::try_from(self.anchor_index).map_err(|_| out_of_range())?;
        let raw = anchor
            .checked_add(days_diff - weekends)
            .ok_or_else(out_of_range)?;
        u64::try_from(raw).map(KeyIndex).map_err(|_| out_of_range())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn anchor_maps_to_itself() {
        let est = KeyIndexEstimator::default();
        assert_eq!(est.estimate(d("2025-01-06")).unwrap(), KeyIndex(5849));
        assert!(est.anchor_is_monday());
    }

    #[test]
    fn known_dates_around_anchor() {
        let est = KeyIndexEstimator::default();
        assert_eq!(est.estimate(d("2025-01-09")).unwrap(), KeyIndex(5852));
        assert_eq!(est.estimate(d("2025-01-10")).unwrap(), KeyIndex(5853));
        assert_eq!(est.estimate(d("2025-01-13")).unwrap(), KeyIndex(5854));
    }

    #[test]
    fn dates_before_anchor_use_floor_division() {
        let est = KeyIndexEstimator::default();
        // Friday before the anchor Monday
        assert_eq!(est.estimate(d("2025-01-03")).unwrap(), KeyIndex(5848));
        // Monday one week earlier
        assert_eq!(est.estimate(d("2024-12-30")).unwrap(), KeyIndex(5844));
    }

    #[test]
    fn far_past_is_out_of_range() {
        let est = KeyIndexEstimator::new(d("2025-01-06"), 3);
        match est.estimate(d("2024-12-01")) {
            Err(DataError::KeyOutOfRange { date }) => assert_eq!(date, d("2024-12-01")),
            other => panic!("expected KeyOutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn anchor_beyond_signed_range_is_out_of_range() {
        let est = KeyIndexEstimator::new(d("2025-01-06"), u64::MAX);
        assert!(matches!(
            est.estimate(d("2025-01-06")),
            Err(DataError::KeyOutOfRange { .. })
        ));
        let est = KeyIndexEstimator::new(d("2025-01-06"), i64::MAX as u64);
        assert!(matches!(
            est.estimate(d("2025-01-13")),
            Err(DataError::KeyOutOfRange { .. })
        ));
    }

    #[test]
    fn non_monday_anchor_is_flagged() {
        let est = KeyIndexEstimator::new(d("2025-01-08"), 5851);
        assert!(!est.anchor_is_monday());
    }
}
