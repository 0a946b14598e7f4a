//! Property tests for key estimation.
//!
//! Uses proptest to verify:
//! 1. Consecutive weekdays differ by exactly one key, across weekends too
//! 2. Estimation is deterministic
//! 3. A week always advances the key by five
//! 4. Addresses always carry the estimated key, one per role

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use proptest::prelude::*;
use tickfetch_core::data::{KeyIndex, KeyIndexEstimator, ResourceLocator, ResourceName};

// ── Strategies (proptest) ────────────────────────────────────────────

/// Any date within roughly ten years either side of the anchor.
fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (-3650i64..3650).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2025, 1, 6).unwrap() + Duration::days(offset)
    })
}

fn arb_weekday_date() -> impl Strategy<Value = NaiveDate> {
    arb_date().prop_filter("weekday", |d| {
        !matches!(d.weekday(), Weekday::Sat | Weekday::Sun)
    })
}

fn next_weekday(date: NaiveDate) -> NaiveDate {
    let mut next = date + Duration::days(1);
    while matches!(next.weekday(), Weekday::Sat | Weekday::Sun) {
        next += Duration::days(1);
    }
    next
}

proptest! {
    /// The next publication day always gets the next key.
    #[test]
    fn next_weekday_is_next_key(date in arb_weekday_date()) {
        let est = KeyIndexEstimator::default();
        let today = est.estimate(date).unwrap();
        let tomorrow = est.estimate(next_weekday(date)).unwrap();
        prop_assert_eq!(tomorrow.0, today.0 + 1);
    }

    #[test]
    fn estimate_is_deterministic(date in arb_date()) {
        let est = KeyIndexEstimator::default();
        prop_assert_eq!(est.estimate(date).unwrap(), est.estimate(date).unwrap());
    }

    /// Seven calendar days hold five publication days.
    #[test]
    fn one_week_is_five_keys(date in arb_date()) {
        let est = KeyIndexEstimator::default();
        let now = est.estimate(date).unwrap();
        let later = est.estimate(date + Duration::days(7)).unwrap();
        prop_assert_eq!(later.0, now.0 + 5);
    }

    #[test]
    fn addresses_carry_estimated_key(date in arb_weekday_date()) {
        let est = KeyIndexEstimator::default();
        let key = est.estimate(date).unwrap();
        let addrs = ResourceLocator::new("https://provider.test/hist").build_addresses(key);
        for (addr, role) in addrs.iter().zip(ResourceName::ALL) {
            prop_assert_eq!(addr.key, key);
            prop_assert_eq!(addr.resource, role);
            let expected_suffix = format!("/{}/{}", key, role.file_name());
            prop_assert!(addr.url.ends_with(&expected_suffix));
        }
    }
}

#[test]
fn friday_to_monday_is_one_key() {
    let est = KeyIndexEstimator::default();
    let friday = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
    let monday = NaiveDate::from_ymd_opt(2025, 1, 13).unwrap();
    assert_eq!(est.estimate(friday).unwrap(), KeyIndex(5853));
    assert_eq!(est.estimate(monday).unwrap(), KeyIndex(5854));
}
