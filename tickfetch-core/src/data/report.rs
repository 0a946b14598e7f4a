//! Outcome of one range download.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A date or trailing span that still needs a manual retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Unresolved {
    /// A single date that failed every attempt.
    Date { date: NaiveDate },
    /// The span left unattempted after the circuit breaker tripped.
    Range { start: NaiveDate, end: NaiveDate },
}

impl fmt::Display for Unresolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unresolved::Date { date } => write!(f, "{}", date.format("%Y-%m-%d")),
            Unresolved::Range { start, end } => write!(
                f,
                "{} ~ {}",
                start.format("%Y-%m-%d"),
                end.format("%Y-%m-%d")
            ),
        }
    }
}

/// Summary of a range download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeReport {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Dates and spans needing manual follow-up, in the order they occurred.
    pub unresolved: Vec<Unresolved>,
    pub succeeded: Vec<NaiveDate>,
    /// Bundle requests issued, retries included.
    pub attempts: u32,
    pub bytes_written: u64,
    pub circuit_tripped: bool,
}

impl RangeReport {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            unresolved: Vec::new(),
            succeeded: Vec::new(),
            attempts: 0,
            bytes_written: 0,
            circuit_tripped: false,
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.unresolved.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn renders_dates_and_ranges() {
        assert_eq!(
            Unresolved::Date { date: d("2025-01-09") }.to_string(),
            "2025-01-09"
        );
        assert_eq!(
            Unresolved::Range {
                start: d("2025-01-20"),
                end: d("2025-01-31")
            }
            .to_string(),
            "2025-01-20 ~ 2025-01-31"
        );
    }

    #[test]
    fn serializes_with_kind_tag() {
        let json = serde_json::to_value(Unresolved::Date { date: d("2025-01-09") }).unwrap();
        assert_eq!(json["kind"], "date");
        assert_eq!(json["date"], "2025-01-09");
    }
}
