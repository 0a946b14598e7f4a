//! Range scheduler: drives the batch fetcher across a date range.
//!
//! Per date: `Pending → Attempting → {Succeeded, Retrying, GivenUp}`.
//! - Saturdays and Sundays are skipped without touching any counter.
//! - A failed attempt with attempts left sleeps `unit * 2^attempt`, then
//!   retries the same date.
//! - A date that has used `max_attempts` is recorded as unresolved and the
//!   cursor moves on with no backoff.
//! - Each exhausted date counts once towards the circuit breaker; a success
//!   resets it. When it opens, the rest of the range is recorded as one span
//!   and the session ends without further requests.

use super::backoff::{Backoff, Sleeper};
use super::batch::BundleFetch;
use super::circuit_breaker::CircuitBreaker;
use super::provider::{DataError, DownloadObserver};
use super::report::{RangeReport, Unresolved};
use crate::config::FetchConfig;
use chrono::{Datelike, NaiveDate, Weekday};

/// Retry and breaker limits for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulePolicy {
    pub max_attempts: u32,
    pub circuit_breaker_threshold: u32,
    pub backoff: Backoff,
}

impl Default for SchedulePolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            circuit_breaker_threshold: 10,
            backoff: Backoff::default(),
        }
    }
}

impl From<&FetchConfig> for SchedulePolicy {
    fn from(config: &FetchConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            circuit_breaker_threshold: config.circuit_breaker_threshold,
            backoff: Backoff::new(config.backoff_unit()),
        }
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Mutable state of one `run` call.
struct SessionState {
    cursor: NaiveDate,
    attempt: u32,
    breaker: CircuitBreaker,
    report: RangeReport,
}

impl SessionState {
    fn new(start: NaiveDate, end: NaiveDate, policy: &SchedulePolicy) -> Self {
        Self {
            cursor: start,
            attempt: 0,
            breaker: CircuitBreaker::new(policy.circuit_breaker_threshold),
            report: RangeReport::new(start, end),
        }
    }

    /// Move to the next calendar day. False once the calendar runs out.
    fn advance(&mut self) -> bool {
        self.attempt = 0;
        match self.cursor.succ_opt() {
            Some(next) => {
                self.cursor = next;
                true
            }
            None => false,
        }
    }
}

/// Sequential, single-threaded range downloader.
pub struct RangeScheduler<'a> {
    fetcher: &'a dyn BundleFetch,
    sleeper: &'a dyn Sleeper,
    observer: &'a dyn DownloadObserver,
    policy: SchedulePolicy,
}

impl<'a> RangeScheduler<'a> {
    pub fn new(
        fetcher: &'a dyn BundleFetch,
        sleeper: &'a dyn Sleeper,
        observer: &'a dyn DownloadObserver,
        policy: SchedulePolicy,
    ) -> Self {
        Self {
            fetcher,
            sleeper,
            observer,
            policy,
        }
    }

    /// Download every weekday in `start..=end`.
    ///
    /// Fails only on a reversed range, before any request. Everything else
    /// ends up in the returned report.
    pub fn run(&self, start: NaiveDate, end: NaiveDate) -> Result<RangeReport, DataError> {
        if start > end {
            return Err(DataError::Ordering { start, end });
        }

        let max_attempts = self.policy.max_attempts.max(1);
        let mut session = SessionState::new(start, end, &self.policy);

        while session.cursor <= end {
            if !session.breaker.is_allowed() {
                let remaining = Unresolved::Range {
                    start: session.cursor,
                    end,
                };
                self.observer
                    .on_circuit_open(session.breaker.consecutive_failures(), &remaining);
                session.report.unresolved.push(remaining);
                session.report.circuit_tripped = true;
                break;
            }

            let date = session.cursor;
            if is_weekend(date) {
                self.observer.on_weekend_skip(date);
                if !session.advance() {
                    break;
                }
                continue;
            }

            session.attempt += 1;
            session.report.attempts += 1;
            let attempt = session.attempt;
            self.observer.on_attempt(date, attempt, max_attempts);

            match self.fetcher.fetch_and_persist(date) {
                Ok(bundle) => {
                    self.observer.on_success(date, &bundle);
                    session.breaker.record_success();
                    session.report.succeeded.push(date);
                    session.report.bytes_written += bundle.total_bytes();
                    if !session.advance() {
                        break;
                    }
                }
                Err(err) => {
                    self.observer.on_failure(date, attempt, max_attempts, &err);
                    if attempt < max_attempts {
                        let delay = self.policy.backoff.delay(attempt);
                        self.observer.on_backoff(date, delay);
                        self.sleeper.sleep(delay);
                        continue;
                    }

                    self.observer.on_given_up(date);
                    session.report.unresolved.push(Unresolved::Date { date });
                    session.breaker.record_failure();
                    if !session.advance() {
                        break;
                    }
                }
            }
        }

        self.observer.on_range_complete(&session.report);
        Ok(session.report)
    }
}
