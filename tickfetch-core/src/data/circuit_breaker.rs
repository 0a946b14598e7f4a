//! Session circuit breaker.
//!
//! Counts dates that ended with all attempts exhausted, in a row. Once the
//! count reaches the threshold the breaker opens and stays open for the rest
//! of the session: the scheduler stops issuing requests and reports the
//! remaining span instead. There is no cooldown; a new session starts closed.

/// State of the circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    /// Normal operation; requests are allowed.
    Closed,
    /// Tripped; no further requests this session.
    Open,
}

/// Circuit breaker that stops a session after a burst of failed dates.
#[derive(Debug)]
pub struct CircuitBreaker {
    consecutive_failures: u32,
    failure_threshold: u32,
}

impl CircuitBreaker {
    /// A threshold of zero is treated as one.
    pub fn new(failure_threshold: u32) -> Self {
        Self {
            consecutive_failures: 0,
            failure_threshold: failure_threshold.max(1),
        }
    }

    pub fn state(&self) -> BreakerState {
        if self.consecutive_failures >= self.failure_threshold {
            BreakerState::Open
        } else {
            BreakerState::Closed
        }
    }

    /// Check if requests are currently allowed.
    pub fn is_allowed(&self) -> bool {
        self.state() == BreakerState::Closed
    }

    /// Record a successful date. Resets the failure counter.
    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
    }

    /// Record a date that exhausted its attempts.
    pub fn record_failure(&mut self) -> BreakerState {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.state()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_closed() {
        let cb = CircuitBreaker::new(10);
        assert!(cb.is_allowed());
        assert_eq!(cb.consecutive_failures(), 0);
    }

    #[test]
    fn trips_at_threshold() {
        let mut cb = CircuitBreaker::new(3);
        assert_eq!(cb.record_failure(), BreakerState::Closed);
        assert_eq!(cb.record_failure(), BreakerState::Closed);
        assert!(cb.is_allowed()); // 2 < 3
        assert_eq!(cb.record_failure(), BreakerState::Open);
        assert!(!cb.is_allowed()); // 3 >= 3 → tripped
    }

    #[test]
    fn success_resets_counter() {
        let mut cb = CircuitBreaker::new(3);
        cb.record_failure();
        cb.record_failure();
        cb.record_success();
        cb.record_failure(); // 1 failure after reset
        assert!(cb.is_allowed()); // still below threshold
        assert_eq!(cb.consecutive_failures(), 1);
    }

    #[test]
    fn zero_threshold_behaves_as_one() {
        let mut cb = CircuitBreaker::new(0);
        assert!(cb.is_allowed());
        cb.record_failure();
        assert!(!cb.is_allowed());
    }
}
