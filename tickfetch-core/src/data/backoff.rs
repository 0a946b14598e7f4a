//! Exponential backoff and the sleep capability.

use std::time::Duration;

/// Blocking delay capability. Tests substitute a recorder.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Sleeps the current thread.
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Backoff of `unit * 2^attempt` after the given failed attempt (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    unit: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl Backoff {
    pub fn new(unit: Duration) -> Self {
        Self { unit }
    }

    pub fn delay(&self, attempt: u32) -> Duration {
        self.unit.saturating_mul(2u32.saturating_pow(attempt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubles_per_attempt() {
        let backoff = Backoff::default();
        assert_eq!(backoff.delay(1), Duration::from_secs(2));
        assert_eq!(backoff.delay(2), Duration::from_secs(4));
        assert_eq!(backoff.delay(3), Duration::from_secs(8));
    }

    #[test]
    fn scales_with_unit() {
        let backoff = Backoff::new(Duration::from_millis(10));
        assert_eq!(backoff.delay(2), Duration::from_millis(40));
    }

    #[test]
    fn saturates_instead_of_overflowing() {
        let backoff = Backoff::new(Duration::from_secs(u64::MAX / 2));
        assert_eq!(backoff.delay(40), Duration::MAX);
    }
}
