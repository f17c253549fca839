//! Retry policy: capped exponential backoff with jitter.
//!
//! The delay before retry `n` (0-based) is
//! `min(max_delay, base_delay × 2^n)` with up to ±25% uniform jitter, and
//! the jittered value never exceeds `max_delay`. Only transient errors are
//! retried at all; the loop in the call manager consults
//! `RemoteError::retryable` before asking for a delay.
//!
//! The delay is computed with an injected RNG so the schedule is
//! unit-testable; the sleep itself happens in the call manager under the
//! caller deadline, via `tokio::time::sleep`, so cancellation interrupts
//! the wait.

use rand::Rng;
use std::time::Duration;

/// Fraction of the computed delay used as the jitter band.
const JITTER_RATIO: f64 = 0.25;

/// Backoff schedule for one capability invocation.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,

    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// The deterministic capped exponential delay for a 0-based attempt
    /// index, before jitter.
    pub fn computed_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// The inclusive [low, high] band `next_delay` draws from.
    pub fn delay_bounds(&self, attempt: u32) -> (Duration, Duration) {
        let computed = self.computed_delay(attempt);
        let low = computed.mul_f64(1.0 - JITTER_RATIO);
        let high = computed.mul_f64(1.0 + JITTER_RATIO).min(self.max_delay);
        (low, high)
    }

    /// The jittered delay to sleep before retrying `attempt`.
    pub fn next_delay<R: Rng>(&self, attempt: u32, rng: &mut R) -> Duration {
        let computed = self.computed_delay(attempt);
        let swing: f64 = rng.gen_range(-JITTER_RATIO..=JITTER_RATIO);
        computed.mul_f64(1.0 + swing).min(self.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_double_until_the_cap() {
        let policy = RetryPolicy {
            max_retries: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(1_500),
        };

        assert_eq!(policy.computed_delay(0), Duration::from_millis(100));
        assert_eq!(policy.computed_delay(1), Duration::from_millis(200));
        assert_eq!(policy.computed_delay(2), Duration::from_millis(400));
        assert_eq!(policy.computed_delay(3), Duration::from_millis(800));
        // Capped.
        assert_eq!(policy.computed_delay(4), Duration::from_millis(1_500));
        assert_eq!(policy.computed_delay(10), Duration::from_millis(1_500));
    }

    #[test]
    fn huge_attempt_indices_do_not_overflow() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.computed_delay(63), policy.max_delay);
        assert_eq!(policy.computed_delay(u32::MAX), policy.max_delay);
    }

    #[test]
    fn jittered_delay_stays_within_bounds() {
        let policy = RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
        };
        let mut rng = rand::thread_rng();

        for attempt in 0..6 {
            let (low, high) = policy.delay_bounds(attempt);
            for _ in 0..100 {
                let delay = policy.next_delay(attempt, &mut rng);
                assert!(delay >= low, "attempt {attempt}: {delay:?} < {low:?}");
                assert!(delay <= high, "attempt {attempt}: {delay:?} > {high:?}");
                assert!(delay <= policy.max_delay);
            }
        }
    }

    #[test]
    fn jitter_never_exceeds_max_delay_near_the_cap() {
        let policy = RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(900),
            max_delay: Duration::from_millis(1_000),
        };
        let mut rng = rand::thread_rng();

        // computed_delay(1) hits the cap; +25% jitter must still be clamped.
        for _ in 0..200 {
            assert!(policy.next_delay(1, &mut rng) <= policy.max_delay);
        }
    }
}
