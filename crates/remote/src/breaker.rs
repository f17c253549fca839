//! Per-capability circuit breaker.
//!
//! State machine: **Closed** passes calls through and counts consecutive
//! failures; reaching the threshold trips to **Open**. **Open** rejects
//! calls without any network attempt until the recovery timeout elapses,
//! then admits exactly one probe in **HalfOpen**. A successful probe closes
//! the circuit and resets the counter; a failed probe re-opens it and
//! restarts the timer.
//!
//! Transitions are a pure function of (state, event); the mutex guards only
//! the counter updates, never a network call.

use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use tripweaver_core::{Capability, RemoteError};

/// Breaker position for one capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

impl BreakerState {
    pub fn as_str(self) -> &'static str {
        match self {
            BreakerState::Closed => "closed",
            BreakerState::Open => "open",
            BreakerState::HalfOpen => "half-open",
        }
    }
}

/// Tuning for one capability's breaker.
#[derive(Debug, Clone, Copy)]
pub struct BreakerSettings {
    /// Consecutive failures that trip the breaker.
    pub failure_threshold: u32,

    /// How long the breaker stays open before admitting a probe.
    pub recovery_timeout: Duration,
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BreakerEvent {
    Success,
    Failure,
}

/// Pure transition: (state, consecutive failures, event) → (state, counter).
fn next(
    state: BreakerState,
    consecutive_failures: u32,
    event: BreakerEvent,
    threshold: u32,
) -> (BreakerState, u32) {
    match (state, event) {
        (_, BreakerEvent::Success) => (BreakerState::Closed, 0),
        (BreakerState::Closed, BreakerEvent::Failure) => {
            let failures = consecutive_failures.saturating_add(1);
            if failures >= threshold {
                (BreakerState::Open, failures)
            } else {
                (BreakerState::Closed, failures)
            }
        }
        // A failed probe re-opens; failures recorded while already open
        // (e.g. a deadline that fired after the gate) keep it open.
        (BreakerState::HalfOpen | BreakerState::Open, BreakerEvent::Failure) => {
            (BreakerState::Open, consecutive_failures.saturating_add(1))
        }
    }
}

#[derive(Debug)]
struct Inner {
    state: BreakerState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    probe_in_flight: bool,
}

/// Circuit breaker for one remote capability. Shared process-wide across
/// concurrent itinerary generations.
#[derive(Debug)]
pub struct CircuitBreaker {
    capability: Capability,
    settings: BreakerSettings,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(capability: Capability, settings: BreakerSettings) -> Self {
        Self {
            capability,
            settings,
            inner: Mutex::new(Inner {
                state: BreakerState::Closed,
                consecutive_failures: 0,
                opened_at: None,
                probe_in_flight: false,
            }),
        }
    }

    /// Gate a call. `Ok` means the caller may attempt the network; the open
    /// circuit rejects immediately with no network attempt. The first
    /// caller after the recovery timeout becomes the single HalfOpen probe;
    /// concurrent callers keep being rejected until the probe resolves.
    pub fn try_acquire(&self) -> Result<(), RemoteError> {
        let mut inner = self.lock();
        match inner.state {
            BreakerState::Closed => Ok(()),
            BreakerState::Open => {
                let waited = inner
                    .opened_at
                    .map(|at| at.elapsed())
                    .unwrap_or(Duration::ZERO);
                if waited >= self.settings.recovery_timeout {
                    inner.state = BreakerState::HalfOpen;
                    inner.probe_in_flight = true;
                    debug!(
                        capability = %self.capability,
                        "circuit half-open, admitting probe"
                    );
                    Ok(())
                } else {
                    Err(self.rejection())
                }
            }
            BreakerState::HalfOpen => {
                if inner.probe_in_flight {
                    Err(self.rejection())
                } else {
                    inner.probe_in_flight = true;
                    Ok(())
                }
            }
        }
    }

    /// Record a successful call: closes the circuit and resets the counter.
    pub fn record_success(&self) {
        let mut inner = self.lock();
        let was = inner.state;
        let (state, failures) = next(
            inner.state,
            inner.consecutive_failures,
            BreakerEvent::Success,
            self.settings.failure_threshold,
        );
        inner.state = state;
        inner.consecutive_failures = failures;
        inner.opened_at = None;
        inner.probe_in_flight = false;
        if was != BreakerState::Closed {
            debug!(capability = %self.capability, "circuit closed after successful probe");
        }
    }

    /// Record a failed call. Trips to Open at the threshold and restarts
    /// the recovery timer on a failed probe.
    pub fn record_failure(&self) {
        let mut inner = self.lock();
        let was = inner.state;
        let (state, failures) = next(
            inner.state,
            inner.consecutive_failures,
            BreakerEvent::Failure,
            self.settings.failure_threshold,
        );
        inner.state = state;
        inner.consecutive_failures = failures;
        inner.probe_in_flight = false;
        if state == BreakerState::Open {
            inner.opened_at = Some(Instant::now());
            if was != BreakerState::Open {
                warn!(
                    capability = %self.capability,
                    consecutive_failures = failures,
                    recovery_secs = self.settings.recovery_timeout.as_secs(),
                    "circuit tripped open"
                );
            }
        }
    }

    pub fn state(&self) -> BreakerState {
        self.lock().state
    }

    fn rejection(&self) -> RemoteError {
        RemoteError::CircuitOpen {
            capability: self.capability.as_str().into(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker(threshold: u32, recovery: Duration) -> CircuitBreaker {
        CircuitBreaker::new(
            Capability::SearchProvisions,
            BreakerSettings {
                failure_threshold: threshold,
                recovery_timeout: recovery,
            },
        )
    }

    #[test]
    fn transition_function_is_pure() {
        use BreakerEvent::*;
        use BreakerState::*;

        assert_eq!(next(Closed, 0, Failure, 3), (Closed, 1));
        assert_eq!(next(Closed, 2, Failure, 3), (Open, 3));
        assert_eq!(next(Closed, 2, Success, 3), (Closed, 0));
        assert_eq!(next(HalfOpen, 3, Failure, 3), (Open, 4));
        assert_eq!(next(HalfOpen, 3, Success, 3), (Closed, 0));
        assert_eq!(next(Open, 3, Failure, 3), (Open, 4));
    }

    #[test]
    fn trips_open_at_threshold() {
        let breaker = breaker(3, Duration::from_secs(60));

        for _ in 0..2 {
            assert!(breaker.try_acquire().is_ok());
            breaker.record_failure();
        }
        assert_eq!(breaker.state(), BreakerState::Closed);

        assert!(breaker.try_acquire().is_ok());
        breaker.record_failure();
        assert_eq!(breaker.state(), BreakerState::Open);

        // Rejected with no network attempt while open.
        assert!(matches!(
            breaker.try_acquire(),
            Err(RemoteError::CircuitOpen { .. })
        ));
    }

    #[test]
    fn success_resets_the_counter() {
        let breaker = breaker(3, Duration::from_secs(60));
        breaker.record_failure();
        breaker.record_failure();
        breaker.record_success();
        breaker.record_failure();
        breaker.record_failure();
        assert_eq!(breaker.state(), BreakerState::Closed);
    }

    #[test]
    fn admits_exactly_one_probe_after_recovery() {
        let breaker = breaker(1, Duration::from_millis(20));
        breaker.record_failure();
        assert_eq!(breaker.state(), BreakerState::Open);
        assert!(breaker.try_acquire().is_err());

        std::thread::sleep(Duration::from_millis(30));

        // First caller becomes the probe; concurrent callers are rejected.
        assert!(breaker.try_acquire().is_ok());
        assert_eq!(breaker.state(), BreakerState::HalfOpen);
        assert!(breaker.try_acquire().is_err());
        assert!(breaker.try_acquire().is_err());
    }

    #[test]
    fn successful_probe_closes_the_circuit() {
        let breaker = breaker(1, Duration::from_millis(10));
        breaker.record_failure();
        std::thread::sleep(Duration::from_millis(20));

        assert!(breaker.try_acquire().is_ok());
        breaker.record_success();
        assert_eq!(breaker.state(), BreakerState::Closed);
        assert!(breaker.try_acquire().is_ok());
    }

    #[test]
    fn failed_probe_reopens_and_restarts_the_timer() {
        let breaker = breaker(1, Duration::from_millis(40));
        breaker.record_failure();
        std::thread::sleep(Duration::from_millis(50));

        assert!(breaker.try_acquire().is_ok());
        breaker.record_failure();
        assert_eq!(breaker.state(), BreakerState::Open);

        // Timer restarted: still rejected right away.
        assert!(breaker.try_acquire().is_err());
        std::thread::sleep(Duration::from_millis(50));
        assert!(breaker.try_acquire().is_ok());
    }
}
