//! Per-capability call counters.
//!
//! Process-wide, lock-free, shared across concurrent itinerary
//! generations. The planner snapshots them before and after one generation
//! and records the difference in the result metadata.

use std::sync::atomic::{AtomicU64, Ordering};
use tripweaver_core::{Capability, CapabilityUsage};

/// Atomic counters for one capability.
#[derive(Debug, Default)]
pub struct CapabilityStats {
    invocations: AtomicU64,
    successes: AtomicU64,
    failures: AtomicU64,
    retries: AtomicU64,
    breaker_rejections: AtomicU64,
}

impl CapabilityStats {
    pub fn record_invocation(&self) {
        self.invocations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_success(&self) {
        self.successes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_breaker_rejection(&self) {
        self.breaker_rejections.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of the counters.
    pub fn snapshot(&self, capability: Capability) -> CapabilityUsage {
        CapabilityUsage {
            capability: capability.as_str().into(),
            invocations: self.invocations.load(Ordering::Relaxed),
            successes: self.successes.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            breaker_rejections: self.breaker_rejections.load(Ordering::Relaxed),
        }
    }
}
