//! # TripWeaver Remote
//!
//! The resilient remote-call layer for the provisioning service.
//!
//! Every capability invocation flows through [`RemoteCallManager`], which
//! layers three protections over the raw [`ProvisionTransport`]:
//!
//! 1. a bounded per-capability semaphore pool (callers queue for a slot),
//! 2. a per-capability circuit breaker (Closed → Open → HalfOpen), and
//! 3. retry with exponential backoff and jitter for transient failures.
//!
//! All three honor the caller deadline: a single `tokio::time::timeout`
//! wraps pool wait, network round trips, and backoff sleeps alike.
//!
//! Breaker, pool, and statistics state is process-wide and shared across
//! concurrent itinerary generations — it reflects the health of the shared
//! remote dependency, unlike the per-generation uniqueness ledger.
//!
//! [`ProvisionTransport`]: tripweaver_core::ProvisionTransport

pub mod backoff;
pub mod breaker;
pub mod http;
pub mod manager;
pub mod stats;
pub mod stub;

pub use backoff::RetryPolicy;
pub use breaker::{BreakerSettings, BreakerState, CircuitBreaker};
pub use http::HttpProvisionTransport;
pub use manager::{RemoteCallManager, RemoteSettings};
pub use stats::CapabilityStats;
pub use stub::StubProvisionTransport;
