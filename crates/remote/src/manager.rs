//! The remote call manager — single entry point for capability
//! invocations.
//!
//! `invoke` runs the full protection stack for one call: caller deadline,
//! pool slot, breaker gate, then the retry loop. One manager instance is
//! shared process-wide; its breakers, pools, and statistics represent the
//! health of the shared remote dependency across all concurrent itinerary
//! generations.

use crate::backoff::RetryPolicy;
use crate::breaker::{BreakerSettings, BreakerState, CircuitBreaker};
use crate::stats::CapabilityStats;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, warn};
use tripweaver_core::{
    Capability, CapabilityRequest, CapabilityResponse, CapabilityUsage, ProvisionTransport,
    RankRequest, Ranking, ProvisionedItem, RemoteError, SearchRequest,
};

/// Tuning for the whole remote-call layer.
#[derive(Debug, Clone, Copy)]
pub struct RemoteSettings {
    /// Caller deadline for one invocation, covering pool wait, network
    /// round trips, and backoff sleeps.
    pub call_timeout: Duration,

    pub retry: RetryPolicy,
    pub breaker: BreakerSettings,

    /// Max concurrent in-flight search calls.
    pub search_permits: usize,

    /// Max concurrent in-flight rank calls.
    pub rank_permits: usize,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
            breaker: BreakerSettings::default(),
            search_permits: 8,
            rank_permits: 8,
        }
    }
}

/// Pool, breaker, and counters for one capability.
#[derive(Debug)]
struct Lane {
    semaphore: Semaphore,
    breaker: CircuitBreaker,
    stats: CapabilityStats,
}

impl Lane {
    fn new(capability: Capability, permits: usize, breaker: BreakerSettings) -> Self {
        Self {
            semaphore: Semaphore::new(permits),
            breaker: CircuitBreaker::new(capability, breaker),
            stats: CapabilityStats::default(),
        }
    }
}

/// Pooled, circuit-broken, retried client for the provisioning service.
pub struct RemoteCallManager {
    transport: Arc<dyn ProvisionTransport>,
    call_timeout: Duration,
    retry: RetryPolicy,
    search_lane: Lane,
    rank_lane: Lane,
}

impl RemoteCallManager {
    pub fn new(transport: Arc<dyn ProvisionTransport>, settings: RemoteSettings) -> Self {
        Self {
            transport,
            call_timeout: settings.call_timeout,
            retry: settings.retry,
            search_lane: Lane::new(
                Capability::SearchProvisions,
                settings.search_permits,
                settings.breaker,
            ),
            rank_lane: Lane::new(
                Capability::RankProvisions,
                settings.rank_permits,
                settings.breaker,
            ),
        }
    }

    /// Invoke one capability under the full protection stack.
    pub async fn invoke(
        &self,
        request: CapabilityRequest,
    ) -> Result<CapabilityResponse, RemoteError> {
        let capability = request.capability();
        let lane = self.lane(capability);
        lane.stats.record_invocation();

        match tokio::time::timeout(self.call_timeout, self.run(capability, lane, request)).await {
            Ok(result) => result,
            Err(_) => {
                // The deadline covers pool wait, round trips, and backoff
                // sleeps alike; an expiry anywhere counts as one failure.
                lane.breaker.record_failure();
                lane.stats.record_failure();
                warn!(
                    capability = %capability,
                    deadline_ms = self.call_timeout.as_millis() as u64,
                    "capability invocation exceeded caller deadline"
                );
                Err(RemoteError::Timeout(format!(
                    "capability '{capability}' exceeded {}ms deadline",
                    self.call_timeout.as_millis()
                )))
            }
        }
    }

    async fn run(
        &self,
        capability: Capability,
        lane: &Lane,
        request: CapabilityRequest,
    ) -> Result<CapabilityResponse, RemoteError> {
        let _permit = lane
            .semaphore
            .acquire()
            .await
            .map_err(|_| RemoteError::Unknown("capability pool closed".into()))?;

        if let Err(rejection) = lane.breaker.try_acquire() {
            lane.stats.record_breaker_rejection();
            return Err(rejection);
        }

        let mut attempt: u32 = 0;
        loop {
            match self.dispatch(request.clone()).await {
                Ok(response) => {
                    lane.breaker.record_success();
                    lane.stats.record_success();
                    return Ok(response);
                }
                Err(err) if err.retryable() && attempt < self.retry.max_retries => {
                    let delay = self.retry.next_delay(attempt, &mut rand::thread_rng());
                    debug!(
                        capability = %capability,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient failure, backing off before retry"
                    );
                    lane.stats.record_retry();
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    lane.breaker.record_failure();
                    lane.stats.record_failure();
                    warn!(
                        capability = %capability,
                        attempts = attempt + 1,
                        error = %err,
                        "capability invocation failed"
                    );
                    return Err(err);
                }
            }
        }
    }

    async fn dispatch(
        &self,
        request: CapabilityRequest,
    ) -> Result<CapabilityResponse, RemoteError> {
        match request {
            CapabilityRequest::Search(req) => self
                .transport
                .search(req)
                .await
                .map(CapabilityResponse::Search),
            CapabilityRequest::Rank(req) => {
                self.transport.rank(req).await.map(CapabilityResponse::Rank)
            }
        }
    }

    /// Typed wrapper over `invoke` for the search capability.
    pub async fn search(
        &self,
        request: SearchRequest,
    ) -> Result<Vec<ProvisionedItem>, RemoteError> {
        match self.invoke(CapabilityRequest::Search(request)).await? {
            CapabilityResponse::Search(items) => Ok(items),
            CapabilityResponse::Rank(_) => {
                Err(RemoteError::Unknown("mismatched capability response".into()))
            }
        }
    }

    /// Typed wrapper over `invoke` for the rank capability.
    pub async fn rank(&self, request: RankRequest) -> Result<Ranking, RemoteError> {
        match self.invoke(CapabilityRequest::Rank(request)).await? {
            CapabilityResponse::Rank(ranking) => Ok(ranking),
            CapabilityResponse::Search(_) => {
                Err(RemoteError::Unknown("mismatched capability response".into()))
            }
        }
    }

    /// Current per-capability counters.
    pub fn usage(&self) -> Vec<CapabilityUsage> {
        vec![
            self.search_lane.stats.snapshot(Capability::SearchProvisions),
            self.rank_lane.stats.snapshot(Capability::RankProvisions),
        ]
    }

    /// Current breaker position for a capability.
    pub fn breaker_state(&self, capability: Capability) -> BreakerState {
        self.lane(capability).breaker.state()
    }

    fn lane(&self, capability: Capability) -> &Lane {
        match capability {
            Capability::SearchProvisions => &self.search_lane,
            Capability::RankProvisions => &self.rank_lane,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tripweaver_core::MealKind;

    /// A transport whose search always fails with the given error.
    struct FailingTransport {
        error: RemoteError,
        calls: AtomicUsize,
    }

    impl FailingTransport {
        fn new(error: RemoteError) -> Self {
            Self {
                error,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ProvisionTransport for FailingTransport {
        fn name(&self) -> &str {
            "failing"
        }

        async fn search(
            &self,
            _request: SearchRequest,
        ) -> Result<Vec<ProvisionedItem>, RemoteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(self.error.clone())
        }

        async fn rank(&self, _request: RankRequest) -> Result<Ranking, RemoteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(self.error.clone())
        }
    }

    /// A transport that fails a fixed number of times, then succeeds.
    struct FlakyTransport {
        failures_left: AtomicUsize,
        calls: AtomicUsize,
    }

    impl FlakyTransport {
        fn new(failures: usize) -> Self {
            Self {
                failures_left: AtomicUsize::new(failures),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ProvisionTransport for FlakyTransport {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn search(
            &self,
            _request: SearchRequest,
        ) -> Result<Vec<ProvisionedItem>, RemoteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self
                .failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                Err(RemoteError::Connection("conn reset".into()))
            } else {
                Ok(vec![])
            }
        }

        async fn rank(&self, _request: RankRequest) -> Result<Ranking, RemoteError> {
            Err(RemoteError::Unknown("not under test".into()))
        }
    }

    /// A transport that hangs far past any test deadline.
    struct HangingTransport;

    #[async_trait]
    impl ProvisionTransport for HangingTransport {
        fn name(&self) -> &str {
            "hanging"
        }

        async fn search(
            &self,
            _request: SearchRequest,
        ) -> Result<Vec<ProvisionedItem>, RemoteError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            unreachable!()
        }

        async fn rank(&self, _request: RankRequest) -> Result<Ranking, RemoteError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            unreachable!()
        }
    }

    fn fast_settings(max_retries: u32, threshold: u32) -> RemoteSettings {
        RemoteSettings {
            call_timeout: Duration::from_secs(5),
            retry: RetryPolicy {
                max_retries,
                base_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(4),
            },
            breaker: BreakerSettings {
                failure_threshold: threshold,
                recovery_timeout: Duration::from_millis(50),
            },
            search_permits: 4,
            rank_permits: 4,
        }
    }

    fn search_request() -> SearchRequest {
        SearchRequest {
            districts: vec!["Zhongzheng".into()],
            meal: MealKind::Lunch,
            preferred_categories: vec![],
        }
    }

    #[tokio::test]
    async fn transient_failure_makes_max_retries_plus_one_attempts() {
        let transport = Arc::new(FailingTransport::new(RemoteError::Connection(
            "refused".into(),
        )));
        let manager = RemoteCallManager::new(transport.clone(), fast_settings(3, 100));

        let result = manager.search(search_request()).await;
        assert!(result.is_err());
        assert_eq!(transport.calls(), 4);

        let usage = &manager.usage()[0];
        assert_eq!(usage.invocations, 1);
        assert_eq!(usage.retries, 3);
        assert_eq!(usage.failures, 1);
    }

    #[tokio::test]
    async fn permanent_failure_is_never_retried() {
        let transport = Arc::new(FailingTransport::new(RemoteError::Authorization(
            "bad key".into(),
        )));
        let manager = RemoteCallManager::new(transport.clone(), fast_settings(3, 100));

        let result = manager.search(search_request()).await;
        assert!(matches!(result, Err(RemoteError::Authorization(_))));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn recovers_after_transient_failures() {
        let transport = Arc::new(FlakyTransport::new(2));
        let manager = RemoteCallManager::new(transport.clone(), fast_settings(3, 100));

        let result = manager.search(search_request()).await;
        assert!(result.is_ok());
        assert_eq!(transport.calls.load(Ordering::SeqCst), 3);

        let usage = &manager.usage()[0];
        assert_eq!(usage.successes, 1);
        assert_eq!(usage.retries, 2);
        assert_eq!(usage.failures, 0);
    }

    #[tokio::test]
    async fn breaker_trips_after_threshold_and_rejects_without_network() {
        let transport = Arc::new(FailingTransport::new(RemoteError::Connection(
            "refused".into(),
        )));
        // No retries so each invoke is exactly one network attempt.
        let manager = RemoteCallManager::new(transport.clone(), fast_settings(0, 5));

        for _ in 0..5 {
            let _ = manager.search(search_request()).await;
        }
        assert_eq!(transport.calls(), 5);
        assert_eq!(
            manager.breaker_state(Capability::SearchProvisions),
            BreakerState::Open
        );

        // Sixth call: rejected immediately, no network attempt.
        let result = manager.search(search_request()).await;
        assert!(matches!(result, Err(RemoteError::CircuitOpen { .. })));
        assert_eq!(transport.calls(), 5);
        assert_eq!(manager.usage()[0].breaker_rejections, 1);
    }

    #[tokio::test]
    async fn one_probe_allowed_after_recovery_timeout() {
        let transport = Arc::new(FlakyTransport::new(2));
        let manager = RemoteCallManager::new(transport.clone(), fast_settings(0, 2));

        for _ in 0..2 {
            let _ = manager.search(search_request()).await;
        }
        assert_eq!(
            manager.breaker_state(Capability::SearchProvisions),
            BreakerState::Open
        );

        tokio::time::sleep(Duration::from_millis(70)).await;

        // Probe passes through and succeeds; the circuit closes.
        let result = manager.search(search_request()).await;
        assert!(result.is_ok());
        assert_eq!(transport.calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            manager.breaker_state(Capability::SearchProvisions),
            BreakerState::Closed
        );
    }

    #[tokio::test]
    async fn caller_deadline_bounds_the_whole_invocation() {
        let manager = RemoteCallManager::new(
            Arc::new(HangingTransport),
            RemoteSettings {
                call_timeout: Duration::from_millis(40),
                ..fast_settings(0, 100)
            },
        );

        let started = std::time::Instant::now();
        let result = manager.search(search_request()).await;
        assert!(matches!(result, Err(RemoteError::Timeout(_))));
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(manager.usage()[0].failures, 1);
    }

    #[tokio::test]
    async fn capabilities_have_independent_breakers() {
        let transport = Arc::new(FailingTransport::new(RemoteError::Connection(
            "refused".into(),
        )));
        let manager = RemoteCallManager::new(transport.clone(), fast_settings(0, 1));

        let _ = manager.search(search_request()).await;
        assert_eq!(
            manager.breaker_state(Capability::SearchProvisions),
            BreakerState::Open
        );
        // The rank lane is untouched.
        assert_eq!(
            manager.breaker_state(Capability::RankProvisions),
            BreakerState::Closed
        );
    }
}
