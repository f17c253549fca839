//! End-to-end itinerary generation against the in-process provisioning
//! stub.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tripweaver_config::AppConfig;
use tripweaver_core::{
    Activity, ProvisionTransport, ProvisionedItem, RankRequest, Ranking, RemoteError,
    SearchRequest, SlotKind, SlotOutcome, TraitProfile,
};
use tripweaver_planner::{verify_unique_commitments, GenerationRequest, ItineraryPlanner};
use tripweaver_remote::{
    BreakerSettings, RemoteCallManager, RemoteSettings, RetryPolicy, StubProvisionTransport,
};

fn fast_settings() -> RemoteSettings {
    RemoteSettings {
        call_timeout: Duration::from_secs(2),
        retry: RetryPolicy {
            max_retries: 0,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
        },
        breaker: BreakerSettings {
            failure_threshold: 100,
            recovery_timeout: Duration::from_millis(10),
        },
        search_permits: 4,
        rank_permits: 4,
    }
}

fn planner_with(transport: Arc<dyn ProvisionTransport>) -> ItineraryPlanner {
    let manager = Arc::new(RemoteCallManager::new(transport, fast_settings()));
    ItineraryPlanner::from_config(manager, &AppConfig::default())
}

fn activity(id: &str, district: &str, area: &str, trait_matched: bool) -> Activity {
    Activity {
        id: id.into(),
        name: format!("Activity {id}"),
        address: "somewhere".into(),
        district: district.into(),
        area: area.into(),
        hours: "08:00-22:00".into(),
        days: "daily".into(),
        category: "temple".into(),
        trait_matched,
    }
}

/// 5 trait-matched candidates in Da'an first, then filler across town.
fn daan_heavy_pool() -> Vec<Activity> {
    let mut pool = Vec::new();
    for i in 0..5 {
        pool.push(activity(&format!("trait-daan-{i}"), "Da'an", "central", true));
    }
    for i in 0..15 {
        let district = if i % 2 == 0 { "Xinyi" } else { "Zhongzheng" };
        let area = if i % 2 == 0 { "east" } else { "west" };
        pool.push(activity(&format!("filler-{i}"), district, area, false));
    }
    pool
}

// Tuesday, so no built-in rest-day closures interfere.
fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 3).unwrap()
}

/// Transport wrapper that records every search request.
struct RecordingTransport {
    inner: StubProvisionTransport,
    searches: Mutex<Vec<SearchRequest>>,
}

impl RecordingTransport {
    fn new() -> Self {
        Self {
            inner: StubProvisionTransport::new(),
            searches: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ProvisionTransport for RecordingTransport {
    fn name(&self) -> &str {
        "recording"
    }

    async fn search(&self, request: SearchRequest) -> Result<Vec<ProvisionedItem>, RemoteError> {
        self.searches.lock().unwrap().push(request.clone());
        self.inner.search(request).await
    }

    async fn rank(&self, request: RankRequest) -> Result<Ranking, RemoteError> {
        self.inner.rank(request).await
    }
}

/// Transport that fails every capability.
struct DownTransport;

#[async_trait]
impl ProvisionTransport for DownTransport {
    fn name(&self) -> &str {
        "down"
    }

    async fn search(&self, _request: SearchRequest) -> Result<Vec<ProvisionedItem>, RemoteError> {
        Err(RemoteError::Connection("refused".into()))
    }

    async fn rank(&self, _request: RankRequest) -> Result<Ranking, RemoteError> {
        Err(RemoteError::Connection("refused".into()))
    }
}

#[tokio::test]
async fn healthy_generation_fills_all_eighteen_slots() {
    let planner = planner_with(Arc::new(StubProvisionTransport::new()));
    let result = planner
        .generate(GenerationRequest {
            profile: TraitProfile::resolve("ENTP").unwrap(),
            activity_pool: daan_heavy_pool(),
            start_date: start_date(),
        })
        .await
        .unwrap();

    assert_eq!(result.days.len(), 3);
    for day in &result.days {
        assert_eq!(day.sessions.len(), 3);
        assert_eq!(day.meals.len(), 3);
    }

    let ids = result.committed_ids();
    assert_eq!(ids.len(), 18, "all 18 slots committed");
    assert!(result.is_complete());

    let unique: HashSet<_> = ids.iter().map(|(id, _)| id.clone()).collect();
    assert_eq!(unique.len(), 18, "no identifier committed twice");
    assert!(verify_unique_commitments(&result).is_ok());
}

#[tokio::test]
async fn morning_anchor_drives_the_breakfast_search() {
    let transport = Arc::new(RecordingTransport::new());
    let planner = planner_with(transport.clone());

    let result = planner
        .generate(GenerationRequest {
            profile: TraitProfile::resolve("INFJ").unwrap(),
            activity_pool: daan_heavy_pool(),
            start_date: start_date(),
        })
        .await
        .unwrap();

    // Day 1 morning: a trait-matched Da'an candidate leads the pool.
    let morning = result.days[0].sessions[0]
        .outcome
        .assignment()
        .expect("morning committed");
    assert!(morning.trait_matched);
    assert_eq!(morning.choice.district, "Da'an");

    // The first breakfast search carries the morning anchor district.
    let searches = transport.searches.lock().unwrap();
    let first = &searches[0];
    assert_eq!(first.districts, vec!["Da'an".to_string()]);
    assert!(!first.preferred_categories.is_empty());
}

#[tokio::test]
async fn scarce_trait_matches_fall_back_and_stay_unique() {
    // 3 trait-matched candidates for 9 session slots.
    let mut pool = Vec::new();
    for i in 0..3 {
        pool.push(activity(&format!("trait-{i}"), "Da'an", "central", true));
    }
    for i in 0..9 {
        pool.push(activity(&format!("general-{i}"), "Xinyi", "east", false));
    }

    let planner = planner_with(Arc::new(StubProvisionTransport::new()));
    let result = planner
        .generate(GenerationRequest {
            profile: TraitProfile::resolve("ISTP").unwrap(),
            activity_pool: pool,
            start_date: start_date(),
        })
        .await
        .unwrap();

    let mut trait_matched = 0;
    let mut fallbacks = 0;
    let mut session_ids = HashSet::new();
    for day in &result.days {
        for report in &day.sessions {
            let assignment = report.outcome.assignment().expect("session committed");
            session_ids.insert(assignment.choice.id.clone());
            if assignment.trait_matched {
                trait_matched += 1;
            } else {
                fallbacks += 1;
                assert!(assignment.fallback);
            }
        }
    }

    assert_eq!(trait_matched, 3);
    assert_eq!(fallbacks, 6);
    assert_eq!(session_ids.len(), 9);
}

#[tokio::test]
async fn provisioning_outage_degrades_meals_only() {
    let planner = planner_with(Arc::new(DownTransport));
    let result = planner
        .generate(GenerationRequest {
            profile: TraitProfile::resolve("ESFJ").unwrap(),
            activity_pool: daan_heavy_pool(),
            start_date: start_date(),
        })
        .await
        .unwrap();

    // Sessions commit as usual.
    for day in &result.days {
        for report in &day.sessions {
            assert!(report.outcome.is_assigned());
        }
        // Every meal degrades to a placeholder.
        for report in &day.meals {
            assert!(!report.outcome.is_assigned());
        }
    }

    assert!(!result.is_complete());
    assert_eq!(result.metadata.placeholder_slots.len(), 9);
    assert!(
        result
            .metadata
            .placeholder_slots
            .iter()
            .all(|slot| matches!(slot.kind, SlotKind::Meal(_)))
    );

    // The failures show up in the capability counters.
    let search_usage = result
        .metadata
        .capability_usage
        .iter()
        .find(|u| u.capability == "search_provisions")
        .expect("search usage recorded");
    assert!(search_usage.failures > 0);
}

#[tokio::test]
async fn exhausted_activity_pool_yields_session_placeholders() {
    // Only 4 activities for 9 session slots.
    let pool: Vec<Activity> = (0..4)
        .map(|i| activity(&format!("act-{i}"), "Da'an", "central", true))
        .collect();

    let planner = planner_with(Arc::new(StubProvisionTransport::new()));
    let result = planner
        .generate(GenerationRequest {
            profile: TraitProfile::resolve("INTJ").unwrap(),
            activity_pool: pool,
            start_date: start_date(),
        })
        .await
        .unwrap();

    let committed_sessions: usize = result
        .days
        .iter()
        .flat_map(|day| &day.sessions)
        .filter(|report| report.outcome.is_assigned())
        .count();
    assert_eq!(committed_sessions, 4);

    let session_placeholders = result
        .metadata
        .placeholder_slots
        .iter()
        .filter(|slot| matches!(slot.kind, SlotKind::Session(_)))
        .count();
    assert_eq!(session_placeholders, 5);

    // Still a valid, duplicate-free result.
    assert!(verify_unique_commitments(&result).is_ok());
}

#[tokio::test]
async fn metadata_reflects_the_run() {
    let planner = planner_with(Arc::new(StubProvisionTransport::new()));
    let result = planner
        .generate(GenerationRequest {
            profile: TraitProfile::resolve("ENFP").unwrap(),
            activity_pool: daan_heavy_pool(),
            start_date: start_date(),
        })
        .await
        .unwrap();

    assert_eq!(result.metadata.activities_considered, 20);
    assert!(result.metadata.provisions_considered > 0);

    for capability in ["search_provisions", "rank_provisions"] {
        let usage = result
            .metadata
            .capability_usage
            .iter()
            .find(|u| u.capability == capability)
            .expect("usage recorded");
        assert!(usage.invocations > 0, "{capability} invoked");
        assert_eq!(usage.failures, 0);
    }

    // Alternatives are capped by config (default 10) and exclude winners.
    for day in &result.days {
        for report in &day.sessions {
            assert!(report.alternatives.len() <= 10);
            if let SlotOutcome::Assigned(assignment) = &report.outcome {
                assert!(
                    report
                        .alternatives
                        .iter()
                        .all(|alt| alt.id != assignment.choice.id)
                );
            }
        }
    }
}
