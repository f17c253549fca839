//! Day-by-day itinerary orchestration.
//!
//! Within a day, slots commit in the order morning, breakfast, afternoon,
//! lunch, night, dinner, so every meal sees the session anchors committed
//! before it: breakfast anchors on morning; lunch on morning and afternoon;
//! dinner on afternoon and night. Sessions anchor on the previous same-day
//! session (night falls back to morning when the afternoon slot is a
//! placeholder).

use crate::validate;
use chrono::{Datelike, Days, NaiveDate};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use tripweaver_config::AppConfig;
use tripweaver_core::{
    Activity, AnchorLocation, CapabilityUsage, DayPlan, Error, GenerationMetadata,
    ItineraryResult, MealKind, Result, SessionKind, SlotOutcome, SlotReport, TraitProfile,
    UniquenessLedger, DAY_COUNT,
};
use tripweaver_engine::{
    ActivityEngine, LocationMatcher, MealContext, ProvisionEngine, SessionContext,
};
use tripweaver_remote::RemoteCallManager;
use uuid::Uuid;

/// One itinerary-generation request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// The already-validated preference profile.
    pub profile: TraitProfile,

    /// The activity candidate pool, pre-ranked by personality relevance.
    pub activity_pool: Vec<Activity>,

    /// Day 1 of the itinerary; day N falls on `start_date + (N-1)` days.
    pub start_date: NaiveDate,
}

/// Sequences assignment across both engines and aggregates the result.
pub struct ItineraryPlanner {
    activity_engine: ActivityEngine,
    provision_engine: ProvisionEngine,
    manager: Arc<RemoteCallManager>,
    alternatives_cap: usize,
}

impl ItineraryPlanner {
    pub fn new(
        manager: Arc<RemoteCallManager>,
        matcher: Arc<LocationMatcher>,
        fallback_districts: Vec<String>,
        alternatives_cap: usize,
    ) -> Self {
        Self {
            activity_engine: ActivityEngine::new(matcher.clone()),
            provision_engine: ProvisionEngine::new(
                manager.clone(),
                matcher,
                fallback_districts,
                alternatives_cap,
            ),
            manager,
            alternatives_cap,
        }
    }

    /// Build a planner from the application config, sharing the given call
    /// manager.
    pub fn from_config(manager: Arc<RemoteCallManager>, config: &AppConfig) -> Self {
        let matcher = Arc::new(LocationMatcher::new(
            &config.geography.areas,
            &config.geography.adjacent,
        ));
        Self::new(
            manager,
            matcher,
            config.geography.fallback_districts.clone(),
            config.planner.alternatives_cap,
        )
    }

    /// Generate one complete itinerary.
    ///
    /// Per-slot failures degrade to placeholders and are recorded in the
    /// metadata; only an invariant violation aborts the call.
    pub async fn generate(&self, request: GenerationRequest) -> Result<ItineraryResult> {
        let started = Instant::now();
        let usage_before = self.manager.usage();
        let mut ledger = UniquenessLedger::new();

        info!(
            personality = %request.profile.code,
            pool = request.activity_pool.len(),
            start_date = %request.start_date,
            "itinerary generation started"
        );

        let mut days = Vec::with_capacity(DAY_COUNT as usize);
        let mut fallback_slots = Vec::new();
        let mut placeholder_slots = Vec::new();
        let mut provisions_considered = 0usize;

        for day in 1..=DAY_COUNT {
            let date = request
                .start_date
                .checked_add_days(Days::new(u64::from(day - 1)))
                .ok_or_else(|| Error::Internal("start date out of calendar range".into()))?;
            let weekday = date.weekday();

            let mut sessions: Vec<SlotReport<Activity>> = Vec::with_capacity(3);
            let mut meals = Vec::with_capacity(3);

            // Morning has no anchor.
            let morning = self.session(day, weekday, SessionKind::Morning, None, &request, &mut ledger);
            let morning_loc = committed_location(&morning.outcome);
            sessions.push(morning);

            let breakfast = self
                .meal(
                    day,
                    weekday,
                    MealKind::Breakfast,
                    anchors(&[&morning_loc]),
                    &request,
                    &mut ledger,
                )
                .await;
            provisions_considered += breakfast.1;
            meals.push(breakfast.0);

            let afternoon = self.session(
                day,
                weekday,
                SessionKind::Afternoon,
                morning_loc.as_ref(),
                &request,
                &mut ledger,
            );
            let afternoon_loc = committed_location(&afternoon.outcome);
            sessions.push(afternoon);

            let lunch = self
                .meal(
                    day,
                    weekday,
                    MealKind::Lunch,
                    anchors(&[&morning_loc, &afternoon_loc]),
                    &request,
                    &mut ledger,
                )
                .await;
            provisions_considered += lunch.1;
            meals.push(lunch.0);

            let night = self.session(
                day,
                weekday,
                SessionKind::Night,
                afternoon_loc.as_ref().or(morning_loc.as_ref()),
                &request,
                &mut ledger,
            );
            let night_loc = committed_location(&night.outcome);
            sessions.push(night);

            let dinner = self
                .meal(
                    day,
                    weekday,
                    MealKind::Dinner,
                    anchors(&[&afternoon_loc, &night_loc]),
                    &request,
                    &mut ledger,
                )
                .await;
            provisions_considered += dinner.1;
            meals.push(dinner.0);

            for report in &sessions {
                track(&report.outcome, &mut fallback_slots, &mut placeholder_slots);
            }
            for report in &meals {
                track(&report.outcome, &mut fallback_slots, &mut placeholder_slots);
            }

            days.push(DayPlan {
                day,
                date,
                sessions,
                meals,
            });
        }

        let capability_usage = usage_delta(&self.manager.usage(), &usage_before);
        let metadata = GenerationMetadata {
            activities_considered: request.activity_pool.len(),
            provisions_considered,
            capability_usage,
            fallback_slots,
            placeholder_slots,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };

        let result = ItineraryResult {
            generation_id: Uuid::new_v4(),
            personality: request.profile.code.clone(),
            start_date: request.start_date,
            days,
            metadata,
        };

        validate::verify_unique_commitments(&result)?;

        info!(
            generation = %result.generation_id,
            committed = result.committed_ids().len(),
            placeholders = result.metadata.placeholder_slots.len(),
            elapsed_ms = result.metadata.elapsed_ms,
            "itinerary generation complete"
        );

        Ok(result)
    }

    fn session(
        &self,
        day: u8,
        weekday: chrono::Weekday,
        kind: SessionKind,
        anchor: Option<&AnchorLocation>,
        request: &GenerationRequest,
        ledger: &mut UniquenessLedger,
    ) -> SlotReport<Activity> {
        let selection = self.activity_engine.assign(
            &SessionContext {
                day,
                weekday,
                kind,
                anchor,
            },
            &request.activity_pool,
            ledger,
            self.alternatives_cap,
        );
        SlotReport {
            outcome: selection.outcome,
            alternatives: selection.alternatives,
        }
    }

    async fn meal(
        &self,
        day: u8,
        weekday: chrono::Weekday,
        kind: MealKind,
        anchors: Vec<AnchorLocation>,
        request: &GenerationRequest,
        ledger: &mut UniquenessLedger,
    ) -> (SlotReport<tripweaver_core::ProvisionedItem>, usize) {
        let selection = self
            .provision_engine
            .assign(
                &MealContext {
                    day,
                    weekday,
                    kind,
                    anchors,
                    preferred_categories: request.profile.provision_categories.clone(),
                },
                ledger,
            )
            .await;
        (
            SlotReport {
                outcome: selection.outcome,
                alternatives: selection.alternatives,
            },
            selection.considered,
        )
    }
}

/// The committed location of a session outcome, if any.
fn committed_location(outcome: &SlotOutcome<Activity>) -> Option<AnchorLocation> {
    outcome
        .assignment()
        .map(|assignment| AnchorLocation::of(&assignment.choice))
}

/// Collect the present anchors, preserving order.
fn anchors(locations: &[&Option<AnchorLocation>]) -> Vec<AnchorLocation> {
    locations.iter().filter_map(|l| (*l).clone()).collect()
}

fn track<T>(
    outcome: &SlotOutcome<T>,
    fallback_slots: &mut Vec<tripweaver_core::SlotKey>,
    placeholder_slots: &mut Vec<tripweaver_core::SlotKey>,
) {
    match outcome {
        SlotOutcome::Assigned(assignment) if assignment.fallback => {
            fallback_slots.push(assignment.slot);
        }
        SlotOutcome::Assigned(_) => {}
        SlotOutcome::Unfilled(placeholder) => placeholder_slots.push(placeholder.slot),
    }
}

/// Per-capability difference between two usage snapshots.
fn usage_delta(after: &[CapabilityUsage], before: &[CapabilityUsage]) -> Vec<CapabilityUsage> {
    after
        .iter()
        .map(|now| {
            before
                .iter()
                .find(|earlier| earlier.capability == now.capability)
                .map(|earlier| now.since(earlier))
                .unwrap_or_else(|| now.clone())
        })
        .collect()
}
