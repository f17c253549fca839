//! Activity assignment — one attraction per session slot.
//!
//! Candidates are filtered against the uniqueness ledger and the slot's
//! canonical window, then selected by a strict priority cascade evaluated
//! top-down. The cascade is an ordered list of tier predicates over the
//! same filtered list, so inserting a tier is a data change to the list,
//! not a control-flow rewrite. Within a tier the first candidate in input
//! order wins — the pool arrives pre-ranked by personality relevance.

use crate::hours;
use crate::location::LocationMatcher;
use chrono::Weekday;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};
use tripweaver_core::{
    Activity, AnchorLocation, Assignment, MatchTier, Placeholder, PlaceholderReason,
    SelectionTier, SessionKind, SlotKey, SlotOutcome, UniquenessLedger,
};

/// One session slot to fill.
#[derive(Debug, Clone, Copy)]
pub struct SessionContext<'a> {
    /// Day index, 1-based.
    pub day: u8,

    /// The calendar weekday of that day.
    pub weekday: Weekday,

    pub kind: SessionKind,

    /// The previous same-day slot's committed location; morning has none.
    pub anchor: Option<&'a AnchorLocation>,
}

/// The engine's verdict for one session slot.
#[derive(Debug, Clone)]
pub struct SessionSelection {
    pub outcome: SlotOutcome<Activity>,

    /// Runner-up candidates from the same filtered pool, cascade order,
    /// winner excluded. Never reserved in the ledger.
    pub alternatives: Vec<Activity>,
}

/// Deterministic, priority-ranked placement of activities into session
/// slots.
pub struct ActivityEngine {
    matcher: Arc<LocationMatcher>,
}

impl ActivityEngine {
    pub fn new(matcher: Arc<LocationMatcher>) -> Self {
        Self { matcher }
    }

    /// Fill one session slot from the candidate pool.
    ///
    /// The winning identifier is reserved in the ledger before returning,
    /// so a later slot of the same generation cannot reselect it. When the
    /// pool is exhausted the slot degrades to a placeholder — never an
    /// error.
    pub fn assign(
        &self,
        ctx: &SessionContext<'_>,
        pool: &[Activity],
        ledger: &mut UniquenessLedger,
        alternatives_cap: usize,
    ) -> SessionSelection {
        let slot = SlotKey::session(ctx.day, ctx.kind);
        let window = ctx.kind.window();

        let eligible: Vec<&Activity> = pool
            .iter()
            .filter(|a| ledger.is_available(&a.id))
            .filter(|a| hours::activity_covers(a, ctx.weekday, &window))
            .collect();

        debug!(
            slot = %slot,
            pool = pool.len(),
            eligible = eligible.len(),
            "session candidates filtered"
        );

        let cascade = self.cascade(ctx);
        let mut winner: Option<(&Activity, SelectionTier)> = None;
        for (tier, predicate) in &cascade {
            if let Some(candidate) = eligible.iter().copied().find(|&a| predicate(a)) {
                winner = Some((candidate, *tier));
                break;
            }
        }

        let Some((activity, tier)) = winner else {
            info!(slot = %slot, "session pool exhausted, recording placeholder");
            return SessionSelection {
                outcome: SlotOutcome::Unfilled(Placeholder {
                    slot,
                    reason: PlaceholderReason::PoolExhausted,
                }),
                alternatives: Vec::new(),
            };
        };

        // The eligible list was filtered against the ledger above, so the
        // reservation cannot already exist.
        ledger.reserve(&activity.id);

        let affinity = ctx
            .anchor
            .map(|anchor| self.matcher.match_tier(&activity.district, &activity.area, anchor))
            .unwrap_or(MatchTier::None);

        info!(
            slot = %slot,
            id = %activity.id,
            name = %activity.name,
            tier = ?tier,
            trait_matched = activity.trait_matched,
            "session committed"
        );

        let mut seen: HashSet<&str> = HashSet::new();
        seen.insert(activity.id.as_str());
        let mut alternatives = Vec::new();
        'outer: for (_, predicate) in &cascade {
            for candidate in eligible.iter().copied().filter(|&a| predicate(a)) {
                if seen.insert(candidate.id.as_str()) {
                    alternatives.push(candidate.clone());
                    if alternatives.len() >= alternatives_cap {
                        break 'outer;
                    }
                }
            }
        }

        SessionSelection {
            outcome: SlotOutcome::Assigned(Assignment {
                slot,
                choice: activity.clone(),
                tier,
                trait_matched: activity.trait_matched,
                fallback: tier.is_fallback(),
                affinity,
            }),
            alternatives,
        }
    }

    /// The ordered tier predicates for one slot. Location-bound tiers never
    /// match when the slot has no anchor.
    fn cascade<'a>(
        &'a self,
        ctx: &SessionContext<'a>,
    ) -> Vec<(SelectionTier, Box<dyn Fn(&Activity) -> bool + 'a>)> {
        let anchor = ctx.anchor;
        let affinity = move |a: &Activity| {
            anchor
                .map(|anchor| self.matcher.match_tier(&a.district, &a.area, anchor))
                .unwrap_or(MatchTier::None)
        };

        vec![
            (
                SelectionTier::TraitDistrict,
                Box::new(move |a: &Activity| {
                    a.trait_matched && affinity(a) == MatchTier::SameDistrict
                }),
            ),
            (
                SelectionTier::TraitArea,
                Box::new(move |a: &Activity| a.trait_matched && affinity(a) == MatchTier::SameArea),
            ),
            (
                SelectionTier::TraitAnywhere,
                Box::new(|a: &Activity| a.trait_matched),
            ),
            (
                SelectionTier::GeneralDistrict,
                Box::new(move |a: &Activity| {
                    !a.trait_matched && affinity(a) == MatchTier::SameDistrict
                }),
            ),
            (
                SelectionTier::GeneralArea,
                Box::new(move |a: &Activity| {
                    !a.trait_matched && affinity(a) == MatchTier::SameArea
                }),
            ),
            (
                SelectionTier::GeneralAnywhere,
                Box::new(|a: &Activity| !a.trait_matched),
            ),
        ]
    }
}
