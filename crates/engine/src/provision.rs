//! Provision assignment — one restaurant per meal slot.
//!
//! Each meal derives its anchor districts from the day's already-committed
//! sessions, then walks a fallback ladder: search the anchor districts,
//! then the configured adjacent districts, then district-agnostic. Every
//! rung is a remote search + rank round trip through the call manager; a
//! capability failure (circuit open, exhausted retries) or an empty
//! post-filter result drops to the next rung. Only when the ladder is
//! exhausted does the slot degrade to a placeholder — the generation
//! continues either way.

use crate::hours;
use crate::location::LocationMatcher;
use chrono::Weekday;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tripweaver_core::{
    AnchorLocation, Assignment, MatchTier, MealKind, Placeholder, PlaceholderReason,
    ProvisionedItem, RankRequest, RemoteError, SearchRequest, SelectionTier, SlotKey, SlotOutcome,
    UniquenessLedger,
};
use tripweaver_remote::RemoteCallManager;

/// One meal slot to fill.
#[derive(Debug, Clone)]
pub struct MealContext {
    /// Day index, 1-based.
    pub day: u8,

    /// The calendar weekday of that day.
    pub weekday: Weekday,

    pub kind: MealKind,

    /// Committed same-day session locations relevant to this meal
    /// (breakfast←morning; lunch←morning,afternoon; dinner←afternoon,night).
    pub anchors: Vec<AnchorLocation>,

    /// The profile's ordered provisioning category preferences.
    pub preferred_categories: Vec<String>,
}

/// The engine's verdict for one meal slot.
#[derive(Debug, Clone)]
pub struct MealSelection {
    pub outcome: SlotOutcome<ProvisionedItem>,

    /// Ranked runner-ups retained for display. Never reserved in the
    /// ledger — they stay eligible for other meals.
    pub alternatives: Vec<ProvisionedItem>,

    /// Total candidates returned across this slot's search calls.
    pub considered: usize,
}

/// Places provisioned items into meal slots through the remote search and
/// rank capabilities.
pub struct ProvisionEngine {
    manager: Arc<RemoteCallManager>,
    matcher: Arc<LocationMatcher>,

    /// Districts searched when the anchor districts yield nothing.
    fallback_districts: Vec<String>,

    alternatives_cap: usize,
}

impl ProvisionEngine {
    pub fn new(
        manager: Arc<RemoteCallManager>,
        matcher: Arc<LocationMatcher>,
        fallback_districts: Vec<String>,
        alternatives_cap: usize,
    ) -> Self {
        Self {
            manager,
            matcher,
            fallback_districts,
            alternatives_cap,
        }
    }

    /// Fill one meal slot, reserving the winner in the ledger.
    pub async fn assign(
        &self,
        ctx: &MealContext,
        ledger: &mut UniquenessLedger,
    ) -> MealSelection {
        let slot = SlotKey::meal(ctx.day, ctx.kind);
        let window = ctx.kind.window();

        let mut considered = 0usize;
        let mut last_error: Option<RemoteError> = None;

        for (tier, districts) in self.ladder(ctx) {
            let request = SearchRequest {
                districts: districts.clone(),
                meal: ctx.kind,
                preferred_categories: ctx.preferred_categories.clone(),
            };

            let items = match self.manager.search(request).await {
                Ok(items) => items,
                Err(err) => {
                    warn!(
                        slot = %slot,
                        rung = ?tier,
                        error = %err,
                        "provisioning search failed, dropping to next rung"
                    );
                    last_error = Some(err);
                    continue;
                }
            };
            considered += items.len();

            let open: Vec<ProvisionedItem> = items
                .into_iter()
                .filter(|item| ledger.is_available(&item.id))
                .filter(|item| hours::item_covers(item, ctx.weekday, &window))
                .collect();
            if open.is_empty() {
                debug!(
                    slot = %slot,
                    rung = ?tier,
                    "no open, unused candidates on this rung"
                );
                continue;
            }

            let ranking = match self
                .manager
                .rank(RankRequest {
                    items: open,
                    preferred_categories: ctx.preferred_categories.clone(),
                })
                .await
            {
                Ok(ranking) => ranking,
                Err(err) => {
                    warn!(
                        slot = %slot,
                        rung = ?tier,
                        error = %err,
                        "provisioning rank failed, dropping to next rung"
                    );
                    last_error = Some(err);
                    continue;
                }
            };

            let top = ranking.top;
            if !ledger.reserve(&top.id) {
                // The ranker returned an item outside the set we offered.
                warn!(slot = %slot, id = %top.id, "ranked item already reserved, dropping rung");
                continue;
            }

            let affinity = ctx
                .anchors
                .iter()
                .map(|anchor| self.matcher.match_tier(&top.district, "", anchor))
                .min()
                .unwrap_or(MatchTier::None);
            let trait_matched = ctx
                .preferred_categories
                .iter()
                .any(|category| top.has_category(category));

            info!(
                slot = %slot,
                id = %top.id,
                name = %top.name,
                rung = ?tier,
                trait_matched,
                "meal committed"
            );

            let mut alternatives = ranking.runner_ups;
            alternatives.truncate(self.alternatives_cap);

            return MealSelection {
                outcome: SlotOutcome::Assigned(Assignment {
                    slot,
                    choice: top,
                    tier,
                    trait_matched,
                    fallback: tier.is_fallback(),
                    affinity,
                }),
                alternatives,
                considered,
            };
        }

        let reason = match last_error {
            Some(err) => PlaceholderReason::RemoteUnavailable(err.to_string()),
            None => PlaceholderReason::PoolExhausted,
        };
        warn!(slot = %slot, reason = ?reason, "meal unfilled, recording placeholder");

        MealSelection {
            outcome: SlotOutcome::Unfilled(Placeholder { slot, reason }),
            alternatives: Vec::new(),
            considered,
        }
    }

    /// The fallback ladder for one meal: anchor districts, configured
    /// adjacent districts (minus any already-anchored), then anywhere.
    fn ladder(&self, ctx: &MealContext) -> Vec<(SelectionTier, Vec<String>)> {
        let mut anchor_districts: Vec<String> = Vec::new();
        for anchor in &ctx.anchors {
            if !anchor_districts
                .iter()
                .any(|d| d.eq_ignore_ascii_case(&anchor.district))
            {
                anchor_districts.push(anchor.district.clone());
            }
        }

        let adjacent: Vec<String> = self
            .fallback_districts
            .iter()
            .filter(|d| !anchor_districts.iter().any(|a| a.eq_ignore_ascii_case(d)))
            .cloned()
            .collect();

        let mut ladder = Vec::new();
        if !anchor_districts.is_empty() {
            ladder.push((SelectionTier::AnchorSearch, anchor_districts));
        }
        if !adjacent.is_empty() {
            ladder.push((SelectionTier::AdjacentSearch, adjacent));
        }
        ladder.push((SelectionTier::AnywhereSearch, Vec::new()));
        ladder
    }
}
