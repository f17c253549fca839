//! Committed assignments and the aggregated itinerary result.
//!
//! An [`Assignment`] snapshots the chosen candidate at commit time together
//! with how it was selected: which rung of the priority cascade (or search
//! fallback ladder) won, whether the candidate was trait-matched, and how
//! its location relates to the session anchor. Slots that could not be
//! filled degrade to a [`Placeholder`] rather than aborting the generation.

use crate::place::{Activity, MatchTier, ProvisionedItem};
use crate::slot::SlotKey;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The rung of the selection cascade that produced an assignment.
///
/// The first six variants are the activity priority cascade, evaluated
/// top-down; the last three are the provisioning search ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionTier {
    // --- Activity cascade ---
    TraitDistrict,
    TraitArea,
    TraitAnywhere,
    GeneralDistrict,
    GeneralArea,
    GeneralAnywhere,

    // --- Provisioning search ladder ---
    AnchorSearch,
    AdjacentSearch,
    AnywhereSearch,
}

impl SelectionTier {
    /// Whether this rung is a fallback beyond the preferred path
    /// (non-trait-matched activity tiers, or any search rung past the
    /// anchor districts).
    pub fn is_fallback(self) -> bool {
        matches!(
            self,
            SelectionTier::GeneralDistrict
                | SelectionTier::GeneralArea
                | SelectionTier::GeneralAnywhere
                | SelectionTier::AdjacentSearch
                | SelectionTier::AnywhereSearch
        )
    }
}

/// A committed slot: the candidate snapshot plus selection metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment<T> {
    pub slot: SlotKey,

    /// Snapshot of the chosen candidate, taken at commit time and never
    /// mutated afterward.
    pub choice: T,

    pub tier: SelectionTier,

    /// Whether the candidate matched the profile's preferred categories.
    pub trait_matched: bool,

    /// Whether a fallback rung was needed to fill this slot.
    pub fallback: bool,

    /// How the candidate's location relates to the session anchor.
    /// `MatchTier::None` when the slot had no anchor.
    pub affinity: MatchTier,
}

/// Why a slot could not be filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason", content = "detail")]
pub enum PlaceholderReason {
    /// Every candidate was already reserved or failed the hours filter.
    PoolExhausted,

    /// The provisioning service was unavailable on every fallback rung;
    /// carries a summary of the last classified error.
    RemoteUnavailable(String),
}

/// A structurally valid but unfilled slot. The itinerary continues past it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholder {
    pub slot: SlotKey,
    pub reason: PlaceholderReason,
}

/// Outcome of one slot: committed or degraded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum SlotOutcome<T> {
    Assigned(Assignment<T>),
    Unfilled(Placeholder),
}

impl<T> SlotOutcome<T> {
    pub fn assignment(&self) -> Option<&Assignment<T>> {
        match self {
            SlotOutcome::Assigned(a) => Some(a),
            SlotOutcome::Unfilled(_) => None,
        }
    }

    pub fn is_assigned(&self) -> bool {
        matches!(self, SlotOutcome::Assigned(_))
    }

    pub fn slot(&self) -> SlotKey {
        match self {
            SlotOutcome::Assigned(a) => a.slot,
            SlotOutcome::Unfilled(p) => p.slot,
        }
    }
}

/// One slot's outcome plus the bounded runner-up list retained for display.
/// Alternatives are never reserved in the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotReport<T> {
    pub outcome: SlotOutcome<T>,

    #[serde(default = "Vec::new")]
    pub alternatives: Vec<T>,
}

/// One generated day: three session slots and three meal slots, in
/// within-day order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayPlan {
    /// Day index, 1-based.
    pub day: u8,
    pub date: NaiveDate,
    pub sessions: Vec<SlotReport<Activity>>,
    pub meals: Vec<SlotReport<ProvisionedItem>>,
}

/// Per-capability call counters snapshotted into the result metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityUsage {
    pub capability: String,
    pub invocations: u64,
    pub successes: u64,
    pub failures: u64,
    pub retries: u64,
    pub breaker_rejections: u64,
}

impl CapabilityUsage {
    /// Counter-wise difference against an earlier snapshot of the same
    /// capability, for per-generation accounting on shared process-wide
    /// statistics.
    pub fn since(&self, earlier: &CapabilityUsage) -> CapabilityUsage {
        CapabilityUsage {
            capability: self.capability.clone(),
            invocations: self.invocations.saturating_sub(earlier.invocations),
            successes: self.successes.saturating_sub(earlier.successes),
            failures: self.failures.saturating_sub(earlier.failures),
            retries: self.retries.saturating_sub(earlier.retries),
            breaker_rejections: self
                .breaker_rejections
                .saturating_sub(earlier.breaker_rejections),
        }
    }
}

/// Generation metadata for distinguishing complete from partial itineraries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationMetadata {
    /// Size of the externally supplied activity candidate pool.
    pub activities_considered: usize,

    /// Total provisioned items returned across all search calls.
    pub provisions_considered: usize,

    /// Per-capability call counters for this generation.
    pub capability_usage: Vec<CapabilityUsage>,

    /// Slots filled through a fallback rung.
    pub fallback_slots: Vec<SlotKey>,

    /// Slots left as placeholders.
    pub placeholder_slots: Vec<SlotKey>,

    pub elapsed_ms: u64,
}

/// The complete result of one itinerary generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItineraryResult {
    pub generation_id: Uuid,

    /// The personality code the itinerary was generated for.
    pub personality: String,

    pub start_date: NaiveDate,
    pub days: Vec<DayPlan>,
    pub metadata: GenerationMetadata,
}

impl ItineraryResult {
    /// Every committed identifier with the slot it was committed to,
    /// activities and provisioned items alike, in slot order.
    pub fn committed_ids(&self) -> Vec<(String, SlotKey)> {
        let mut ids = Vec::new();
        for day in &self.days {
            for report in &day.sessions {
                if let SlotOutcome::Assigned(a) = &report.outcome {
                    ids.push((a.choice.id.clone(), a.slot));
                }
            }
            for report in &day.meals {
                if let SlotOutcome::Assigned(a) = &report.outcome {
                    ids.push((a.choice.id.clone(), a.slot));
                }
            }
        }
        ids
    }

    /// Whether every one of the 18 slots was committed.
    pub fn is_complete(&self) -> bool {
        self.metadata.placeholder_slots.is_empty()
    }
}
