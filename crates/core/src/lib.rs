//! # TripWeaver Core
//!
//! Domain types, traits, and error definitions for the TripWeaver itinerary
//! planner. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The remote provisioning service is defined as a trait here
//! ([`ProvisionTransport`]); implementations live in `tripweaver-remote`.
//! The assignment engines in `tripweaver-engine` operate purely on the types
//! in this crate, which enables:
//! - Swapping transports via configuration (HTTP, in-process stub)
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod itinerary;
pub mod ledger;
pub mod place;
pub mod profile;
pub mod remote;
pub mod slot;

// Re-export key types at crate root for ergonomics
pub use error::{Error, InvariantViolation, ProfileError, RemoteError, Result};
pub use itinerary::{
    Assignment, CapabilityUsage, DayPlan, GenerationMetadata, ItineraryResult, Placeholder,
    PlaceholderReason, SelectionTier, SlotOutcome, SlotReport,
};
pub use ledger::UniquenessLedger;
pub use place::{Activity, AnchorLocation, MatchTier, ProvisionedItem, Sentiment, WeekdayHours};
pub use profile::TraitProfile;
pub use remote::{
    Capability, CapabilityRequest, CapabilityResponse, ProvisionTransport, RankRequest, Ranking,
    SearchRequest,
};
pub use slot::{MealKind, SessionKind, SlotKey, SlotKind, TimeWindow, DAY_COUNT};
