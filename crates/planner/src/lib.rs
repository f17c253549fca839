//! # TripWeaver Planner
//!
//! The itinerary orchestrator: drives day-by-day assignment across the
//! activity and provision engines, maintains the running anchor set per
//! day, aggregates per-slot alternatives, and verifies the uniqueness
//! invariant over the finished result.
//!
//! One call to [`ItineraryPlanner::generate`] owns exactly one
//! [`UniquenessLedger`] and proceeds slot-by-slot in strict sequential
//! order — later slots' anchors depend on earlier commits. The shared
//! [`RemoteCallManager`] (breakers, pools, statistics) is the only
//! cross-request state.
//!
//! [`UniquenessLedger`]: tripweaver_core::UniquenessLedger
//! [`RemoteCallManager`]: tripweaver_remote::RemoteCallManager

pub mod orchestrator;
pub mod validate;

pub use orchestrator::{GenerationRequest, ItineraryPlanner};
pub use validate::verify_unique_commitments;
