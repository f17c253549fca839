//! Post-generation invariant check.
//!
//! Re-scans every committed assignment and verifies that no identifier was
//! committed twice. The engines already enforce this through the ledger, so
//! a hit here means a ledger bypass bug — it is surfaced as an internal
//! fault, never a user-facing error. The scan is read-only and idempotent:
//! re-running it over a valid result never flags a violation.

use std::collections::HashMap;
use tripweaver_core::{InvariantViolation, ItineraryResult, SlotKey};

/// Verify that the committed identifiers across all 18 slots contain no
/// duplicates. Placeholders are skipped.
pub fn verify_unique_commitments(result: &ItineraryResult) -> Result<(), InvariantViolation> {
    let mut seen: HashMap<String, SlotKey> = HashMap::new();
    for (id, slot) in result.committed_ids() {
        if let Some(first) = seen.insert(id.clone(), slot) {
            return Err(InvariantViolation {
                id,
                first_slot: first.to_string(),
                second_slot: slot.to_string(),
            });
        }
    }
    Ok(())
}
