//! Error types for the TripWeaver domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all TripWeaver operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Profile errors ---
    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),

    // --- Remote provisioning errors ---
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    // --- Invariant violations (programming defects, not runtime conditions) ---
    #[error("Invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Input-validation failures for personality codes. These reject the request
/// before any assignment work begins.
#[derive(Debug, Clone, Error)]
pub enum ProfileError {
    #[error("Personality code must be exactly 4 letters, got {0:?}")]
    MalformedCode(String),

    #[error("Unknown personality code: {0}")]
    UnknownCode(String),
}

/// Classified failures from the remote provisioning service.
///
/// The retry loop in `tripweaver-remote` consults [`RemoteError::retryable`]:
/// transient failures (connection, timeout, rate-limit, 5xx-equivalent) are
/// retried with backoff; authorization and malformed-request failures are not.
#[derive(Debug, Clone, Error)]
pub enum RemoteError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Rate limited by remote service, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Remote capability failed (status {status}): {message}")]
    RemoteTool { status: u16, message: String },

    #[error("Failed to parse remote response: {0}")]
    Parse(String),

    #[error("Circuit open for capability '{capability}'")]
    CircuitOpen { capability: String },

    #[error("Unknown remote error: {0}")]
    Unknown(String),
}

impl RemoteError {
    /// Whether the retry loop may attempt this call again.
    pub fn retryable(&self) -> bool {
        matches!(
            self,
            RemoteError::Connection(_)
                | RemoteError::Timeout(_)
                | RemoteError::RateLimited { .. }
                | RemoteError::RemoteTool { .. }
        )
    }
}

/// A duplicate reservation detected by the post-generation validation pass.
///
/// This indicates a ledger bypass bug — a logic defect, never an
/// environmental failure — so it aborts the whole generation.
#[derive(Debug, Clone, Error)]
#[error("identifier '{id}' committed to both {first_slot} and {second_slot}")]
pub struct InvariantViolation {
    pub id: String,
    pub first_slot: String,
    pub second_slot: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_displays_correctly() {
        let err = Error::Remote(RemoteError::RemoteTool {
            status: 502,
            message: "upstream unavailable".into(),
        });
        assert!(err.to_string().contains("502"));
        assert!(err.to_string().contains("upstream unavailable"));
    }

    #[test]
    fn transient_errors_are_retryable() {
        assert!(RemoteError::Connection("refused".into()).retryable());
        assert!(RemoteError::Timeout("10s elapsed".into()).retryable());
        assert!(RemoteError::RateLimited { retry_after_secs: 5 }.retryable());
        assert!(
            RemoteError::RemoteTool {
                status: 503,
                message: "overloaded".into()
            }
            .retryable()
        );
    }

    #[test]
    fn permanent_errors_are_not_retryable() {
        assert!(!RemoteError::Authorization("bad key".into()).retryable());
        assert!(!RemoteError::Parse("truncated body".into()).retryable());
        assert!(
            !RemoteError::CircuitOpen {
                capability: "search_provisions".into()
            }
            .retryable()
        );
        assert!(!RemoteError::Unknown("???".into()).retryable());
    }

    #[test]
    fn invariant_violation_names_both_slots() {
        let v = InvariantViolation {
            id: "act-17".into(),
            first_slot: "day 1 morning".into(),
            second_slot: "day 3 night".into(),
        };
        let msg = v.to_string();
        assert!(msg.contains("act-17"));
        assert!(msg.contains("day 1 morning"));
        assert!(msg.contains("day 3 night"));
    }
}
