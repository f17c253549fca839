//! The remote provisioning capability seam.
//!
//! The provisioning service exposes two capabilities: searching for
//! restaurant candidates by district and meal, and ranking a candidate set
//! to a single top recommendation plus runner-ups. A [`ProvisionTransport`]
//! knows how to carry one capability invocation to the service;
//! implementations (HTTP, in-process stub) live in `tripweaver-remote`,
//! which wraps every invocation in pooling, circuit breaking, and retry.

use crate::error::RemoteError;
use crate::place::ProvisionedItem;
use crate::slot::MealKind;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A remote capability of the provisioning service. Circuit breaker, pool,
/// and statistics state is kept per capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    SearchProvisions,
    RankProvisions,
}

impl Capability {
    pub const ALL: [Capability; 2] = [Capability::SearchProvisions, Capability::RankProvisions];

    pub fn as_str(self) -> &'static str {
        match self {
            Capability::SearchProvisions => "search_provisions",
            Capability::RankProvisions => "rank_provisions",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arguments for the search capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Districts to search in. Empty means district-agnostic.
    #[serde(default)]
    pub districts: Vec<String>,

    pub meal: MealKind,

    /// The profile's ordered provisioning category preferences, passed as a
    /// weighting hint.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preferred_categories: Vec<String>,
}

/// Arguments for the rank capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankRequest {
    pub items: Vec<ProvisionedItem>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preferred_categories: Vec<String>,
}

/// The rank capability's verdict: exactly one top recommendation plus the
/// ranked remainder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ranking {
    pub top: ProvisionedItem,

    #[serde(default)]
    pub runner_ups: Vec<ProvisionedItem>,
}

/// A single capability invocation, dispatched by the call manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "capability", content = "args")]
pub enum CapabilityRequest {
    Search(SearchRequest),
    Rank(RankRequest),
}

impl CapabilityRequest {
    pub fn capability(&self) -> Capability {
        match self {
            CapabilityRequest::Search(_) => Capability::SearchProvisions,
            CapabilityRequest::Rank(_) => Capability::RankProvisions,
        }
    }
}

/// The result of a capability invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "capability", content = "result")]
pub enum CapabilityResponse {
    Search(Vec<ProvisionedItem>),
    Rank(Ranking),
}

/// Carries one capability invocation to the provisioning service.
///
/// Implementations perform a single attempt with no resilience of their
/// own — classification into [`RemoteError`] is their whole error contract.
/// Retry, pooling, and circuit breaking are layered on top by the call
/// manager in `tripweaver-remote`.
#[async_trait]
pub trait ProvisionTransport: Send + Sync {
    /// The transport's name, for logs and diagnostics.
    fn name(&self) -> &str;

    async fn search(&self, request: SearchRequest) -> Result<Vec<ProvisionedItem>, RemoteError>;

    async fn rank(&self, request: RankRequest) -> Result<Ranking, RemoteError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_request_reports_its_capability() {
        let search = CapabilityRequest::Search(SearchRequest {
            districts: vec!["Xinyi".into()],
            meal: MealKind::Lunch,
            preferred_categories: vec![],
        });
        assert_eq!(search.capability(), Capability::SearchProvisions);

        let rank = CapabilityRequest::Rank(RankRequest {
            items: vec![],
            preferred_categories: vec![],
        });
        assert_eq!(rank.capability(), Capability::RankProvisions);
    }

    #[test]
    fn search_request_serializes_with_tag() {
        let request = CapabilityRequest::Search(SearchRequest {
            districts: vec!["Zhongshan".into()],
            meal: MealKind::Breakfast,
            preferred_categories: vec!["cafe".into()],
        });
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["capability"], "search");
        assert_eq!(json["args"]["meal"], "breakfast");
    }
}
