//! Geographic continuity scoring.
//!
//! Districts roll up into areas; a small adjacency table marks district
//! pairs treated as interchangeable for travel-time purposes (an adjacent
//! district scores as `SameDistrict`). Both tables are data supplied at
//! construction — extending coverage is a config change, not a code
//! change. District names are matched case-insensitively.

use std::collections::{HashMap, HashSet};
use tripweaver_core::place::{AnchorLocation, MatchTier};

/// Scores two locations for "same place" affinity.
#[derive(Debug, Clone)]
pub struct LocationMatcher {
    /// district → containing area
    district_area: HashMap<String, String>,

    /// district → districts scoring as SameDistrict
    adjacency: HashMap<String, HashSet<String>>,
}

impl LocationMatcher {
    /// Build a matcher from `area → districts` and `district → adjacent
    /// districts` tables.
    pub fn new(
        areas: &HashMap<String, Vec<String>>,
        adjacent: &HashMap<String, Vec<String>>,
    ) -> Self {
        let mut district_area = HashMap::new();
        for (area, districts) in areas {
            for district in districts {
                district_area.insert(normalize(district), normalize(area));
            }
        }

        let mut adjacency: HashMap<String, HashSet<String>> = HashMap::new();
        for (district, neighbours) in adjacent {
            let entry = adjacency.entry(normalize(district)).or_default();
            for neighbour in neighbours {
                entry.insert(normalize(neighbour));
            }
        }

        Self {
            district_area,
            adjacency,
        }
    }

    /// Score a candidate location against an anchor.
    ///
    /// `SameDistrict` for the identical district or one in the anchor's
    /// adjacency set; `SameArea` when both roll up into the same area.
    /// Falls back to the locations' own declared areas for districts the
    /// hierarchy does not know.
    pub fn match_tier(
        &self,
        candidate_district: &str,
        candidate_area: &str,
        anchor: &AnchorLocation,
    ) -> MatchTier {
        let candidate = normalize(candidate_district);
        let anchored = normalize(&anchor.district);

        if candidate == anchored {
            return MatchTier::SameDistrict;
        }
        if let Some(neighbours) = self.adjacency.get(&anchored) {
            if neighbours.contains(&candidate) {
                return MatchTier::SameDistrict;
            }
        }

        let candidate_area = self
            .district_area
            .get(&candidate)
            .cloned()
            .unwrap_or_else(|| normalize(candidate_area));
        let anchor_area = self
            .district_area
            .get(&anchored)
            .cloned()
            .unwrap_or_else(|| normalize(&anchor.area));

        if !candidate_area.is_empty() && candidate_area == anchor_area {
            MatchTier::SameArea
        } else {
            MatchTier::None
        }
    }

    /// The area a district rolls up into, if the hierarchy knows it.
    pub fn area_of(&self, district: &str) -> Option<&str> {
        self.district_area.get(&normalize(district)).map(|s| s.as_str())
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> LocationMatcher {
        let mut areas = HashMap::new();
        areas.insert(
            "west".to_string(),
            vec!["Wanhua".to_string(), "Datong".to_string(), "Zhongzheng".to_string()],
        );
        areas.insert(
            "east".to_string(),
            vec!["Xinyi".to_string(), "Songshan".to_string()],
        );

        let mut adjacent = HashMap::new();
        adjacent.insert(
            "Zhongzheng".to_string(),
            vec!["Wanhua".to_string(), "Da'an".to_string()],
        );

        LocationMatcher::new(&areas, &adjacent)
    }

    fn anchor(district: &str, area: &str) -> AnchorLocation {
        AnchorLocation {
            district: district.into(),
            area: area.into(),
        }
    }

    #[test]
    fn identical_district_matches() {
        let m = matcher();
        assert_eq!(
            m.match_tier("Wanhua", "west", &anchor("Wanhua", "west")),
            MatchTier::SameDistrict
        );
    }

    #[test]
    fn adjacent_district_scores_as_same_district() {
        let m = matcher();
        assert_eq!(
            m.match_tier("Wanhua", "west", &anchor("Zhongzheng", "west")),
            MatchTier::SameDistrict
        );
    }

    #[test]
    fn adjacency_is_directional_by_table() {
        let m = matcher();
        // Wanhua has no adjacency entry of its own, but shares the west
        // area with Zhongzheng.
        assert_eq!(
            m.match_tier("Zhongzheng", "west", &anchor("Wanhua", "west")),
            MatchTier::SameArea
        );
    }

    #[test]
    fn same_area_without_adjacency() {
        let m = matcher();
        assert_eq!(
            m.match_tier("Datong", "west", &anchor("Wanhua", "west")),
            MatchTier::SameArea
        );
    }

    #[test]
    fn different_area_is_no_match() {
        let m = matcher();
        assert_eq!(
            m.match_tier("Xinyi", "east", &anchor("Wanhua", "west")),
            MatchTier::None
        );
    }

    #[test]
    fn unknown_districts_fall_back_to_declared_areas() {
        let m = matcher();
        assert_eq!(
            m.match_tier("Nangang", "east", &anchor("Neihu", "east")),
            MatchTier::SameArea
        );
        assert_eq!(
            m.match_tier("Nangang", "east", &anchor("Neihu", "north")),
            MatchTier::None
        );
    }

    #[test]
    fn matching_is_case_insensitive() {
        let m = matcher();
        assert_eq!(
            m.match_tier("wanhua", "WEST", &anchor("WANHUA", "west")),
            MatchTier::SameDistrict
        );
    }

    #[test]
    fn area_lookup() {
        let m = matcher();
        assert_eq!(m.area_of("Songshan"), Some("east"));
        assert_eq!(m.area_of("Atlantis"), None);
    }
}
