//! Candidate types: activities (attractions) and provisioned items
//! (restaurants), plus the location vocabulary shared by both.
//!
//! Both candidate types are supplied externally — activities by the upstream
//! knowledge-base query, provisioned items by the remote provisioning
//! service — and are read-only within the core. An assignment snapshots the
//! chosen candidate at commit time; the snapshot is never mutated afterward.

use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// A tourist attraction candidate for a session slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Unique identifier within the candidate pool.
    pub id: String,
    pub name: String,
    pub address: String,
    pub district: String,
    pub area: String,

    /// Operating-hours expression, e.g. `"09:00-17:30"`, `"24 hours"`.
    /// An empty expression means hours are unspecified (always covering).
    #[serde(default)]
    pub hours: String,

    /// Operating-days expression, e.g. `"daily"`, `"Tue-Sun"`, `"Sat,Sun"`.
    #[serde(default)]
    pub days: String,

    pub category: String,

    /// Whether the upstream query flagged this candidate as matching the
    /// requesting profile's preferred categories.
    #[serde(default)]
    pub trait_matched: bool,
}

/// A restaurant candidate for a meal slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisionedItem {
    /// Unique identifier within the provisioning service.
    pub id: String,
    pub name: String,
    pub address: String,
    pub district: String,

    /// Per-weekday operating-hour ranges.
    #[serde(default)]
    pub weekday_hours: WeekdayHours,

    /// Category tags: cuisine plus the meal types served
    /// (e.g. `["breakfast", "cafe"]`).
    #[serde(default)]
    pub categories: Vec<String>,

    /// Review sentiment counters reported by the provisioning service.
    #[serde(default)]
    pub sentiment: Sentiment,
}

impl ProvisionedItem {
    /// Whether this item is tagged as serving the given meal type or
    /// cuisine category.
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c.eq_ignore_ascii_case(category))
    }
}

/// Review sentiment counters for a provisioned item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentiment {
    pub positive: u32,
    pub negative: u32,
    pub neutral: u32,
}

impl Sentiment {
    pub fn total(&self) -> u32 {
        self.positive + self.negative + self.neutral
    }

    /// Share of positive reviews, 0.0 when there are none at all.
    pub fn positive_ratio(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            f64::from(self.positive) / f64::from(total)
        }
    }
}

/// Operating-hour range expressions keyed by weekday.
///
/// Each entry is an `"HH:MM-HH:MM"` range; a day may carry several (split
/// lunch/dinner service). A day with no ranges is closed — unless the whole
/// table is empty, which means hours were never specified and the item is
/// treated as always open.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeekdayHours {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mon: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tue: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wed: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub thu: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fri: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sat: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sun: Vec<String>,
}

impl WeekdayHours {
    /// The ranges for one weekday.
    pub fn for_weekday(&self, weekday: Weekday) -> &[String] {
        match weekday {
            Weekday::Mon => &self.mon,
            Weekday::Tue => &self.tue,
            Weekday::Wed => &self.wed,
            Weekday::Thu => &self.thu,
            Weekday::Fri => &self.fri,
            Weekday::Sat => &self.sat,
            Weekday::Sun => &self.sun,
        }
    }

    /// Whether no day carries any range (hours unspecified).
    pub fn is_empty(&self) -> bool {
        [
            &self.mon, &self.tue, &self.wed, &self.thu, &self.fri, &self.sat, &self.sun,
        ]
        .iter()
        .all(|d| d.is_empty())
    }

    /// The same range expressions every day of the week.
    pub fn daily(ranges: &[&str]) -> Self {
        let ranges: Vec<String> = ranges.iter().map(|r| (*r).to_string()).collect();
        Self {
            mon: ranges.clone(),
            tue: ranges.clone(),
            wed: ranges.clone(),
            thu: ranges.clone(),
            fri: ranges.clone(),
            sat: ranges.clone(),
            sun: ranges,
        }
    }
}

/// How strongly a candidate's location matches an anchor location.
///
/// `SameDistrict` also covers districts listed in the anchor district's
/// adjacency table (districts treated as interchangeable for travel-time
/// purposes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    SameDistrict,
    SameArea,
    None,
}

/// The committed location of an earlier same-day slot, fixed once its
/// activity is committed and consulted by subsequent slots for geographic
/// continuity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorLocation {
    pub district: String,
    pub area: String,
}

impl AnchorLocation {
    pub fn of(activity: &Activity) -> Self {
        Self {
            district: activity.district.clone(),
            area: activity.area.clone(),
        }
    }
}
