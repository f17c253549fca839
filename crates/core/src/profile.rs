//! Personality profile resolution — a pure lookup from a 4-letter
//! personality code to an ordered preference profile.
//!
//! The catalogue below is data, not logic: each of the 16 canonical codes
//! maps to an ordered list of preferred activity categories and an ordered
//! list of preferred provisioning categories, most-preferred first. The
//! upstream knowledge-base query uses the activity list to flag candidates
//! as trait-matched; the remote ranking capability receives the
//! provisioning list as a weighting hint.

use crate::error::ProfileError;
use serde::{Deserialize, Serialize};

/// An ordered preference profile for one personality code.
///
/// Immutable, created once per itinerary-generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitProfile {
    /// The validated 4-letter code, uppercase.
    pub code: String,

    /// Preferred activity categories, most-preferred first.
    pub activity_categories: Vec<String>,

    /// Preferred provisioning categories, most-preferred first.
    pub provision_categories: Vec<String>,
}

impl TraitProfile {
    /// Resolve a personality code to its preference profile.
    ///
    /// The code must be exactly four ASCII letters and one of the sixteen
    /// canonical codes; anything else is rejected before any assignment
    /// work begins.
    pub fn resolve(code: &str) -> Result<Self, ProfileError> {
        let trimmed = code.trim();
        if trimmed.len() != 4 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ProfileError::MalformedCode(code.to_string()));
        }

        let canonical = trimmed.to_ascii_uppercase();
        let (_, activities, provisions) = CATALOGUE
            .iter()
            .find(|(c, _, _)| *c == canonical)
            .ok_or_else(|| ProfileError::UnknownCode(canonical.clone()))?;

        Ok(Self {
            code: canonical,
            activity_categories: activities.iter().map(|s| (*s).to_string()).collect(),
            provision_categories: provisions.iter().map(|s| (*s).to_string()).collect(),
        })
    }

    /// All sixteen canonical codes, in catalogue order.
    pub fn all_codes() -> Vec<&'static str> {
        CATALOGUE.iter().map(|(c, _, _)| *c).collect()
    }
}

/// code → (activity categories, provisioning categories), ordered by
/// preference. Extend by adding rows.
const CATALOGUE: &[(&str, &[&str], &[&str])] = &[
    (
        "INTJ",
        &["museum", "historic_site", "observatory", "art_gallery"],
        &["fine_dining", "cafe", "noodle_shop"],
    ),
    (
        "INTP",
        &["museum", "bookstore_street", "observatory", "cultural_center"],
        &["cafe", "noodle_shop", "dumpling_house"],
    ),
    (
        "ENTJ",
        &["landmark", "observatory", "shopping", "historic_site"],
        &["fine_dining", "steakhouse", "hot_pot"],
    ),
    (
        "ENTP",
        &["night_market", "amusement", "cultural_center", "shopping"],
        &["street_food", "izakaya", "hot_pot"],
    ),
    (
        "INFJ",
        &["temple", "art_gallery", "nature_trail", "cultural_center"],
        &["vegetarian", "cafe", "tea_house"],
    ),
    (
        "INFP",
        &["art_gallery", "nature_trail", "bookstore_street", "temple"],
        &["cafe", "dessert", "vegetarian"],
    ),
    (
        "ENFJ",
        &["cultural_center", "night_market", "temple", "waterfront"],
        &["hot_pot", "brunch", "street_food"],
    ),
    (
        "ENFP",
        &["amusement", "night_market", "waterfront", "art_gallery"],
        &["dessert", "street_food", "brunch"],
    ),
    (
        "ISTJ",
        &["historic_site", "museum", "memorial_hall", "landmark"],
        &["noodle_shop", "dumpling_house", "bento"],
    ),
    (
        "ISFJ",
        &["memorial_hall", "temple", "park", "museum"],
        &["tea_house", "bakery", "noodle_shop"],
    ),
    (
        "ESTJ",
        &["landmark", "memorial_hall", "shopping", "observatory"],
        &["steakhouse", "hot_pot", "bento"],
    ),
    (
        "ESFJ",
        &["shopping", "night_market", "park", "memorial_hall"],
        &["brunch", "bakery", "hot_pot"],
    ),
    (
        "ISTP",
        &["hot_spring", "nature_trail", "riverside_cycling", "observatory"],
        &["bento", "noodle_shop", "street_food"],
    ),
    (
        "ISFP",
        &["nature_trail", "hot_spring", "art_gallery", "waterfront"],
        &["dessert", "tea_house", "seafood"],
    ),
    (
        "ESTP",
        &["amusement", "riverside_cycling", "night_market", "landmark"],
        &["bbq", "seafood", "street_food"],
    ),
    (
        "ESFP",
        &["night_market", "amusement", "shopping", "waterfront"],
        &["bbq", "dessert", "izakaya"],
    ),
];
