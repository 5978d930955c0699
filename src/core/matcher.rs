use std::collections::HashSet;

use crate::models::{NeedProfile, ServiceRecord};
use crate::core::filters::{
    allows_pets, in_sub_region, matches_addiction, matches_food, matches_medical,
    matches_mental_health, matches_shelter, serves_disabilities, speaks_language,
};

/// Result of the matching process
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub resources: Vec<ServiceRecord>,
    pub total_candidates: usize,
}

/// Turns a need profile into the set of eligible services
///
/// # Pipeline Stages
/// 1. Union of every activated need category (shelter, food, medical,
///    mental health, addiction)
/// 2. Restrictive filters (disability, pets, sub-region, language)
/// 3. Optional truncation to `limit`
///
/// Output keeps catalog order; there is no ranking.
#[derive(Debug, Clone, Copy, Default)]
pub struct Matcher {
    limit: Option<usize>,
}

impl Matcher {
    pub fn new(limit: Option<usize>) -> Self {
        Self { limit }
    }

    /// Same matcher with a different result cap
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Find the catalog entries that satisfy the profile
    ///
    /// A profile with no need category selected yields nothing, never the
    /// whole catalog.
    pub fn find_matches(&self, profile: &NeedProfile, catalog: &[ServiceRecord]) -> MatchResult {
        let total_candidates = catalog.len();

        if !profile.has_active_category() {
            return MatchResult {
                resources: Vec::new(),
                total_candidates,
            };
        }

        let location = profile.preferred_location.trim();
        let language = profile.language_needs.trim();
        let mut seen: HashSet<&str> = HashSet::new();

        let resources: Vec<ServiceRecord> = catalog
            .iter()
            // Stage 1: additive need categories
            .filter(|record| matches_any_category(record, profile))
            // Stage 2: restrictive filters
            .filter(|record| !profile.has_disability || serves_disabilities(record))
            .filter(|record| !profile.has_pet || allows_pets(record))
            .filter(|record| location.is_empty() || in_sub_region(record, location))
            .filter(|record| language.is_empty() || speaks_language(record, language))
            // Set semantics by identifier
            .filter(|&record| match record.id() {
                Some(id) => seen.insert(id),
                None => true,
            })
            .take(self.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();

        tracing::debug!(
            "Matched {} of {} catalog entries",
            resources.len(),
            total_candidates
        );

        MatchResult {
            resources,
            total_candidates,
        }
    }
}

fn matches_any_category(record: &ServiceRecord, profile: &NeedProfile) -> bool {
    (profile.needs_shelter && matches_shelter(record, profile.gender, profile.is_couple))
        || (profile.needs_food && matches_food(record))
        || (profile.needs_medical_help && matches_medical(record))
        || (profile.needs_mental_health && matches_mental_health(record))
        || (profile.needs_addiction && matches_addiction(record))
}

/// Append favorites that are not already in `results`
///
/// Comparison is by identifier; `results` keep their order and come first.
/// Records without an identifier cannot be favorites and are skipped.
pub fn merge_favorites(results: &[ServiceRecord], favorites: &[ServiceRecord]) -> Vec<ServiceRecord> {
    let mut present: HashSet<&str> = results.iter().filter_map(ServiceRecord::id).collect();
    let mut merged = results.to_vec();

    for favorite in favorites {
        if let Some(id) = favorite.id() {
            if present.insert(id) {
                merged.push(favorite.clone());
            }
        }
    }

    merged
}
