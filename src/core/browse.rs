use std::collections::BTreeSet;

use crate::models::{BrowseQuery, ServiceRecord};
use crate::core::filters::tags_include;

/// Filters behind the directory listing
///
/// Unlike need matching, every populated filter narrows the result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrowseFilters {
    pub program_type: Option<String>,
    pub sub_region: Option<String>,
    pub household_type: Option<String>,
    pub keyword: Option<String>,
}

impl From<&BrowseQuery> for BrowseFilters {
    fn from(query: &BrowseQuery) -> Self {
        Self {
            program_type: query.program_type.clone(),
            sub_region: query.sub_region.clone(),
            household_type: query.household_type.clone(),
            keyword: query.keyword.clone(),
        }
    }
}

impl BrowseFilters {
    /// Records passing every active filter, in catalog order
    pub fn apply(&self, catalog: &[ServiceRecord]) -> Vec<ServiceRecord> {
        let program_type = active(&self.program_type);
        let sub_region = active(&self.sub_region);
        let household_type = active(&self.household_type);
        let keyword = self
            .keyword
            .as_deref()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty());

        catalog
            .iter()
            .filter(|r| program_type.map_or(true, |v| tags_include(r.program_type.as_deref(), v)))
            .filter(|r| sub_region.map_or(true, |v| tags_include(r.sub_region.as_deref(), v)))
            .filter(|r| {
                household_type.map_or(true, |v| tags_include(r.household_type.as_deref(), v))
            })
            .filter(|r| {
                keyword.as_deref().map_or(true, |k| {
                    r.text_fields().any(|field| field.to_lowercase().contains(k))
                })
            })
            .cloned()
            .collect()
    }
}

/// Empty and "All" both mean no filter
fn active(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

/// Multi-value columns that have dropdown facets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetField {
    ProgramType,
    SubRegion,
    HouseholdType,
}

/// Distinct, sorted tag values of a multi-value column
///
/// Tags keep their catalog spelling (trimmed). The household placeholder
/// "unclear" is left out.
pub fn facet_values(catalog: &[ServiceRecord], field: FacetField) -> Vec<String> {
    let mut values = BTreeSet::new();

    for record in catalog {
        let raw = match field {
            FacetField::ProgramType => record.program_type.as_deref(),
            FacetField::SubRegion => record.sub_region.as_deref(),
            FacetField::HouseholdType => record.household_type.as_deref(),
        };
        let Some(raw) = raw else { continue };

        for tag in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            if field == FacetField::HouseholdType && tag.eq_ignore_ascii_case("unclear") {
                continue;
            }
            values.insert(tag.to_string());
        }
    }

    values.into_iter().collect()
}
