// Core algorithm exports
pub mod browse;
pub mod filters;
pub mod matcher;

pub use browse::{BrowseFilters, FacetField, facet_values};
pub use filters::{normalize_tags, tags_contain, tags_include, is_yes, matches_shelter};
pub use matcher::{Matcher, MatchResult, merge_favorites};
