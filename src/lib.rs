//! Resource Directory - community resource matching service
//!
//! This library provides the need-matching engine, directory filters,
//! favorites persistence and the catalog-aware chat proxy behind the
//! resource directory app.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{Matcher, MatchResult, BrowseFilters, merge_favorites};
pub use models::{ServiceRecord, NeedProfile, Gender, ChatMessage, Role};
pub use services::{Catalog, FavoritesStore, ChatSession, CompletionClient};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let catalog = Catalog::new(vec![]);
        let result = Matcher::default().find_matches(&NeedProfile::default(), catalog.records());
        assert!(result.resources.is_empty());
    }
}
