// Unit tests for the resource directory public API

use resource_directory::core::{
    browse::{facet_values, BrowseFilters, FacetField},
    filters::{is_yes, matches_shelter, normalize_tags, tags_contain},
};
use resource_directory::models::{Gender, ServiceRecord};
use resource_directory::services::Catalog;

const SAMPLE_CATALOG: &str = include_str!("../data/regional_services.json");

fn sample() -> Catalog {
    Catalog::from_json(SAMPLE_CATALOG).expect("sample catalog parses")
}

#[test]
fn test_sample_catalog_parses_mixed_bed_inventory() {
    let catalog = sample();
    assert_eq!(catalog.len(), 5);

    let marys = catalog.get("Mary's Place Family Center").unwrap();
    assert_eq!(marys.bed_count(), Some(120));
    assert!(marys.last_verified_date().is_some());

    let eastside = catalog.get("Eastside Men's Shelter").unwrap();
    assert_eq!(eastside.bed_count(), Some(100));
    assert!(eastside.last_verified_date().is_none());
}

#[test]
fn test_normalization_helpers() {
    assert_eq!(normalize_tags("Shelter,  Day Center"), vec!["shelter", "day center"]);
    assert!(tags_contain(Some("Transitional Housing"), "housing"));
    assert!(is_yes(Some("YES")));
    assert!(!is_yes(Some("")));
}

#[test]
fn test_missing_fields_never_match() {
    let bare = ServiceRecord {
        program_name: Some("Bare".to_string()),
        ..Default::default()
    };
    assert!(!matches_shelter(&bare, Gender::Any, false));
    assert!(!tags_contain(bare.program_type.as_deref(), "food"));
    assert!(!is_yes(bare.pets_allowed.as_deref()));
}

#[test]
fn test_browse_by_sub_region_tag() {
    let catalog = sample();
    let filters = BrowseFilters {
        sub_region: Some("seattle".to_string()),
        ..Default::default()
    };

    let names: Vec<_> = filters
        .apply(catalog.records())
        .iter()
        .filter_map(|r| r.id().map(str::to_string))
        .collect();
    assert_eq!(
        names,
        vec!["Mary's Place Family Center", "Downtown Emergency Service Center Clinic"]
    );
}

#[test]
fn test_browse_filters_intersect() {
    let catalog = sample();
    let filters = BrowseFilters {
        household_type: Some("Any".to_string()),
        keyword: Some("ukrainian".to_string()),
        ..Default::default()
    };

    let result = filters.apply(catalog.records());
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].id(), Some("Multi-Service Center Food Bank"));
}

#[test]
fn test_sample_facets() {
    let catalog = sample();

    let households = facet_values(catalog.records(), FacetField::HouseholdType);
    assert!(households.contains(&"Men".to_string()));
    assert!(!households.iter().any(|h| h.eq_ignore_ascii_case("unclear")));

    let regions = facet_values(catalog.records(), FacetField::SubRegion);
    assert_eq!(regions.first().map(String::as_str), Some("East King County - Bellevue"));
    assert_eq!(regions.len(), 3);
}
