use crate::models::{Gender, ServiceRecord};

/// Split a multi-value catalog field into trimmed, lower-cased tags
pub fn normalize_tags(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Whether any tag of a multi-value field contains `needle`
///
/// A missing field never matches.
#[inline]
pub fn tags_contain(field: Option<&str>, needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    match field {
        Some(value) => normalize_tags(value).iter().any(|tag| tag.contains(&needle)),
        None => false,
    }
}

/// Whether any tag of a multi-value field equals `value` exactly
#[inline]
pub fn tags_include(field: Option<&str>, value: &str) -> bool {
    let value = value.trim().to_lowercase();
    match field {
        Some(raw) => normalize_tags(raw).iter().any(|tag| *tag == value),
        None => false,
    }
}

/// Yes/no catalog columns; anything other than "yes" is treated as no
#[inline]
pub fn is_yes(field: Option<&str>) -> bool {
    field
        .map(|value| value.trim().eq_ignore_ascii_case("yes"))
        .unwrap_or(false)
}

/// Case-insensitive substring test over a free-text field
#[inline]
pub fn text_contains(field: Option<&str>, needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    match field {
        Some(value) => value.to_lowercase().contains(&needle),
        None => false,
    }
}

/// Shelter or housing program that accepts the household
///
/// All three conditions must hold: program type, household gender, and
/// partners being allowed when the seeker is a couple.
pub fn matches_shelter(record: &ServiceRecord, gender: Gender, is_couple: bool) -> bool {
    let program_type = record.program_type.as_deref();
    if !(tags_contain(program_type, "shelter") || tags_contain(program_type, "housing")) {
        return false;
    }

    let household = record.household_type.as_deref();
    let accepts_household = gender == Gender::Any
        || tags_contain(household, gender.as_str())
        || tags_contain(household, "any");
    if !accepts_household {
        return false;
    }

    !is_couple || is_yes(record.partners_allowed.as_deref())
}

#[inline]
pub fn matches_food(record: &ServiceRecord) -> bool {
    tags_contain(record.program_type.as_deref(), "food")
}

#[inline]
pub fn matches_medical(record: &ServiceRecord) -> bool {
    tags_contain(record.program_type.as_deref(), "health")
}

#[inline]
pub fn matches_mental_health(record: &ServiceRecord) -> bool {
    is_yes(record.behavioral_health.as_deref())
}

#[inline]
pub fn matches_addiction(record: &ServiceRecord) -> bool {
    is_yes(record.substance_use_treatment.as_deref())
}

#[inline]
pub fn serves_disabilities(record: &ServiceRecord) -> bool {
    tags_contain(record.sub_population.as_deref(), "disabilities")
}

#[inline]
pub fn allows_pets(record: &ServiceRecord) -> bool {
    is_yes(record.pets_allowed.as_deref())
}

#[inline]
pub fn in_sub_region(record: &ServiceRecord, location: &str) -> bool {
    text_contains(record.sub_region.as_deref(), location)
}

#[inline]
pub fn speaks_language(record: &ServiceRecord, language: &str) -> bool {
    text_contains(record.languages.as_deref(), language)
}
