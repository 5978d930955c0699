use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

/// A single program listing from the resource catalog
///
/// Every field is optional: the catalog is a spreadsheet export and rows are
/// frequently incomplete. A missing field means "unknown", and filters that
/// test it treat the record as not matching.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceRecord {
    #[serde(rename = "ProgramName", default)]
    pub program_name: Option<String>,
    #[serde(rename = "Service Provider Organization", default)]
    pub provider: Option<String>,
    #[serde(rename = "Sub-Region", default)]
    pub sub_region: Option<String>,
    #[serde(rename = "Jurisdiction/CoS Council District", default)]
    pub district: Option<String>,
    #[serde(rename = "Type of Program", default)]
    pub program_type: Option<String>,
    #[serde(rename = "Household type", default)]
    pub household_type: Option<String>,
    #[serde(rename = "Sub-population type", default)]
    pub sub_population: Option<String>,
    #[serde(rename = "Funded by KCRHA", default)]
    pub funded_by_kcrha: Option<String>,
    #[serde(rename = "Public Funders", default)]
    pub public_funders: Option<String>,
    #[serde(rename = "HMIS Participating", default)]
    pub hmis_participating: Option<String>,
    #[serde(rename = "HMIS Program ID", default)]
    pub hmis_program_id: Option<String>,
    #[serde(rename = "Pets Allowed", default)]
    pub pets_allowed: Option<String>,
    #[serde(rename = "Partners Allowed", default)]
    pub partners_allowed: Option<String>,
    #[serde(rename = "Substance Use Disorder Treatment", default)]
    pub substance_use_treatment: Option<String>,
    #[serde(rename = "Behavioral Health Supports", default)]
    pub behavioral_health: Option<String>,
    #[serde(rename = "Health Care", default)]
    pub health_care: Option<String>,
    #[serde(rename = "Case Management", default)]
    pub case_management: Option<String>,
    #[serde(rename = "Housing Navigation", default)]
    pub housing_navigation: Option<String>,
    #[serde(rename = "Food/Meals", default)]
    pub food_meals: Option<String>,
    #[serde(rename = "Hygiene", default)]
    pub hygiene: Option<String>,
    #[serde(rename = "Storage", default)]
    pub storage: Option<String>,
    #[serde(rename = "Unit Type", default)]
    pub unit_type: Option<String>,
    #[serde(rename = "Length of Stay", default)]
    pub length_of_stay: Option<String>,
    #[serde(rename = "Referrals", default)]
    pub referrals: Option<String>,
    #[serde(rename = "languages", default)]
    pub languages: Option<String>,
    #[serde(rename = "hours", default)]
    pub hours: Option<String>,
    #[serde(rename = "requirements", default)]
    pub requirements: Option<String>,
    #[serde(rename = "Entry Last Verified", default)]
    pub last_verified: Option<String>,
    #[serde(rename = "Last Modified", default)]
    pub last_modified: Option<String>,
    #[serde(
        rename = "Total Bed Inventory",
        default,
        deserialize_with = "deserialize_loose_string"
    )]
    pub bed_inventory: Option<String>,
}

impl ServiceRecord {
    /// Identifier used for favorites and lookups
    pub fn id(&self) -> Option<&str> {
        self.program_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Bed inventory as a number, when the catalog carries a usable value
    pub fn bed_count(&self) -> Option<u32> {
        self.bed_inventory.as_deref()?.trim().parse().ok()
    }

    /// Date the entry was last verified
    ///
    /// Accepts RFC 3339 timestamps and plain `YYYY-MM-DD` dates.
    pub fn last_verified_date(&self) -> Option<NaiveDate> {
        let raw = self.last_verified.as_deref()?.trim();
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.date_naive())
            .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
            .ok()
    }

    /// All populated text fields, used by keyword search
    pub fn text_fields(&self) -> impl Iterator<Item = &str> {
        [
            &self.program_name,
            &self.provider,
            &self.sub_region,
            &self.district,
            &self.program_type,
            &self.household_type,
            &self.sub_population,
            &self.funded_by_kcrha,
            &self.public_funders,
            &self.hmis_participating,
            &self.hmis_program_id,
            &self.pets_allowed,
            &self.partners_allowed,
            &self.substance_use_treatment,
            &self.behavioral_health,
            &self.health_care,
            &self.case_management,
            &self.housing_navigation,
            &self.food_meals,
            &self.hygiene,
            &self.storage,
            &self.unit_type,
            &self.length_of_stay,
            &self.referrals,
            &self.languages,
            &self.hours,
            &self.requirements,
            &self.last_verified,
            &self.last_modified,
            &self.bed_inventory,
        ]
        .into_iter()
        .filter_map(|field| field.as_deref())
    }
}

/// Spreadsheet exports mix numbers and strings in the same column
fn deserialize_loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Household gender a shelter seeker is looking for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Any,
    Men,
    Women,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Any => "any",
            Gender::Men => "men",
            Gender::Women => "women",
        }
    }
}

/// A user's declared needs and preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeedProfile {
    pub needs_shelter: bool,
    pub needs_food: bool,
    pub needs_medical_help: bool,
    pub needs_mental_health: bool,
    pub needs_addiction: bool,
    pub has_pet: bool,
    pub has_disability: bool,
    pub is_couple: bool,
    /// Collected by the questionnaire but not used as a filter
    pub has_children: bool,
    pub gender: Gender,
    pub preferred_location: String,
    pub language_needs: String,
}

impl NeedProfile {
    /// True when at least one additive need category is selected
    pub fn has_active_category(&self) -> bool {
        self.needs_shelter
            || self.needs_food
            || self.needs_medical_help
            || self.needs_mental_health
            || self.needs_addiction
    }
}

/// Role of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single chat message exchanged with the completion API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}
