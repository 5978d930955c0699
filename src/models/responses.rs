use serde::{Deserialize, Serialize};
use crate::models::domain::{ChatMessage, ServiceRecord};

/// Response for the match and browse endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcesResponse {
    pub resources: Vec<ServiceRecord>,
    pub total_results: usize,
    pub total_candidates: usize,
}

/// Distinct tag values for the directory's filter dropdowns
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetsResponse {
    pub program_types: Vec<String>,
    pub sub_regions: Vec<String>,
    pub household_types: Vec<String>,
}

/// Chat proxy reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message: ChatMessage,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub catalog_size: usize,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: details.into(),
        }
    }
}
