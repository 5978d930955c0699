use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::{ChatMessage, NeedProfile};

/// Request to match resources against a need profile
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct MatchRequest {
    #[serde(flatten)]
    pub profile: NeedProfile,
    /// Program names the client has pinned; merged after filtering
    #[serde(default)]
    #[validate(length(max = 500))]
    pub favorites: Vec<String>,
    #[serde(default)]
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<u16>,
}

/// Query string for the directory listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseQuery {
    pub program_type: Option<String>,
    pub sub_region: Option<String>,
    pub household_type: Option<String>,
    pub keyword: Option<String>,
    /// Comma-separated program names
    pub favorites: Option<String>,
}

impl BrowseQuery {
    pub fn favorite_ids(&self) -> Vec<String> {
        self.favorites
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Request to the chat proxy
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1))]
    pub messages: Vec<ChatMessage>,
}
