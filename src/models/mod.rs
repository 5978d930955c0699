// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{ServiceRecord, NeedProfile, Gender, ChatMessage, Role};
pub use requests::{MatchRequest, BrowseQuery, ChatRequest};
pub use responses::{ResourcesResponse, FacetsResponse, ChatResponse, HealthResponse, ErrorResponse};
