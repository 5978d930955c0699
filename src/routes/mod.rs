// Route exports
pub mod chat;
pub mod resources;

use actix_cors::Cors;
use actix_web::{error, http::{header, StatusCode}, web, HttpResponse};
use crate::core::Matcher;
use crate::services::{Catalog, CompletionClient};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub llm: Arc<CompletionClient>,
    pub matcher: Matcher,
    /// Built once from the catalog excerpt at startup
    pub system_prompt: Arc<str>,
}

/// JSON error body for extractor failures
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub details: String,
    #[serde(skip)]
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.details)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        details: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        details: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

/// Cross-origin policy: any origin may POST JSON
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
        .max_age(3600)
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
        .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
        .configure(chat::configure)
        .service(
            web::scope("/api/v1")
                .configure(resources::configure),
        );
}
