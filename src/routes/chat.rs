use actix_web::{http::Method, web, HttpResponse, Responder};
use validator::Validate;
use crate::models::{ChatMessage, ChatRequest, ChatResponse, ErrorResponse, Role};
use crate::routes::AppState;

/// Configure the chat proxy endpoint
///
/// POST forwards to the completion API, OPTIONS answers preflight, and any
/// other method is rejected with 405.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/chat")
            .route(web::post().to(chat))
            .route(web::method(Method::OPTIONS).to(preflight))
            .default_service(web::to(method_not_allowed)),
    );
}

/// Chat proxy endpoint
///
/// POST /api/chat
///
/// Request body:
/// ```json
/// { "messages": [{ "role": "user", "content": "I need shelter" }] }
/// ```
///
/// Response body:
/// ```json
/// { "message": { "role": "assistant", "content": "..." } }
/// ```
async fn chat(
    state: web::Data<AppState>,
    req: web::Json<ChatRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse::new(
            "Invalid request",
            errors.to_string(),
        ));
    }

    let request_id = uuid::Uuid::new_v4();
    let mut messages = req.into_inner().messages;

    // Clients that send no system message get the catalog-grounded one
    if !messages.iter().any(|m| m.role == Role::System) {
        messages.insert(0, ChatMessage::system(&*state.system_prompt));
    }

    tracing::info!(%request_id, "Forwarding {} messages to {}", messages.len(), state.llm.model());

    match state.llm.complete(&messages).await {
        Ok(message) => {
            tracing::debug!(%request_id, "Completion returned {} characters", message.content.len());
            HttpResponse::Ok().json(ChatResponse { message })
        }
        Err(e) => {
            tracing::error!(%request_id, "Completion API error: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::new(
                "Failed to fetch from completion API",
                e.to_string(),
            ))
        }
    }
}

async fn preflight() -> impl Responder {
    HttpResponse::Ok().finish()
}

async fn method_not_allowed() -> impl Responder {
    HttpResponse::MethodNotAllowed().json(ErrorResponse::new(
        "Method not allowed",
        "Only POST is supported on this endpoint",
    ))
}
