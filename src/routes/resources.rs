use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::core::{facet_values, merge_favorites, BrowseFilters, FacetField};
use crate::models::{BrowseQuery, ErrorResponse, FacetsResponse, HealthResponse, MatchRequest, ResourcesResponse};
use crate::routes::AppState;

/// Configure all resource-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/resources", web::get().to(browse_resources))
        .route("/resources/match", web::post().to(match_resources))
        .route("/resources/facets", web::get().to(resource_facets))
        .route("/resources/{name}", web::get().to(get_resource));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let healthy = !state.catalog.is_empty() && state.llm.is_configured();
    let status = if healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        catalog_size: state.catalog.len(),
    })
}

/// Match resources against a need profile
///
/// POST /api/v1/resources/match
///
/// Request body:
/// ```json
/// {
///   "needs_shelter": true,
///   "needs_food": false,
///   "gender": "any|men|women",
///   "preferred_location": "seattle",
///   "language_needs": "",
///   "favorites": ["Program Name"],
///   "limit": 20
/// }
/// ```
async fn match_resources(
    state: web::Data<AppState>,
    req: web::Json<MatchRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for match request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse::new(
            "Validation failed",
            errors.to_string(),
        ));
    }

    let req = req.into_inner();
    let matcher = state.matcher.with_limit(req.limit.map(usize::from));
    let result = matcher.find_matches(&req.profile, state.catalog.records());

    let favorites = state.catalog.resolve(req.favorites.iter().map(String::as_str));
    let resources = merge_favorites(&result.resources, &favorites);

    tracing::info!(
        "Returning {} resources ({} matched, {} favorites) from {} candidates",
        resources.len(),
        result.resources.len(),
        favorites.len(),
        result.total_candidates
    );

    HttpResponse::Ok().json(ResourcesResponse {
        total_results: resources.len(),
        resources,
        total_candidates: result.total_candidates,
    })
}

/// Directory listing with dropdown and keyword filters
///
/// GET /api/v1/resources?programType=&subRegion=&householdType=&keyword=&favorites=
async fn browse_resources(
    state: web::Data<AppState>,
    query: web::Query<BrowseQuery>,
) -> impl Responder {
    let filters = BrowseFilters::from(&*query);
    let filtered = filters.apply(state.catalog.records());

    let favorite_ids = query.favorite_ids();
    let favorites = state.catalog.resolve(favorite_ids.iter().map(String::as_str));
    let resources = merge_favorites(&filtered, &favorites);

    tracing::debug!("Browse {:?} returned {} resources", filters, resources.len());

    HttpResponse::Ok().json(ResourcesResponse {
        total_results: resources.len(),
        resources,
        total_candidates: state.catalog.len(),
    })
}

/// Distinct values for the listing's dropdowns
async fn resource_facets(state: web::Data<AppState>) -> impl Responder {
    let records = state.catalog.records();

    HttpResponse::Ok().json(FacetsResponse {
        program_types: facet_values(records, FacetField::ProgramType),
        sub_regions: facet_values(records, FacetField::SubRegion),
        household_types: facet_values(records, FacetField::HouseholdType),
    })
}

/// Full detail for one program
async fn get_resource(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let name = path.into_inner();

    match state.catalog.get(&name) {
        Some(record) => HttpResponse::Ok().json(record),
        None => HttpResponse::NotFound().json(ErrorResponse::new(
            "Resource not found",
            format!("No program named {}", name),
        )),
    }
}
