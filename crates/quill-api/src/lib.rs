//! Quill API - HTTP server for chapter analysis
//!
//! Exposes the text analyzer and the story element store over JSON.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::handlers::{analyze, elements, health};
use crate::state::AppState;

/// OpenAPI document
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Quill API",
        description = "Extracts characters, places, events and items from fiction"
    ),
    paths(
        health::health_check,
        health::readiness_check,
        health::metrics,
        analyze::analyze_handler,
        analyze::import_handler,
        elements::list_elements,
        elements::delete_element,
    ),
    components(schemas(
        error::ApiError,
        health::HealthResponse,
        health::BuildInfo,
        health::ReadinessResponse,
        health::ReadinessChecks,
        health::MetricsResponse,
        analyze::AnalyzeRequest,
        analyze::ImportRequest,
        elements::ElementInfo,
        elements::ElementListResponse,
    )),
    tags(
        (name = "health", description = "Liveness, readiness and counters"),
        (name = "analysis", description = "Chapter text analysis"),
        (name = "elements", description = "Stored story elements")
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the CORS layer from server config
fn cors_layer(state: &AppState) -> Option<CorsLayer> {
    let server = &state.config.server;
    if !server.cors_enabled {
        return None;
    }

    let origins: Vec<HeaderValue> = server
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    Some(if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    })
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(health::metrics))
        .route("/api-docs/openapi.json", get(openapi_json))
        .nest("/api/v1", routes::api_routes())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::request_tracking_middleware,
        ))
        .layer(DefaultBodyLimit::max(state.config.server.max_body_size))
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = cors_layer(&state) {
        router = router.layer(cors);
    }

    router.with_state(state)
}

/// Router over an in-memory store with default config
pub fn create_router_for_testing() -> Router {
    create_router(Arc::new(AppState::default()))
}
