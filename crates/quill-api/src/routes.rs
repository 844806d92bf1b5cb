//! API route definitions

use crate::handlers::{analyze, elements};
use crate::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

/// Create API v1 routes
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Analysis
        .route("/analyze", post(analyze::analyze_handler))
        // Novel elements
        .route("/novels/:novel_id/import", post(analyze::import_handler))
        .route("/novels/:novel_id/elements", get(elements::list_elements))
        .route("/elements/:id", delete(elements::delete_element))
}
