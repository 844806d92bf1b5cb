//! Text analysis and import handlers

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use quill_analyzer::{AnalysisResult, ImportReport, ImportSelection};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

/// Analyze request
#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    /// Chapter text; null or missing analyzes as empty
    #[schema(example = "\"Hello there,\" said Mary. Mary walked to the door.")]
    #[serde(default)]
    pub content: Option<String>,
}

/// Import request
#[derive(Debug, Deserialize, ToSchema)]
pub struct ImportRequest {
    /// Chapter text to analyze
    #[serde(default)]
    pub content: Option<String>,

    /// Which extracted elements to keep; everything when omitted
    #[serde(default)]
    #[schema(value_type = Object)]
    pub selection: ImportSelection,
}

/// Import response
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub analysis: AnalysisResult,
    pub report: ImportReport,
}

/// Extract characters, places, events and items from text
#[utoipa::path(
    post,
    path = "/api/v1/analyze",
    tag = "analysis",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Extracted story elements"),
        (status = 400, description = "Content too long", body = crate::error::ApiError)
    )
)]
pub async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let result = state.analyze(request.content.as_deref())?;

    tracing::info!(
        characters = result.characters.len(),
        places = result.places.len(),
        events = result.events.len(),
        items = result.items.len(),
        "Analysis completed"
    );

    Ok(Json(result))
}

/// Analyze text and store the selected elements for a novel
#[utoipa::path(
    post,
    path = "/api/v1/novels/{novel_id}/import",
    tag = "elements",
    params(
        ("novel_id" = Uuid, Path, description = "Novel UUID")
    ),
    request_body = ImportRequest,
    responses(
        (status = 200, description = "Analysis and import report"),
        (status = 400, description = "Content too long", body = crate::error::ApiError)
    )
)]
pub async fn import_handler(
    State(state): State<Arc<AppState>>,
    Path(novel_id): Path<Uuid>,
    Json(request): Json<ImportRequest>,
) -> Result<impl IntoResponse, AppError> {
    let analysis = state.analyze(request.content.as_deref())?;
    let report = state
        .importer()
        .import(novel_id, &analysis, &request.selection)
        .await;

    Ok(Json(ImportResponse { analysis, report }))
}
