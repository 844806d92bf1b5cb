//! Story element handlers

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use quill_core::{ElementKind, StoryElement};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Query parameters for element listing
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListElementsQuery {
    /// Filter by kind: character, place, event or item
    pub kind: Option<String>,
}

/// Stored element
#[derive(Debug, Serialize, ToSchema)]
pub struct ElementInfo {
    pub id: Uuid,
    pub novel_id: Uuid,
    #[schema(example = "place")]
    pub kind: String,
    #[schema(example = "Westmarch")]
    pub name: String,
    pub description: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<StoryElement> for ElementInfo {
    fn from(element: StoryElement) -> Self {
        Self {
            id: element.id,
            novel_id: element.novel_id,
            kind: element.kind.to_string(),
            name: element.name,
            description: element.description,
            created_at: element.created_at.to_rfc3339(),
            updated_at: element.updated_at.to_rfc3339(),
        }
    }
}

/// Element list response
#[derive(Debug, Serialize, ToSchema)]
pub struct ElementListResponse {
    pub elements: Vec<ElementInfo>,
    pub total: usize,
}

/// List a novel's stored elements
#[utoipa::path(
    get,
    path = "/api/v1/novels/{novel_id}/elements",
    tag = "elements",
    params(
        ("novel_id" = Uuid, Path, description = "Novel UUID"),
        ListElementsQuery
    ),
    responses(
        (status = 200, description = "Element list", body = ElementListResponse),
        (status = 400, description = "Unknown kind", body = crate::error::ApiError)
    )
)]
pub async fn list_elements(
    State(state): State<Arc<AppState>>,
    Path(novel_id): Path<Uuid>,
    Query(params): Query<ListElementsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let kind = params
        .kind
        .as_deref()
        .map(str::parse::<ElementKind>)
        .transpose()?;

    let elements: Vec<ElementInfo> = state
        .store
        .list_elements(novel_id, kind)
        .await?
        .into_iter()
        .map(ElementInfo::from)
        .collect();

    Ok(Json(ElementListResponse {
        total: elements.len(),
        elements,
    }))
}

/// Delete a stored element
#[utoipa::path(
    delete,
    path = "/api/v1/elements/{id}",
    tag = "elements",
    params(
        ("id" = Uuid, Path, description = "Element UUID")
    ),
    responses(
        (status = 204, description = "Element deleted"),
        (status = 404, description = "Element not found", body = crate::error::ApiError)
    )
)]
pub async fn delete_element(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.store.delete_element(id).await?;
    tracing::info!(%id, "Element deleted");
    Ok(StatusCode::NO_CONTENT)
}
