//! Collaboration endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use mlr_common::api::types::{normalize_optional, Collaboration, CollaborationPayload};
use mlr_common::db::procedures::collaboration::{
    CreateCollaboration, DeleteCollaboration, GetCollaborationById, GetCollaborations,
    UpdateCollaboration,
};
use mlr_common::Gateway;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Filters for GET /api/collaborations
///
/// `start` / `end` are ISO dates bounding the collaboration period.
#[derive(Debug, Default, Deserialize)]
pub struct CollaborationQuery {
    pub name: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub song: Option<String>,
    pub labels: Option<String>,
    pub contributors: Option<String>,
}

fn not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("Collaboration {id} not found"))
}

async fn fetch(gateway: &Gateway, id: i64) -> ApiResult<Option<Collaboration>> {
    Ok(gateway.call(GetCollaborationById { id }).await?)
}

/// GET /api/collaborations
pub async fn list_collaborations(
    State(state): State<AppState>,
    Query(query): Query<CollaborationQuery>,
) -> ApiResult<Json<Vec<Collaboration>>> {
    let collaborations = state
        .gateway
        .call(GetCollaborations {
            name: normalize_optional(query.name),
            start: normalize_optional(query.start),
            end: normalize_optional(query.end),
            song: normalize_optional(query.song),
            labels: normalize_optional(query.labels),
            contributors: normalize_optional(query.contributors),
        })
        .await?;
    Ok(Json(collaborations))
}

/// GET /api/collaborations/:id
pub async fn get_collaboration(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Collaboration>> {
    fetch(&state.gateway, id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// POST /api/collaborations
pub async fn create_collaboration(
    State(state): State<AppState>,
    payload: Result<Json<CollaborationPayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Collaboration>)> {
    let Json(payload) = payload?;
    let input = payload.validate()?;

    let id = state.gateway.call(CreateCollaboration { input }).await?;
    let collaboration = fetch(&state.gateway, id)
        .await?
        .ok_or_else(|| ApiError::Internal(format!("Collaboration {id} missing after create")))?;
    Ok((StatusCode::CREATED, Json(collaboration)))
}

/// PUT /api/collaborations/:id
pub async fn update_collaboration(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<CollaborationPayload>, JsonRejection>,
) -> ApiResult<Json<Collaboration>> {
    let Json(payload) = payload?;
    let input = payload.validate()?;

    state.gateway.call(UpdateCollaboration { id, input }).await?;
    fetch(&state.gateway, id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// DELETE /api/collaborations/:id
pub async fn delete_collaboration(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.gateway.call(DeleteCollaboration { id }).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn collaboration_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/collaborations",
            get(list_collaborations).post(create_collaboration),
        )
        .route(
            "/api/collaborations/:id",
            get(get_collaboration)
                .put(update_collaboration)
                .delete(delete_collaboration),
        )
}
