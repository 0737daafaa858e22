//! Record label endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use mlr_common::api::types::{
    normalize_optional, RecordLabel, RecordLabelDependencies, RecordLabelPayload,
};
use mlr_common::db::procedures::record_label::{
    CheckRecordLabelDependencies, CreateRecordLabel, GetRecordLabelById, GetRecordLabels,
    UpdateRecordLabel,
};
use mlr_common::Gateway;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::guard::{delete_record_label, DeleteOutcome};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RecordLabelQuery {
    pub name: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    pub cascade: Option<String>,
}

impl DeleteQuery {
    fn cascade(&self) -> bool {
        self.cascade
            .as_deref()
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    }
}

fn not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("Record label {id} not found"))
}

async fn fetch(gateway: &Gateway, id: i64) -> ApiResult<Option<RecordLabel>> {
    Ok(gateway.call(GetRecordLabelById { id }).await?)
}

/// GET /api/record_labels
pub async fn list_record_labels(
    State(state): State<AppState>,
    Query(query): Query<RecordLabelQuery>,
) -> ApiResult<Json<Vec<RecordLabel>>> {
    let labels = state
        .gateway
        .call(GetRecordLabels {
            name: normalize_optional(query.name),
            location: normalize_optional(query.location),
            website: normalize_optional(query.website),
            email: normalize_optional(query.email),
            phone: normalize_optional(query.phone),
        })
        .await?;
    Ok(Json(labels))
}

/// GET /api/record_labels/:id
pub async fn get_record_label(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<RecordLabel>> {
    fetch(&state.gateway, id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// POST /api/record_labels
pub async fn create_record_label(
    State(state): State<AppState>,
    payload: Result<Json<RecordLabelPayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RecordLabel>)> {
    let Json(payload) = payload?;
    let input = payload.validate()?;

    let id = state.gateway.call(CreateRecordLabel { input }).await?;
    let label = fetch(&state.gateway, id)
        .await?
        .ok_or_else(|| ApiError::Internal(format!("Record label {id} missing after create")))?;
    Ok((StatusCode::CREATED, Json(label)))
}

/// PUT /api/record_labels/:id
pub async fn update_record_label(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<RecordLabelPayload>, JsonRejection>,
) -> ApiResult<Json<RecordLabel>> {
    let Json(payload) = payload?;
    let input = payload.validate()?;

    state.gateway.call(UpdateRecordLabel { id, input }).await?;
    fetch(&state.gateway, id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// DELETE /api/record_labels/:id?cascade=
///
/// 204 when deleted, 409 with dependent counts when blocked.
pub async fn remove_record_label(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<DeleteQuery>,
) -> ApiResult<Response> {
    match delete_record_label(&state.gateway, id, query.cascade()).await? {
        DeleteOutcome::Deleted => Ok(StatusCode::NO_CONTENT.into_response()),
        DeleteOutcome::Blocked(conflict) => Ok(conflict.into_response()),
    }
}

/// GET /api/record_labels/:id/dependencies
pub async fn record_label_dependencies(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<RecordLabelDependencies>> {
    Ok(Json(
        state
            .gateway
            .call(CheckRecordLabelDependencies { id })
            .await?,
    ))
}

pub fn record_label_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/record_labels",
            get(list_record_labels).post(create_record_label),
        )
        .route(
            "/api/record_labels/:id",
            get(get_record_label)
                .put(update_record_label)
                .delete(remove_record_label),
        )
        .route(
            "/api/record_labels/:id/dependencies",
            get(record_label_dependencies),
        )
}
