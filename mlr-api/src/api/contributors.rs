//! Contributor endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use mlr_common::api::types::{
    normalize_optional, Contributor, ContributorDependencies, ContributorPayload,
};
use mlr_common::db::procedures::contributor::{
    DeleteContributor, GetContributorById, GetContributorDependencies, GetContributors,
    UpdateContributor,
};
use mlr_common::Gateway;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::reconcile::{reconcile, ContributorRole, PersonModeQuery, Reconciled};
use crate::AppState;

/// Filters for GET /api/contributors (substring matches)
#[derive(Debug, Default, Deserialize)]
pub struct ContributorQuery {
    pub name: Option<String>,
    pub role: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

async fn fetch(gateway: &Gateway, id: i64) -> ApiResult<Option<Contributor>> {
    Ok(gateway.call(GetContributorById { id }).await?)
}

/// GET /api/contributors
pub async fn list_contributors(
    State(state): State<AppState>,
    Query(query): Query<ContributorQuery>,
) -> ApiResult<Json<Vec<Contributor>>> {
    let contributors = state
        .gateway
        .call(GetContributors {
            name: normalize_optional(query.name),
            role: normalize_optional(query.role),
            email: normalize_optional(query.email),
            phone: normalize_optional(query.phone),
        })
        .await?;
    Ok(Json(contributors))
}

/// GET /api/contributors/:id
pub async fn get_contributor(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Contributor>> {
    fetch(&state.gateway, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Contributor {id} not found")))
}

/// POST /api/contributors?useOldPerson=&overwritePerson=
pub async fn create_contributor(
    State(state): State<AppState>,
    Query(mode): Query<PersonModeQuery>,
    payload: Result<Json<ContributorPayload>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(payload) = payload?;
    let (person, fields) = payload.validate(true)?;

    match reconcile::<ContributorRole>(&state.gateway, person, fields, mode.into()).await? {
        Reconciled::Conflict(conflict) => Ok(conflict.into_response()),
        Reconciled::Created { role_id, path } => {
            let contributor = fetch(&state.gateway, role_id).await?.ok_or_else(|| {
                ApiError::Internal(format!("Contributor {role_id} missing after create"))
            })?;
            Ok((path.status(), Json(contributor)).into_response())
        }
    }
}

/// PUT /api/contributors/:id
pub async fn update_contributor(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<ContributorPayload>, JsonRejection>,
) -> ApiResult<Json<Contributor>> {
    let Json(payload) = payload?;
    let (person, fields) = payload.validate(false)?;

    state
        .gateway
        .call(UpdateContributor { id, person, fields })
        .await?;

    fetch(&state.gateway, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Contributor {id} not found")))
}

/// DELETE /api/contributors/:id
pub async fn delete_contributor(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.gateway.call(DeleteContributor { id }).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/contributors/:id/dependencies
pub async fn contributor_dependencies(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ContributorDependencies>> {
    Ok(Json(
        state.gateway.call(GetContributorDependencies { id }).await?,
    ))
}

pub fn contributor_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/contributors",
            get(list_contributors).post(create_contributor),
        )
        .route(
            "/api/contributors/:id",
            get(get_contributor)
                .put(update_contributor)
                .delete(delete_contributor),
        )
        .route(
            "/api/contributors/:id/dependencies",
            get(contributor_dependencies),
        )
}
