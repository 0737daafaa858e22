//! Employee endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use mlr_common::api::types::{normalize_optional, Employee, EmployeePayload};
use mlr_common::db::procedures::employee::{
    DeleteEmployee, GetEmployeeById, GetEmployees, UpdateEmployee,
};
use mlr_common::Gateway;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::reconcile::{reconcile, EmployeeRole, PersonModeQuery, Reconciled};
use crate::AppState;

/// Filters for GET /api/employees
#[derive(Debug, Default, Deserialize)]
pub struct EmployeeQuery {
    pub nif: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "jobtitle")]
    pub job_title: Option<String>,
    pub department: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Record label name substring
    pub label: Option<String>,
}

fn not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("Employee {id} not found"))
}

async fn fetch(gateway: &Gateway, id: i64) -> ApiResult<Option<Employee>> {
    Ok(gateway.call(GetEmployeeById { id }).await?)
}

/// GET /api/employees
pub async fn list_employees(
    State(state): State<AppState>,
    Query(query): Query<EmployeeQuery>,
) -> ApiResult<Json<Vec<Employee>>> {
    let employees = state
        .gateway
        .call(GetEmployees {
            nif: normalize_optional(query.nif),
            name: normalize_optional(query.name),
            job_title: normalize_optional(query.job_title),
            department: normalize_optional(query.department),
            email: normalize_optional(query.email),
            phone: normalize_optional(query.phone),
            label: normalize_optional(query.label),
        })
        .await?;
    Ok(Json(employees))
}

/// GET /api/employees/:id
pub async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Employee>> {
    fetch(&state.gateway, id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// POST /api/employees?useOldPerson=&overwritePerson=
pub async fn create_employee(
    State(state): State<AppState>,
    Query(mode): Query<PersonModeQuery>,
    payload: Result<Json<EmployeePayload>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(payload) = payload?;
    let (person, fields) = payload.validate(true)?;

    match reconcile::<EmployeeRole>(&state.gateway, person, fields, mode.into()).await? {
        Reconciled::Conflict(conflict) => Ok(conflict.into_response()),
        Reconciled::Created { role_id, path } => {
            let employee = fetch(&state.gateway, role_id).await?.ok_or_else(|| {
                ApiError::Internal(format!("Employee {role_id} missing after create"))
            })?;
            Ok((path.status(), Json(employee)).into_response())
        }
    }
}

/// PUT /api/employees/:id
pub async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<EmployeePayload>, JsonRejection>,
) -> ApiResult<Json<Employee>> {
    let Json(payload) = payload?;
    let (person, fields) = payload.validate(false)?;

    state
        .gateway
        .call(UpdateEmployee { id, person, fields })
        .await?;

    fetch(&state.gateway, id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// DELETE /api/employees/:id
pub async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.gateway.call(DeleteEmployee { id }).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn employee_routes() -> Router<AppState> {
    Router::new()
        .route("/api/employees", get(list_employees).post(create_employee))
        .route(
            "/api/employees/:id",
            get(get_employee).put(update_employee).delete(delete_employee),
        )
}
