//! Person endpoints
//!
//! The only place a NIF can change: `NewNIF` renames the person and the
//! rename cascades to its contributor and employee rows.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::get,
    Json, Router,
};
use mlr_common::api::types::{PersonSnapshot, PersonUpdatePayload};
use mlr_common::db::procedures::person::{GetPersonByNif, UpdatePerson};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /api/persons/:nif
pub async fn get_person(
    State(state): State<AppState>,
    Path(nif): Path<String>,
) -> ApiResult<Json<PersonSnapshot>> {
    state
        .gateway
        .call(GetPersonByNif { nif: nif.clone() })
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Person with NIF {nif} not found")))
}

/// PUT /api/persons/:nif
pub async fn update_person(
    State(state): State<AppState>,
    Path(nif): Path<String>,
    payload: Result<Json<PersonUpdatePayload>, JsonRejection>,
) -> ApiResult<Json<PersonSnapshot>> {
    let Json(changes) = payload?;
    if changes.is_empty() {
        return Err(ApiError::Validation(
            "At least one of Name, DateOfBirth, Email, PhoneNumber, NewNIF is required"
                .to_string(),
        ));
    }

    let final_nif = state
        .gateway
        .call(UpdatePerson {
            nif: nif.clone(),
            changes,
        })
        .await?;
    if final_nif != nif {
        info!(nif = %nif, new_nif = %final_nif, "Person renamed");
    }

    state
        .gateway
        .call(GetPersonByNif {
            nif: final_nif.clone(),
        })
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::Internal(format!("Person {final_nif} missing after update")))
}

pub fn person_routes() -> Router<AppState> {
    Router::new().route("/api/persons/:nif", get(get_person).put(update_person))
}
