//! Dependency/Cascade Guard for record-label deletion

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mlr_common::api::types::RecordLabelDependencies;
use mlr_common::db::procedures::record_label::{
    CheckRecordLabelDependencies, DeleteRecordLabel, DeleteRecordLabelCascade,
};
use mlr_common::{Gateway, StoreError};
use serde::Serialize;
use tracing::info;

use crate::error::ApiResult;

/// 409 body for a delete blocked by dependent rows
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DependencyConflict {
    pub message: String,
    pub employee_count: i64,
    pub collaboration_count: i64,
}

impl DependencyConflict {
    fn for_label(id: i64, deps: RecordLabelDependencies) -> Self {
        Self {
            message: format!(
                "Record label {id} has {} employee(s) and {} collaboration(s). \
                 Delete with cascade=true to remove them as well.",
                deps.employee_count, deps.collaboration_count
            ),
            employee_count: deps.employee_count,
            collaboration_count: deps.collaboration_count,
        }
    }
}

impl IntoResponse for DependencyConflict {
    fn into_response(self) -> Response {
        (StatusCode::CONFLICT, Json(self)).into_response()
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Blocked(DependencyConflict),
}

/// Delete a record label, refusing while dependents exist unless `cascade`
pub async fn delete_record_label(
    gateway: &Gateway,
    id: i64,
    cascade: bool,
) -> ApiResult<DeleteOutcome> {
    if cascade {
        gateway.call(DeleteRecordLabelCascade { id }).await?;
        info!(record_label_id = id, "Record label deleted with dependents");
        return Ok(DeleteOutcome::Deleted);
    }

    let deps = gateway.call(CheckRecordLabelDependencies { id }).await?;
    if !deps.is_clear() {
        info!(
            record_label_id = id,
            employees = deps.employee_count,
            collaborations = deps.collaboration_count,
            "Record label delete blocked by dependents"
        );
        return Ok(DeleteOutcome::Blocked(DependencyConflict::for_label(id, deps)));
    }

    match gateway.call(DeleteRecordLabel { id }).await {
        Ok(()) => {
            info!(record_label_id = id, "Record label deleted");
            Ok(DeleteOutcome::Deleted)
        }
        // A dependent was added between the check and the delete
        Err(StoreError::Integrity(_)) => {
            let deps = gateway.call(CheckRecordLabelDependencies { id }).await?;
            Ok(DeleteOutcome::Blocked(DependencyConflict::for_label(id, deps)))
        }
        Err(err) => Err(err.into()),
    }
}
