//! Dashboard aggregate counts

use axum::{extract::State, routing::get, Json, Router};
use mlr_common::api::types::DashboardCounts;
use mlr_common::db::procedures::dashboard::GetDashboardCounts;

use crate::error::ApiResult;
use crate::AppState;

/// GET /api/dashboard/counts
pub async fn dashboard_counts(State(state): State<AppState>) -> ApiResult<Json<DashboardCounts>> {
    Ok(Json(state.gateway.call(GetDashboardCounts).await?))
}

pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/api/dashboard/counts", get(dashboard_counts))
}
