//! Administrative database endpoints
//!
//! Mounted only when `server.enable_admin` is true. Every script runs as a
//! single gateway call, so a failing batch rolls back the whole script.

use axum::{extract::State, routing::post, Json, Router};
use mlr_common::db::procedures::admin::{DropAllTables, InitSchema, PopulateSampleData};
use serde::Serialize;
use tracing::info;

use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct AdminResponse {
    pub message: String,
}

impl AdminResponse {
    fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

/// POST /api/db/init
pub async fn init_database(State(state): State<AppState>) -> ApiResult<Json<AdminResponse>> {
    state.gateway.call(InitSchema).await?;
    info!("Schema initialized");
    Ok(AdminResponse::new("Database initialized successfully"))
}

/// POST /api/db/populate
pub async fn populate_database(State(state): State<AppState>) -> ApiResult<Json<AdminResponse>> {
    state.gateway.call(PopulateSampleData).await?;
    info!("Sample data loaded");
    Ok(AdminResponse::new("Database populated successfully"))
}

/// POST /api/db/drop_tables
pub async fn drop_tables(State(state): State<AppState>) -> ApiResult<Json<AdminResponse>> {
    state.gateway.call(DropAllTables).await?;
    info!("All tables and views dropped");
    Ok(AdminResponse::new("All tables dropped successfully"))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/api/db/init", post(init_database))
        .route("/api/db/populate", post(populate_database))
        .route("/api/db/drop_tables", post(drop_tables))
}
