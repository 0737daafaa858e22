//! mlr-api library - REST façade over the music-label store
//!
//! Handlers translate HTTP requests into gateway procedure calls and map the
//! typed results back to JSON.

use std::sync::Arc;

use axum::Router;
use mlr_common::config::ServiceConfig;
use mlr_common::Gateway;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod cli;
pub mod error;
pub mod guard;
pub mod reconcile;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Store entry point (owns the connection pool)
    pub gateway: Gateway,
    /// Resolved service configuration
    pub config: Arc<ServiceConfig>,
}

impl AppState {
    pub fn new(gateway: Gateway, config: ServiceConfig) -> Self {
        Self {
            gateway,
            config: Arc::new(config),
        }
    }
}

/// Build application router
///
/// The `/api/db` administrative routes are mounted only when
/// `server.enable_admin` is set.
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        .merge(api::contributor_routes())
        .merge(api::employee_routes())
        .merge(api::person_routes())
        .merge(api::record_label_routes())
        .merge(api::song_routes())
        .merge(api::collaboration_routes())
        .merge(api::dashboard_routes())
        .merge(api::health_routes())
        .merge(api::buildinfo_routes());

    if state.config.enable_admin {
        router = router.merge(api::admin_routes());
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
