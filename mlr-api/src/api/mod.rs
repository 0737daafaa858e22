//! HTTP API handlers for mlr-api
//!
//! One module per entity family; each exposes a `*_routes()` builder that
//! the crate root merges into the application router.

pub mod admin;
pub mod buildinfo;
pub mod collaborations;
pub mod contributors;
pub mod dashboard;
pub mod employees;
pub mod health;
pub mod persons;
pub mod record_labels;
pub mod songs;

pub use admin::admin_routes;
pub use buildinfo::buildinfo_routes;
pub use collaborations::collaboration_routes;
pub use contributors::contributor_routes;
pub use dashboard::dashboard_routes;
pub use employees::employee_routes;
pub use health::health_routes;
pub use persons::person_routes;
pub use record_labels::record_label_routes;
pub use songs::song_routes;
