//! Database row types
//!
//! One struct per view/query shape, columns named exactly as the views
//! expose them. Dates arrive as ISO-8601 text and delimited lists as raw
//! comma-joined text; [`crate::db::mapper`] turns them into API records.

use sqlx::FromRow;

/// Row of `person` joined with its role records
#[derive(Debug, Clone, FromRow)]
pub struct PersonRow {
    pub nif: String,
    pub name: String,
    pub date_of_birth: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub contributor_id: Option<i64>,
    pub employee_id: Option<i64>,
}

/// Row of `vw_contributors`
#[derive(Debug, Clone, FromRow)]
pub struct ContributorRow {
    pub contributor_id: i64,
    pub nif: String,
    pub name: String,
    pub date_of_birth: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub record_label_name: Option<String>,
    pub roles: Option<String>,
}

/// Row of `vw_employees`
#[derive(Debug, Clone, FromRow)]
pub struct EmployeeRow {
    pub employee_id: i64,
    pub nif: String,
    pub name: String,
    pub date_of_birth: Option<String>,
    pub job_title: String,
    pub department: Option<String>,
    pub salary: f64,
    pub hire_date: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub record_label_id: i64,
    pub record_label_name: Option<String>,
}

/// Row of `vw_record_labels`
#[derive(Debug, Clone, FromRow)]
pub struct RecordLabelRow {
    pub record_label_id: i64,
    pub name: String,
    pub location: Option<String>,
    pub website: Option<String>,
    pub email: String,
    pub phone_number: Option<String>,
}

/// Row of `vw_songs`
#[derive(Debug, Clone, FromRow)]
pub struct SongRow {
    pub song_id: i64,
    pub title: String,
    pub duration: i64,
    pub release_date: Option<String>,
    pub genres: Option<String>,
    pub contributors: Option<String>,
    pub collaboration_name: Option<String>,
}

/// Row of `vw_collaborations`
#[derive(Debug, Clone, FromRow)]
pub struct CollaborationRow {
    pub collaboration_id: i64,
    pub collaboration_name: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub description: Option<String>,
    pub song_id: Option<i64>,
    pub song_title: Option<String>,
    pub record_labels: Option<String>,
    pub contributors: Option<String>,
}

/// Row of `vw_dashboard_counts`
#[derive(Debug, Clone, Copy, FromRow)]
pub struct DashboardCountsRow {
    pub record_label_count: i64,
    pub employee_count: i64,
    pub song_count: i64,
    pub contributor_count: i64,
    pub collaboration_count: i64,
}

#[derive(Debug, Clone, Copy, FromRow)]
pub struct ContributorDependencyRow {
    pub collaboration_count: i64,
    pub song_count: i64,
}

#[derive(Debug, Clone, Copy, FromRow)]
pub struct SongDependencyRow {
    pub collaboration_count: i64,
    pub contributor_count: i64,
}

#[derive(Debug, Clone, Copy, FromRow)]
pub struct RecordLabelDependencyRow {
    pub employee_count: i64,
    pub collaboration_count: i64,
}
