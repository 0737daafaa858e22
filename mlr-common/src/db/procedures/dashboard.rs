//! Dashboard aggregate counts

use sqlx::SqliteConnection;

use crate::api::types::DashboardCounts;
use crate::db::gateway::{Procedure, StoreResult};
use crate::db::models::DashboardCountsRow;

/// `sp_GetDashboardCounts`
#[derive(Debug, Clone, Copy)]
pub struct GetDashboardCounts;

impl Procedure for GetDashboardCounts {
    const NAME: &'static str = "sp_GetDashboardCounts";
    type Output = DashboardCounts;

    async fn execute(self, conn: &mut SqliteConnection) -> StoreResult<Self::Output> {
        let row = sqlx::query_as::<_, DashboardCountsRow>(
            r#"
            SELECT record_label_count, employee_count, song_count, contributor_count, collaboration_count
            FROM vw_dashboard_counts
            "#,
        )
        .fetch_one(&mut *conn)
        .await?;
        Ok(row.into())
    }
}
