//! Record label procedures, including the cascading delete

use sqlx::SqliteConnection;

use super::like_filter;
use crate::api::types::{RecordLabel, RecordLabelDependencies, RecordLabelInput};
use crate::db::gateway::{Procedure, StoreCode, StoreError, StoreResult};
use crate::db::models::{RecordLabelDependencyRow, RecordLabelRow};

const SELECT_RECORD_LABELS: &str =
    "SELECT record_label_id, name, location, website, email, phone_number FROM vw_record_labels";

fn delete_not_found(id: i64) -> StoreError {
    StoreError::signal(
        StoreCode::RecordLabelDeleteNotFound,
        format!("Record label {id} not found"),
    )
}

/// Signal 50000 unless the label exists
pub(crate) async fn ensure_record_label(conn: &mut SqliteConnection, id: i64) -> StoreResult<()> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT record_label_id FROM record_label WHERE record_label_id = ?1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
    match found {
        Some(_) => Ok(()),
        None => Err(StoreError::signal(
            StoreCode::RecordLabelNotFound,
            format!("Record label {id} not found"),
        )),
    }
}

/// Label id by exact name, signalling 50040 when unknown
pub(crate) async fn record_label_id_by_name(
    conn: &mut SqliteConnection,
    name: &str,
) -> StoreResult<i64> {
    sqlx::query_scalar("SELECT record_label_id FROM record_label WHERE name = ?1")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| {
            StoreError::signal(
                StoreCode::ReferencedLabelNotFound,
                format!("Record label '{name}' not found"),
            )
        })
}

/// `sp_GetRecordLabels`
#[derive(Debug, Clone, Default)]
pub struct GetRecordLabels {
    pub name: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl Procedure for GetRecordLabels {
    const NAME: &'static str = "sp_GetRecordLabels";
    type Output = Vec<RecordLabel>;

    async fn execute(self, conn: &mut SqliteConnection) -> StoreResult<Self::Output> {
        let sql = format!(
            "{SELECT_RECORD_LABELS} WHERE {} AND {} AND {} AND {} AND {} ORDER BY record_label_id",
            like_filter("name", 1),
            like_filter("location", 2),
            like_filter("website", 3),
            like_filter("email", 4),
            like_filter("phone_number", 5),
        );
        let rows = sqlx::query_as::<_, RecordLabelRow>(&sql)
            .bind(self.name)
            .bind(self.location)
            .bind(self.website)
            .bind(self.email)
            .bind(self.phone)
            .fetch_all(&mut *conn)
            .await?;
        Ok(rows.into_iter().map(RecordLabel::from).collect())
    }
}

/// `sp_GetRecordLabelByID`
#[derive(Debug, Clone, Copy)]
pub struct GetRecordLabelById {
    pub id: i64,
}

impl Procedure for GetRecordLabelById {
    const NAME: &'static str = "sp_GetRecordLabelByID";
    type Output = Option<RecordLabel>;

    async fn execute(self, conn: &mut SqliteConnection) -> StoreResult<Self::Output> {
        let sql = format!("{SELECT_RECORD_LABELS} WHERE record_label_id = ?1");
        let row = sqlx::query_as::<_, RecordLabelRow>(&sql)
            .bind(self.id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row.map(RecordLabel::from))
    }
}

/// `sp_CreateRecordLabel`; a duplicate name violates UNIQUE(name)
#[derive(Debug, Clone)]
pub struct CreateRecordLabel {
    pub input: RecordLabelInput,
}

impl Procedure for CreateRecordLabel {
    const NAME: &'static str = "sp_CreateRecordLabel";
    type Output = i64;

    async fn execute(self, conn: &mut SqliteConnection) -> StoreResult<Self::Output> {
        let input = self.input;
        let result = sqlx::query(
            r#"
            INSERT INTO record_label (name, location, website, email, phone_number)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(input.name)
        .bind(input.location)
        .bind(input.website)
        .bind(input.email)
        .bind(input.phone_number)
        .execute(&mut *conn)
        .await?;
        Ok(result.last_insert_rowid())
    }
}

/// `sp_UpdateRecordLabel`
#[derive(Debug, Clone)]
pub struct UpdateRecordLabel {
    pub id: i64,
    pub input: RecordLabelInput,
}

impl Procedure for UpdateRecordLabel {
    const NAME: &'static str = "sp_UpdateRecordLabel";
    type Output = ();

    async fn execute(self, conn: &mut SqliteConnection) -> StoreResult<Self::Output> {
        let input = self.input;
        let result = sqlx::query(
            r#"
            UPDATE record_label SET
                name = ?2, location = ?3, website = ?4, email = ?5, phone_number = ?6
            WHERE record_label_id = ?1
            "#,
        )
        .bind(self.id)
        .bind(input.name)
        .bind(input.location)
        .bind(input.website)
        .bind(input.email)
        .bind(input.phone_number)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::signal(
                StoreCode::RecordLabelNotFound,
                format!("Record label {} not found", self.id),
            ));
        }
        Ok(())
    }
}

/// `sp_CheckRecordLabelDependencies`
#[derive(Debug, Clone, Copy)]
pub struct CheckRecordLabelDependencies {
    pub id: i64,
}

impl Procedure for CheckRecordLabelDependencies {
    const NAME: &'static str = "sp_CheckRecordLabelDependencies";
    type Output = RecordLabelDependencies;

    async fn execute(self, conn: &mut SqliteConnection) -> StoreResult<Self::Output> {
        let row = sqlx::query_as::<_, RecordLabelDependencyRow>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM employee WHERE record_label_id = rl.record_label_id) AS employee_count,
                (SELECT COUNT(*) FROM collaboration_record_label WHERE record_label_id = rl.record_label_id) AS collaboration_count
            FROM record_label rl
            WHERE rl.record_label_id = ?1
            "#,
        )
        .bind(self.id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| delete_not_found(self.id))?;

        Ok(row.into())
    }
}

/// `sp_DeleteRecordLabel`: fails on the foreign keys if dependents remain
#[derive(Debug, Clone, Copy)]
pub struct DeleteRecordLabel {
    pub id: i64,
}

impl Procedure for DeleteRecordLabel {
    const NAME: &'static str = "sp_DeleteRecordLabel";
    type Output = ();

    async fn execute(self, conn: &mut SqliteConnection) -> StoreResult<Self::Output> {
        let result = sqlx::query("DELETE FROM record_label WHERE record_label_id = ?1")
            .bind(self.id)
            .execute(&mut *conn)
            .await?;
        if result.rows_affected() == 0 {
            return Err(delete_not_found(self.id));
        }
        Ok(())
    }
}

/// `sp_DeleteRecordLabel_Cascade`
///
/// Removes the label's employees and its collaboration links. Collaborations
/// left without any label are removed as well; those still shared with
/// another label survive.
#[derive(Debug, Clone, Copy)]
pub struct DeleteRecordLabelCascade {
    pub id: i64,
}

impl Procedure for DeleteRecordLabelCascade {
    const NAME: &'static str = "sp_DeleteRecordLabel_Cascade";
    type Output = ();

    async fn execute(self, conn: &mut SqliteConnection) -> StoreResult<Self::Output> {
        sqlx::query("DELETE FROM employee WHERE record_label_id = ?1")
            .bind(self.id)
            .execute(&mut *conn)
            .await?;

        sqlx::query(
            r#"
            DELETE FROM collaboration
            WHERE collaboration_id IN (
                SELECT collaboration_id FROM collaboration_record_label WHERE record_label_id = ?1
            )
            AND collaboration_id NOT IN (
                SELECT collaboration_id FROM collaboration_record_label WHERE record_label_id <> ?1
            )
            "#,
        )
        .bind(self.id)
        .execute(&mut *conn)
        .await?;

        sqlx::query("DELETE FROM collaboration_record_label WHERE record_label_id = ?1")
            .bind(self.id)
            .execute(&mut *conn)
            .await?;

        // Not-found rolls back the deletes above
        DeleteRecordLabel { id: self.id }.execute(conn).await
    }
}
