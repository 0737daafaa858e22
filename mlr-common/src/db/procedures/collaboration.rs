//! Collaboration procedures

use sqlx::SqliteConnection;

use super::contributor::contributor_id_by_nif;
use super::like_filter;
use super::record_label::record_label_id_by_name;
use crate::api::types::{Collaboration, CollaborationInput, DelimitedList, SongRef};
use crate::db::gateway::{Procedure, StoreCode, StoreError, StoreResult};
use crate::db::models::CollaborationRow;

const SELECT_COLLABORATIONS: &str = "SELECT collaboration_id, collaboration_name, start_date, \
     end_date, description, song_id, song_title, record_labels, contributors FROM vw_collaborations";

/// Resolve a song reference to its id
///
/// By id: 50025 when absent. By title: 50025 for no match, 51030 when the
/// title is shared by several songs.
async fn resolve_song(conn: &mut SqliteConnection, song: &SongRef) -> StoreResult<i64> {
    match song {
        SongRef::Id(id) => {
            let found: Option<i64> = sqlx::query_scalar("SELECT song_id FROM song WHERE song_id = ?1")
                .bind(*id)
                .fetch_optional(&mut *conn)
                .await?;
            found.ok_or_else(|| {
                StoreError::signal(StoreCode::SongNotFound, format!("Song {id} not found"))
            })
        }
        SongRef::Title(title) => {
            let ids: Vec<i64> = sqlx::query_scalar("SELECT song_id FROM song WHERE title = ?1")
                .bind(title)
                .fetch_all(&mut *conn)
                .await?;
            match ids.as_slice() {
                [id] => Ok(*id),
                [] => Err(StoreError::signal(
                    StoreCode::SongNotFound,
                    format!("Song '{title}' not found"),
                )),
                _ => Err(StoreError::signal(
                    StoreCode::SongTitleAmbiguous,
                    format!("Song title '{title}' matches {} songs; use SongID", ids.len()),
                )),
            }
        }
    }
}

async fn link_record_labels(
    conn: &mut SqliteConnection,
    collaboration_id: i64,
    names: &DelimitedList,
) -> StoreResult<()> {
    sqlx::query("DELETE FROM collaboration_record_label WHERE collaboration_id = ?1")
        .bind(collaboration_id)
        .execute(&mut *conn)
        .await?;

    for (position, name) in names.items().iter().enumerate() {
        let record_label_id = record_label_id_by_name(conn, name).await?;
        sqlx::query(
            "INSERT INTO collaboration_record_label (collaboration_id, record_label_id, position) VALUES (?1, ?2, ?3)",
        )
        .bind(collaboration_id)
        .bind(record_label_id)
        .bind(position as i64)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

async fn link_contributors(
    conn: &mut SqliteConnection,
    collaboration_id: i64,
    nifs: &DelimitedList,
) -> StoreResult<()> {
    sqlx::query("DELETE FROM collaboration_contributor WHERE collaboration_id = ?1")
        .bind(collaboration_id)
        .execute(&mut *conn)
        .await?;

    for (position, nif) in nifs.items().iter().enumerate() {
        let contributor_id = contributor_id_by_nif(conn, nif).await?;
        sqlx::query(
            "INSERT INTO collaboration_contributor (collaboration_id, contributor_id, position) VALUES (?1, ?2, ?3)",
        )
        .bind(collaboration_id)
        .bind(contributor_id)
        .bind(position as i64)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

async fn song_id_for(conn: &mut SqliteConnection, input: &CollaborationInput) -> StoreResult<Option<i64>> {
    match &input.song {
        Some(song) => Ok(Some(resolve_song(conn, song).await?)),
        None => Ok(None),
    }
}

/// `sp_GetCollaborations`
///
/// `start` keeps collaborations starting on or after the date, `end` those
/// ending on or before it.
#[derive(Debug, Clone, Default)]
pub struct GetCollaborations {
    pub name: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    /// Song title substring
    pub song: Option<String>,
    pub labels: Option<String>,
    pub contributors: Option<String>,
}

impl Procedure for GetCollaborations {
    const NAME: &'static str = "sp_GetCollaborations";
    type Output = Vec<Collaboration>;

    async fn execute(self, conn: &mut SqliteConnection) -> StoreResult<Self::Output> {
        let sql = format!(
            "{SELECT_COLLABORATIONS} WHERE {} \
             AND (?2 IS NULL OR start_date >= ?2) \
             AND (?3 IS NULL OR end_date <= ?3) \
             AND {} AND {} AND {} ORDER BY collaboration_id",
            like_filter("collaboration_name", 1),
            like_filter("song_title", 4),
            like_filter("record_labels", 5),
            like_filter("contributors", 6),
        );
        let rows = sqlx::query_as::<_, CollaborationRow>(&sql)
            .bind(self.name)
            .bind(self.start)
            .bind(self.end)
            .bind(self.song)
            .bind(self.labels)
            .bind(self.contributors)
            .fetch_all(&mut *conn)
            .await?;
        Ok(rows.into_iter().map(Collaboration::from).collect())
    }
}

/// `sp_GetCollaborationByID`
#[derive(Debug, Clone, Copy)]
pub struct GetCollaborationById {
    pub id: i64,
}

impl Procedure for GetCollaborationById {
    const NAME: &'static str = "sp_GetCollaborationByID";
    type Output = Option<Collaboration>;

    async fn execute(self, conn: &mut SqliteConnection) -> StoreResult<Self::Output> {
        let sql = format!("{SELECT_COLLABORATIONS} WHERE collaboration_id = ?1");
        let row = sqlx::query_as::<_, CollaborationRow>(&sql)
            .bind(self.id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row.map(Collaboration::from))
    }
}

/// `sp_CreateCollaboration`
#[derive(Debug, Clone)]
pub struct CreateCollaboration {
    pub input: CollaborationInput,
}

impl Procedure for CreateCollaboration {
    const NAME: &'static str = "sp_CreateCollaboration";
    type Output = i64;

    async fn execute(self, conn: &mut SqliteConnection) -> StoreResult<Self::Output> {
        let input = self.input;
        let song_id = song_id_for(conn, &input).await?;

        let collaboration_id = sqlx::query(
            r#"
            INSERT INTO collaboration (collaboration_name, start_date, end_date, description, song_id)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&input.collaboration_name)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(&input.description)
        .bind(song_id)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();

        link_record_labels(conn, collaboration_id, &input.record_labels).await?;
        link_contributors(conn, collaboration_id, &input.contributors).await?;
        Ok(collaboration_id)
    }
}

/// `sp_UpdateCollaboration`
#[derive(Debug, Clone)]
pub struct UpdateCollaboration {
    pub id: i64,
    pub input: CollaborationInput,
}

impl Procedure for UpdateCollaboration {
    const NAME: &'static str = "sp_UpdateCollaboration";
    type Output = ();

    async fn execute(self, conn: &mut SqliteConnection) -> StoreResult<Self::Output> {
        let input = self.input;
        let song_id = song_id_for(conn, &input).await?;

        let result = sqlx::query(
            r#"
            UPDATE collaboration SET
                collaboration_name = ?2, start_date = ?3, end_date = ?4, description = ?5, song_id = ?6
            WHERE collaboration_id = ?1
            "#,
        )
        .bind(self.id)
        .bind(&input.collaboration_name)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(&input.description)
        .bind(song_id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::signal(
                StoreCode::CollaborationNotFound,
                format!("Collaboration {} not found", self.id),
            ));
        }

        link_record_labels(conn, self.id, &input.record_labels).await?;
        link_contributors(conn, self.id, &input.contributors).await?;
        Ok(())
    }
}

/// `sp_DeleteCollaboration`
#[derive(Debug, Clone, Copy)]
pub struct DeleteCollaboration {
    pub id: i64,
}

impl Procedure for DeleteCollaboration {
    const NAME: &'static str = "sp_DeleteCollaboration";
    type Output = ();

    async fn execute(self, conn: &mut SqliteConnection) -> StoreResult<Self::Output> {
        let result = sqlx::query("DELETE FROM collaboration WHERE collaboration_id = ?1")
            .bind(self.id)
            .execute(&mut *conn)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::signal(
                StoreCode::CollaborationDeleteNotFound,
                format!("Collaboration {} not found", self.id),
            ));
        }
        Ok(())
    }
}
