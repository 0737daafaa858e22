//! Song procedures

use sqlx::SqliteConnection;

use super::contributor::contributor_id_by_nif;
use super::like_filter;
use crate::api::types::{DelimitedList, Song, SongDependencies, SongInput};
use crate::db::gateway::{Procedure, StoreCode, StoreError, StoreResult};
use crate::db::models::{SongDependencyRow, SongRow};

const SELECT_SONGS: &str = "SELECT song_id, title, duration, release_date, genres, contributors, \
     collaboration_name FROM vw_songs";

fn not_found(id: i64) -> StoreError {
    StoreError::signal(StoreCode::SongNotFound, format!("Song {id} not found"))
}

/// Replace the genre links of a song, creating unknown genres
async fn link_genres(
    conn: &mut SqliteConnection,
    song_id: i64,
    genres: &DelimitedList,
) -> StoreResult<()> {
    sqlx::query("DELETE FROM song_genre WHERE song_id = ?1")
        .bind(song_id)
        .execute(&mut *conn)
        .await?;

    for (position, name) in genres.items().iter().enumerate() {
        sqlx::query("INSERT INTO genre (name) VALUES (?1) ON CONFLICT(name) DO NOTHING")
            .bind(name)
            .execute(&mut *conn)
            .await?;
        let genre_id: i64 = sqlx::query_scalar("SELECT genre_id FROM genre WHERE name = ?1")
            .bind(name)
            .fetch_one(&mut *conn)
            .await?;
        sqlx::query("INSERT INTO song_genre (song_id, genre_id, position) VALUES (?1, ?2, ?3)")
            .bind(song_id)
            .bind(genre_id)
            .bind(position as i64)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

/// Replace the contributor links of a song; contributors are named by NIF
async fn link_contributors(
    conn: &mut SqliteConnection,
    song_id: i64,
    nifs: &DelimitedList,
) -> StoreResult<()> {
    sqlx::query("DELETE FROM song_contributor WHERE song_id = ?1")
        .bind(song_id)
        .execute(&mut *conn)
        .await?;

    for (position, nif) in nifs.items().iter().enumerate() {
        let contributor_id = contributor_id_by_nif(conn, nif).await?;
        sqlx::query(
            "INSERT INTO song_contributor (song_id, contributor_id, position) VALUES (?1, ?2, ?3)",
        )
        .bind(song_id)
        .bind(contributor_id)
        .bind(position as i64)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// `sp_GetSongs`
#[derive(Debug, Clone, Default)]
pub struct GetSongs {
    pub title: Option<String>,
    pub min_duration: Option<i64>,
    pub max_duration: Option<i64>,
    /// Exact ISO date
    pub release_date: Option<String>,
    pub genre: Option<String>,
    /// Contributor NIF substring
    pub contributor: Option<String>,
    pub collaboration: Option<String>,
}

impl Procedure for GetSongs {
    const NAME: &'static str = "sp_GetSongs";
    type Output = Vec<Song>;

    async fn execute(self, conn: &mut SqliteConnection) -> StoreResult<Self::Output> {
        let sql = format!(
            "{SELECT_SONGS} WHERE {} \
             AND (?2 IS NULL OR duration >= ?2) \
             AND (?3 IS NULL OR duration <= ?3) \
             AND (?4 IS NULL OR release_date = ?4) \
             AND {} AND {} AND {} ORDER BY song_id",
            like_filter("title", 1),
            like_filter("genres", 5),
            like_filter("contributors", 6),
            like_filter("collaboration_name", 7),
        );
        let rows = sqlx::query_as::<_, SongRow>(&sql)
            .bind(self.title)
            .bind(self.min_duration)
            .bind(self.max_duration)
            .bind(self.release_date)
            .bind(self.genre)
            .bind(self.contributor)
            .bind(self.collaboration)
            .fetch_all(&mut *conn)
            .await?;
        Ok(rows.into_iter().map(Song::from).collect())
    }
}

/// `sp_GetSongByID`
#[derive(Debug, Clone, Copy)]
pub struct GetSongById {
    pub id: i64,
}

impl Procedure for GetSongById {
    const NAME: &'static str = "sp_GetSongByID";
    type Output = Option<Song>;

    async fn execute(self, conn: &mut SqliteConnection) -> StoreResult<Self::Output> {
        let sql = format!("{SELECT_SONGS} WHERE song_id = ?1");
        let row = sqlx::query_as::<_, SongRow>(&sql)
            .bind(self.id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(row.map(Song::from))
    }
}

/// `sp_CreateSong`
#[derive(Debug, Clone)]
pub struct CreateSong {
    pub input: SongInput,
}

impl Procedure for CreateSong {
    const NAME: &'static str = "sp_CreateSong";
    type Output = i64;

    async fn execute(self, conn: &mut SqliteConnection) -> StoreResult<Self::Output> {
        let input = self.input;
        let song_id = sqlx::query(
            "INSERT INTO song (title, duration, release_date) VALUES (?1, ?2, ?3)",
        )
        .bind(&input.title)
        .bind(input.duration)
        .bind(input.release_date)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();

        link_genres(conn, song_id, &input.genres).await?;
        link_contributors(conn, song_id, &input.contributors).await?;
        Ok(song_id)
    }
}

/// `sp_UpdateSong`: scalar fields plus full replacement of both lists
#[derive(Debug, Clone)]
pub struct UpdateSong {
    pub id: i64,
    pub input: SongInput,
}

impl Procedure for UpdateSong {
    const NAME: &'static str = "sp_UpdateSong";
    type Output = ();

    async fn execute(self, conn: &mut SqliteConnection) -> StoreResult<Self::Output> {
        let input = self.input;
        let result = sqlx::query(
            "UPDATE song SET title = ?2, duration = ?3, release_date = ?4 WHERE song_id = ?1",
        )
        .bind(self.id)
        .bind(&input.title)
        .bind(input.duration)
        .bind(input.release_date)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(self.id));
        }

        link_genres(conn, self.id, &input.genres).await?;
        link_contributors(conn, self.id, &input.contributors).await?;
        Ok(())
    }
}

/// `sp_DeleteSong`: collaborations on the song go with it
#[derive(Debug, Clone, Copy)]
pub struct DeleteSong {
    pub id: i64,
}

impl Procedure for DeleteSong {
    const NAME: &'static str = "sp_DeleteSong";
    type Output = ();

    async fn execute(self, conn: &mut SqliteConnection) -> StoreResult<Self::Output> {
        let result = sqlx::query("DELETE FROM song WHERE song_id = ?1")
            .bind(self.id)
            .execute(&mut *conn)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found(self.id));
        }
        Ok(())
    }
}

/// `sp_GetSongDependencies`
#[derive(Debug, Clone, Copy)]
pub struct GetSongDependencies {
    pub id: i64,
}

impl Procedure for GetSongDependencies {
    const NAME: &'static str = "sp_GetSongDependencies";
    type Output = SongDependencies;

    async fn execute(self, conn: &mut SqliteConnection) -> StoreResult<Self::Output> {
        let row = sqlx::query_as::<_, SongDependencyRow>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM collaboration WHERE song_id = s.song_id) AS collaboration_count,
                (SELECT COUNT(*) FROM song_contributor WHERE song_id = s.song_id) AS contributor_count
            FROM song s
            WHERE s.song_id = ?1
            "#,
        )
        .bind(self.id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| not_found(self.id))?;

        Ok(row.into())
    }
}
