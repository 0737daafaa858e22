//! Song endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use mlr_common::api::types::{normalize_optional, Song, SongDependencies, SongPayload};
use mlr_common::db::procedures::song::{
    CreateSong, DeleteSong, GetSongById, GetSongDependencies, GetSongs, UpdateSong,
};
use mlr_common::Gateway;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Filters for GET /api/songs
///
/// Durations arrive as text so a blank value means "no filter" rather than
/// a rejected request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongQuery {
    pub title: Option<String>,
    pub min_duration: Option<String>,
    pub max_duration: Option<String>,
    pub release_date: Option<String>,
    pub genre: Option<String>,
    pub contributor: Option<String>,
    pub collaboration: Option<String>,
}

fn parse_seconds(name: &str, value: Option<String>) -> ApiResult<Option<i64>> {
    normalize_optional(value)
        .map(|v| {
            v.parse::<i64>()
                .map_err(|_| ApiError::Validation(format!("{name} must be a whole number of seconds")))
        })
        .transpose()
}

fn not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("Song {id} not found"))
}

async fn fetch(gateway: &Gateway, id: i64) -> ApiResult<Option<Song>> {
    Ok(gateway.call(GetSongById { id }).await?)
}

/// GET /api/songs
pub async fn list_songs(
    State(state): State<AppState>,
    Query(query): Query<SongQuery>,
) -> ApiResult<Json<Vec<Song>>> {
    let songs = state
        .gateway
        .call(GetSongs {
            title: normalize_optional(query.title),
            min_duration: parse_seconds("minDuration", query.min_duration)?,
            max_duration: parse_seconds("maxDuration", query.max_duration)?,
            release_date: normalize_optional(query.release_date),
            genre: normalize_optional(query.genre),
            contributor: normalize_optional(query.contributor),
            collaboration: normalize_optional(query.collaboration),
        })
        .await?;
    Ok(Json(songs))
}

/// GET /api/songs/:id
pub async fn get_song(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Song>> {
    fetch(&state.gateway, id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// POST /api/songs
pub async fn create_song(
    State(state): State<AppState>,
    payload: Result<Json<SongPayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Song>)> {
    let Json(payload) = payload?;
    let input = payload.validate()?;

    let id = state.gateway.call(CreateSong { input }).await?;
    let song = fetch(&state.gateway, id)
        .await?
        .ok_or_else(|| ApiError::Internal(format!("Song {id} missing after create")))?;
    Ok((StatusCode::CREATED, Json(song)))
}

/// PUT /api/songs/:id
pub async fn update_song(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<SongPayload>, JsonRejection>,
) -> ApiResult<Json<Song>> {
    let Json(payload) = payload?;
    let input = payload.validate()?;

    state.gateway.call(UpdateSong { id, input }).await?;
    fetch(&state.gateway, id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// DELETE /api/songs/:id
pub async fn delete_song(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.gateway.call(DeleteSong { id }).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/songs/:id/dependencies
pub async fn song_dependencies(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<SongDependencies>> {
    Ok(Json(state.gateway.call(GetSongDependencies { id }).await?))
}

pub fn song_routes() -> Router<AppState> {
    Router::new()
        .route("/api/songs", get(list_songs).post(create_song))
        .route(
            "/api/songs/:id",
            get(get_song).put(update_song).delete(delete_song),
        )
        .route("/api/songs/:id/dependencies", get(song_dependencies))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_duration_is_no_filter() {
        assert_eq!(parse_seconds("minDuration", Some(" ".into())).unwrap(), None);
        assert_eq!(parse_seconds("minDuration", Some("180".into())).unwrap(), Some(180));
        assert!(parse_seconds("maxDuration", Some("3m".into())).is_err());
    }
}
