//! Library query and indexing endpoints
use crate::{error::Result, state::AppState};
use aria_core::types::{IndexStatus, Track};
use aria_storage::{index_status, tracks};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// Characters escaped when embedding a catalog path in a URL; '/' stays.
const PATH_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

const MAX_PAGE_SIZE: i64 = 500;
const MAX_SEARCH_RESULTS: i64 = 100;

fn rfc3339(epoch: Option<i64>) -> Option<String> {
    epoch
        .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0))
        .map(|dt| dt.to_rfc3339())
}

/// Track payload with stream/art URLs resolved against the stream base URL
#[derive(Debug, Serialize)]
pub struct TrackResponse {
    pub id: i64,
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub album_artist: Option<String>,
    pub track_number: Option<u32>,
    pub disc_number: Option<u32>,
    pub duration: Option<f64>,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub file_path: String,
    pub stream_url: String,
    pub art_url: Option<String>,
    pub file_format: String,
}

pub(crate) fn track_response(track: &Track, base_url: &str) -> TrackResponse {
    let encoded_path = utf8_percent_encode(&track.file_path, PATH_ENCODE_SET).to_string();
    let stream_url = format!("{base_url}/stream/{encoded_path}");

    // Embedded art wins over folder art
    let art_url = if track.has_embedded_art {
        Some(format!("{base_url}/stream/art/embedded/{}", track.id))
    } else if track.has_folder_art {
        track.folder_art_path.as_deref().map(|art_path| {
            let encoded_art = utf8_percent_encode(art_path, PATH_ENCODE_SET).to_string();
            format!("{base_url}/stream/art/{encoded_art}")
        })
    } else {
        None
    };

    TrackResponse {
        id: track.id,
        title: track.title.clone(),
        artist: track.artist.clone(),
        album: track.album.clone(),
        album_artist: track.album_artist.clone(),
        track_number: track.track_number,
        disc_number: track.disc_number,
        duration: track.duration,
        year: track.year,
        genre: track.genre.clone(),
        file_path: track.file_path.clone(),
        stream_url,
        art_url,
        file_format: track.file_format.clone(),
    }
}

/// GET /api/library/status
/// The latest indexing run (idle defaults when none has happened)
pub async fn status(State(app_state): State<AppState>) -> Result<Json<Value>> {
    let status = index_status::latest(&app_state.pool)
        .await?
        .unwrap_or_else(IndexStatus::idle);

    Ok(Json(json!({
        "status": status.state,
        "started_at": rfc3339(status.started_at),
        "completed_at": rfc3339(status.completed_at),
        "total_files": status.total_files,
        "processed_files": status.processed_files,
        "error_message": status.error_message,
    })))
}

/// POST /api/library/reindex
/// Fire-and-forget re-index trigger; progress is visible on /status only
pub async fn reindex(State(app_state): State<AppState>) -> Result<Json<Value>> {
    Arc::clone(&app_state.indexer).start(true).await.map_err(|e| {
        crate::error::ServerError::Internal(format!("Failed to start indexing: {e}"))
    })?;

    Ok(Json(json!({ "status": "indexing_started" })))
}

/// GET /api/library/stats
pub async fn stats(State(app_state): State<AppState>) -> Result<Json<Value>> {
    let stats = tracks::stats(&app_state.pool).await?;

    Ok(Json(json!({
        "tracks": stats.tracks,
        "artists": stats.artists,
        "albums": stats.albums,
        "total_duration": stats.total_duration,
    })))
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    #[serde(default)]
    pub search: Option<String>,
}

fn default_limit() -> i64 {
    100
}

/// GET /api/library/artists
pub async fn artists(
    State(app_state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>> {
    let limit = query.limit.clamp(1, MAX_PAGE_SIZE);
    let rows = tracks::artists(
        &app_state.pool,
        query.search.as_deref(),
        limit,
        query.offset.max(0),
    )
    .await?;

    Ok(Json(json!({ "artists": rows })))
}

/// GET /api/library/artists/{artist}/albums
pub async fn artist_albums(
    Path(artist): Path<String>,
    State(app_state): State<AppState>,
) -> Result<Json<Value>> {
    let rows = tracks::albums_for_artist(&app_state.pool, &artist).await?;

    let albums: Vec<Value> = rows
        .iter()
        .map(|album| {
            json!({
                "name": album.name.as_deref().unwrap_or("Unknown Album"),
                "artist": artist,
                "album_artist": album.album_artist,
                "track_count": album.track_count,
                "year": album.year,
            })
        })
        .collect();

    Ok(Json(json!({ "albums": albums, "artist": artist })))
}

/// GET /api/library/albums
pub async fn albums(
    State(app_state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>> {
    let limit = query.limit.clamp(1, MAX_PAGE_SIZE);
    let rows = tracks::albums(
        &app_state.pool,
        query.search.as_deref(),
        limit,
        query.offset.max(0),
    )
    .await?;

    let albums: Vec<Value> = rows
        .iter()
        .map(|album| {
            json!({
                "name": album.name,
                "artist": album.artist.as_ref().or(album.album_artist.as_ref()),
                "track_count": album.track_count,
                "year": album.year,
            })
        })
        .collect();

    Ok(Json(json!({ "albums": albums })))
}

#[derive(Debug, Deserialize)]
pub struct AlbumTracksQuery {
    #[serde(default)]
    pub artist: Option<String>,
}

/// GET /api/library/albums/{album}/tracks
pub async fn album_tracks(
    Path(album): Path<String>,
    State(app_state): State<AppState>,
    Query(query): Query<AlbumTracksQuery>,
) -> Result<Json<Value>> {
    let rows =
        tracks::tracks_for_album(&app_state.pool, &album, query.artist.as_deref()).await?;

    let tracks: Vec<TrackResponse> = rows
        .iter()
        .map(|track| track_response(track, &app_state.stream_base_url))
        .collect();

    Ok(Json(json!({
        "album": album,
        "artist": query.artist,
        "tracks": tracks,
    })))
}

#[derive(Debug, Deserialize)]
pub struct TracksQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
}

/// GET /api/library/tracks
pub async fn list_tracks(
    State(app_state): State<AppState>,
    Query(query): Query<TracksQuery>,
) -> Result<Json<Value>> {
    let rows = tracks::list(
        &app_state.pool,
        &tracks::TrackQuery {
            search: query.search,
            artist: query.artist,
            album: query.album,
            limit: query.limit.clamp(1, MAX_PAGE_SIZE),
            offset: query.offset.max(0),
        },
    )
    .await?;

    let tracks: Vec<TrackResponse> = rows
        .iter()
        .map(|track| track_response(track, &app_state.stream_base_url))
        .collect();

    Ok(Json(json!({ "tracks": tracks })))
}

/// GET /api/library/tracks/{id}
pub async fn get_track(
    Path(track_id): Path<i64>,
    State(app_state): State<AppState>,
) -> Result<Json<TrackResponse>> {
    let track = tracks::get_by_id(&app_state.pool, track_id)
        .await?
        .ok_or_else(|| crate::error::ServerError::NotFound("Track not found".to_string()))?;

    Ok(Json(track_response(&track, &app_state.stream_base_url)))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    #[serde(default = "default_search_limit")]
    pub limit: i64,
}

fn default_search_limit() -> i64 {
    20
}

/// GET /api/library/search
/// Search across artists, albums, and tracks
pub async fn search(
    State(app_state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Value>> {
    let limit = query.limit.clamp(1, MAX_SEARCH_RESULTS);

    let artists = tracks::distinct_artists(&app_state.pool, &query.q, limit).await?;

    let albums: Vec<Value> = tracks::distinct_albums(&app_state.pool, &query.q, limit)
        .await?
        .into_iter()
        .map(|(name, artist)| json!({ "name": name, "artist": artist }))
        .collect();

    let tracks: Vec<TrackResponse> = tracks::search_by_title(&app_state.pool, &query.q, limit)
        .await?
        .iter()
        .map(|track| track_response(track, &app_state.stream_base_url))
        .collect();

    Ok(Json(json!({
        "artists": artists,
        "albums": albums,
        "tracks": tracks,
    })))
}
