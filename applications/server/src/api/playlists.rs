//! Playlist management endpoints
use crate::{
    api::library::track_response,
    error::{Result, ServerError},
    state::AppState,
};
use aria_indexer::m3u::{self, M3uLine};
use aria_storage::{playlists, tracks};
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct RenamePlaylistRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AddTrackRequest {
    pub track_id: i64,
    #[serde(default)]
    pub position: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub track_ids: Vec<i64>,
}

/// GET /api/playlists
pub async fn list_playlists(State(app_state): State<AppState>) -> Result<Json<Value>> {
    let summaries = playlists::get_all(&app_state.pool).await?;

    let items: Vec<Value> = summaries
        .iter()
        .map(|playlist| {
            json!({
                "id": playlist.id,
                "name": playlist.name,
                "track_count": playlist.track_count,
                "is_user_created": playlist.is_user_created,
                "created_at": playlist.created_at,
                "updated_at": playlist.updated_at,
            })
        })
        .collect();

    Ok(Json(json!({ "playlists": items })))
}

/// POST /api/playlists
pub async fn create_playlist(
    State(app_state): State<AppState>,
    Json(request): Json<CreatePlaylistRequest>,
) -> Result<Json<Value>> {
    let playlist = playlists::create(&app_state.pool, &request.name).await?;

    Ok(Json(json!({
        "id": playlist.id,
        "name": playlist.name,
        "track_count": 0,
        "is_user_created": true,
    })))
}

/// GET /api/playlists/{id}
/// Playlist detail with entries expanded; unresolved entries keep their raw
/// path and display the filename stem as a title
pub async fn get_playlist(
    Path(playlist_id): Path<i64>,
    State(app_state): State<AppState>,
) -> Result<Json<Value>> {
    let playlist = playlists::get_by_id(&app_state.pool, playlist_id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Playlist not found".to_string()))?;

    let joined = playlists::entries_with_tracks(&app_state.pool, playlist_id).await?;

    let entries: Vec<Value> = joined
        .iter()
        .map(|(entry, track)| match track {
            Some(track) => {
                let mut value =
                    serde_json::to_value(track_response(track, &app_state.stream_base_url))
                        .unwrap_or_default();
                if let Some(object) = value.as_object_mut() {
                    object.insert("position".to_string(), json!(entry.position));
                }
                value
            }
            None => {
                let title = std::path::Path::new(&entry.track_path)
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .unwrap_or(&entry.track_path);
                json!({
                    "id": null,
                    "title": title,
                    "artist": null,
                    "album": null,
                    "position": entry.position,
                    "unresolved_path": entry.track_path,
                })
            }
        })
        .collect();

    Ok(Json(json!({
        "id": playlist.id,
        "name": playlist.name,
        "is_user_created": playlist.is_user_created,
        "tracks": entries,
    })))
}

/// PUT /api/playlists/{id}
pub async fn rename_playlist(
    Path(playlist_id): Path<i64>,
    State(app_state): State<AppState>,
    Json(request): Json<RenamePlaylistRequest>,
) -> Result<Json<Value>> {
    let renamed = playlists::rename(&app_state.pool, playlist_id, &request.name).await?;
    if !renamed {
        return Err(ServerError::NotFound("Playlist not found".to_string()));
    }

    Ok(Json(json!({ "id": playlist_id, "name": request.name })))
}

/// DELETE /api/playlists/{id}
pub async fn delete_playlist(
    Path(playlist_id): Path<i64>,
    State(app_state): State<AppState>,
) -> Result<Json<Value>> {
    let playlist = playlists::get_by_id(&app_state.pool, playlist_id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Playlist not found".to_string()))?;

    // Saved playlists also drop their exported M3U file
    if let Some(ref file_path) = playlist.file_path {
        let m3u_path = app_state.config.playlists_dir().join(file_path);
        if m3u_path.exists() {
            if let Err(e) = tokio::fs::remove_file(&m3u_path).await {
                tracing::warn!("failed to remove playlist file {}: {e}", m3u_path.display());
            }
        }
    }

    playlists::delete(&app_state.pool, playlist_id).await?;

    Ok(Json(json!({ "status": "deleted" })))
}

/// POST /api/playlists/{id}/tracks
pub async fn add_track_to_playlist(
    Path(playlist_id): Path<i64>,
    State(app_state): State<AppState>,
    Json(request): Json<AddTrackRequest>,
) -> Result<Json<Value>> {
    playlists::get_by_id(&app_state.pool, playlist_id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Playlist not found".to_string()))?;

    let track = tracks::get_by_id(&app_state.pool, request.track_id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Track not found".to_string()))?;

    let position = playlists::add_entry(
        &app_state.pool,
        playlist_id,
        Some(track.id),
        &track.file_path,
        request.position,
    )
    .await?;

    Ok(Json(json!({ "status": "added", "position": position })))
}

/// DELETE /api/playlists/{id}/tracks/{position}
pub async fn remove_track_from_playlist(
    Path((playlist_id, position)): Path<(i64, i64)>,
    State(app_state): State<AppState>,
) -> Result<Json<Value>> {
    let removed = playlists::remove_entry_at(&app_state.pool, playlist_id, position).await?;
    if !removed {
        return Err(ServerError::NotFound(
            "Track not found at position".to_string(),
        ));
    }

    Ok(Json(json!({ "status": "removed" })))
}

/// PUT /api/playlists/{id}/reorder
pub async fn reorder_playlist(
    Path(playlist_id): Path<i64>,
    State(app_state): State<AppState>,
    Json(request): Json<ReorderRequest>,
) -> Result<Json<Value>> {
    playlists::get_by_id(&app_state.pool, playlist_id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Playlist not found".to_string()))?;

    playlists::reorder(&app_state.pool, playlist_id, &request.track_ids).await?;

    Ok(Json(json!({ "status": "reordered" })))
}

/// POST /api/playlists/{id}/save
/// Export a playlist as an M3U file under the data root
pub async fn save_playlist(
    Path(playlist_id): Path<i64>,
    State(app_state): State<AppState>,
) -> Result<Json<Value>> {
    let playlist = playlists::get_by_id(&app_state.pool, playlist_id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Playlist not found".to_string()))?;

    let joined = playlists::entries_with_tracks(&app_state.pool, playlist_id).await?;

    let lines: Vec<M3uLine<'_>> = joined
        .iter()
        .map(|(entry, track)| match track {
            Some(track) => M3uLine::Resolved {
                duration: track.duration,
                artist: track.artist.as_deref(),
                title: &track.title,
                path: &track.file_path,
            },
            None => M3uLine::Raw(&entry.track_path),
        })
        .collect();

    let content = m3u::render(&lines);

    let playlists_dir = app_state.config.playlists_dir();
    tokio::fs::create_dir_all(&playlists_dir).await?;

    let filename = format!("{}.m3u", playlist.name);
    tokio::fs::write(playlists_dir.join(&filename), content).await?;

    playlists::set_file_path(&app_state.pool, playlist_id, &filename).await?;

    Ok(Json(json!({ "status": "saved", "file": filename })))
}
