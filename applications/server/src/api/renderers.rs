//! Renderer proxy endpoints
//!
//! Thin HTTP surface over the owned renderer registry. Every handler looks a
//! device up by id and proxies one operation; backend failures map to the
//! generic operation-failed condition.

use crate::{error::Result, state::AppState};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct VolumeRequest {
    pub volume: u8,
}

#[derive(Debug, Deserialize)]
pub struct PlayUriRequest {
    pub uri: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GroupRequest {
    pub coordinator: String,
    pub members: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct QueueQuery {
    #[serde(default)]
    pub start: u32,
    #[serde(default = "default_queue_count")]
    pub count: u32,
}

fn default_queue_count() -> u32 {
    50
}

/// GET /api/renderers/devices
pub async fn list_devices(State(app_state): State<AppState>) -> Result<Json<Value>> {
    let mut devices = Vec::new();
    for device in app_state.renderers.list() {
        match device.describe().await {
            Ok(info) => devices.push(info),
            Err(e) => tracing::warn!("failed to describe renderer {}: {e}", device.id()),
        }
    }
    devices.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(Json(json!({ "devices": devices })))
}

/// POST /api/renderers/refresh
pub async fn refresh(State(app_state): State<AppState>) -> Result<Json<Value>> {
    let count = app_state.renderers.refresh().await?;
    Ok(Json(json!({ "status": "refreshed", "devices": count })))
}

/// GET /api/renderers/devices/{id}
pub async fn get_device(
    Path(device_id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<Json<Value>> {
    let device = app_state.renderers.get(&device_id)?;
    let info = device.describe().await?;
    Ok(Json(json!(info)))
}

/// GET /api/renderers/devices/{id}/now-playing
pub async fn now_playing(
    Path(device_id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<Json<Value>> {
    let device = app_state.renderers.get(&device_id)?;
    let now_playing = device.now_playing().await?;
    Ok(Json(json!(now_playing)))
}

/// POST /api/renderers/devices/{id}/play
pub async fn play(
    Path(device_id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<Json<Value>> {
    let device = app_state.renderers.get(&device_id)?;
    device.play().await?;
    Ok(Json(json!({ "status": "playing" })))
}

/// POST /api/renderers/devices/{id}/pause
pub async fn pause(
    Path(device_id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<Json<Value>> {
    let device = app_state.renderers.get(&device_id)?;
    device.pause().await?;
    Ok(Json(json!({ "status": "paused" })))
}

/// POST /api/renderers/devices/{id}/stop
pub async fn stop(
    Path(device_id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<Json<Value>> {
    let device = app_state.renderers.get(&device_id)?;
    device.stop().await?;
    Ok(Json(json!({ "status": "stopped" })))
}

/// POST /api/renderers/devices/{id}/next
pub async fn next(
    Path(device_id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<Json<Value>> {
    let device = app_state.renderers.get(&device_id)?;
    device.next().await?;
    Ok(Json(json!({ "status": "skipped" })))
}

/// POST /api/renderers/devices/{id}/previous
pub async fn previous(
    Path(device_id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<Json<Value>> {
    let device = app_state.renderers.get(&device_id)?;
    device.previous().await?;
    Ok(Json(json!({ "status": "skipped_back" })))
}

/// POST /api/renderers/devices/{id}/volume
pub async fn set_volume(
    Path(device_id): Path<String>,
    State(app_state): State<AppState>,
    Json(request): Json<VolumeRequest>,
) -> Result<Json<Value>> {
    let device = app_state.renderers.get(&device_id)?;
    device.set_volume(request.volume.min(100)).await?;
    Ok(Json(json!({ "status": "ok", "volume": request.volume.min(100) })))
}

/// POST /api/renderers/devices/{id}/mute
pub async fn toggle_mute(
    Path(device_id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<Json<Value>> {
    let device = app_state.renderers.get(&device_id)?;
    let muted = device.toggle_mute().await?;
    Ok(Json(json!({ "status": "ok", "muted": muted })))
}

/// GET /api/renderers/devices/{id}/queue
pub async fn get_queue(
    Path(device_id): Path<String>,
    State(app_state): State<AppState>,
    Query(query): Query<QueueQuery>,
) -> Result<Json<Value>> {
    let device = app_state.renderers.get(&device_id)?;
    let items = device.queue(query.start, query.count).await?;
    Ok(Json(json!({ "queue": items, "start": query.start })))
}

/// POST /api/renderers/devices/{id}/queue/clear
pub async fn clear_queue(
    Path(device_id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<Json<Value>> {
    let device = app_state.renderers.get(&device_id)?;
    device.clear_queue().await?;
    Ok(Json(json!({ "status": "cleared" })))
}

/// POST /api/renderers/devices/{id}/play-uri
pub async fn play_uri(
    Path(device_id): Path<String>,
    State(app_state): State<AppState>,
    Json(request): Json<PlayUriRequest>,
) -> Result<Json<Value>> {
    let device = app_state.renderers.get(&device_id)?;
    device
        .play_uri(&request.uri, request.title.as_deref())
        .await?;
    Ok(Json(json!({ "status": "playing", "uri": request.uri })))
}

/// POST /api/renderers/devices/{id}/add-to-queue
pub async fn add_to_queue(
    Path(device_id): Path<String>,
    State(app_state): State<AppState>,
    Json(request): Json<PlayUriRequest>,
) -> Result<Json<Value>> {
    let device = app_state.renderers.get(&device_id)?;
    device.enqueue_uri(&request.uri, false).await?;
    Ok(Json(json!({ "status": "queued", "uri": request.uri })))
}

/// POST /api/renderers/devices/{id}/play-next
pub async fn play_next(
    Path(device_id): Path<String>,
    State(app_state): State<AppState>,
    Json(request): Json<PlayUriRequest>,
) -> Result<Json<Value>> {
    let device = app_state.renderers.get(&device_id)?;
    device.enqueue_uri(&request.uri, true).await?;
    Ok(Json(json!({ "status": "queued_next", "uri": request.uri })))
}

/// POST /api/renderers/group
/// Group members under a coordinator
pub async fn create_group(
    State(app_state): State<AppState>,
    Json(request): Json<GroupRequest>,
) -> Result<Json<Value>> {
    // Coordinator must exist before members join it
    app_state.renderers.get(&request.coordinator)?;

    let mut joined = Vec::new();
    for member_id in &request.members {
        let member = app_state.renderers.get(member_id)?;
        member.join_group(&request.coordinator).await?;
        joined.push(member_id.clone());
    }

    Ok(Json(json!({
        "status": "grouped",
        "coordinator": request.coordinator,
        "members": joined,
    })))
}

/// POST /api/renderers/devices/{id}/ungroup
pub async fn ungroup(
    Path(device_id): Path<String>,
    State(app_state): State<AppState>,
) -> Result<Json<Value>> {
    let device = app_state.renderers.get(&device_id)?;
    device.leave_group().await?;
    Ok(Json(json!({ "status": "ungrouped" })))
}
