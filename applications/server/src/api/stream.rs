//! Range-aware file and art streaming
//!
//! Every path-taking endpoint here resolves the requested logical path
//! against the library root with the same containment rules: a lexical
//! check first (catches `..` escapes without touching the filesystem), then
//! symlink resolution, then a re-check against the canonicalized root.
//! Bodies stream in 64 KiB chunks; a range request seeks to the window and
//! never loads the whole file.

use crate::{
    error::{Result, ServerError},
    state::AppState,
};
use aria_core::paths;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
};
use std::path::PathBuf;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt, SeekFrom};
use tokio_util::io::ReaderStream;

/// Streaming reads the byte window in chunks of this size
const STREAM_CHUNK_SIZE: usize = 64 * 1024;

/// Fixed content types for the formats we serve; anything else falls back to
/// a library guess, then octet-stream.
const MIME_TYPES: &[(&str, &str)] = &[
    ("mp3", "audio/mpeg"),
    ("m4a", "audio/mp4"),
    ("wav", "audio/wav"),
    ("flac", "audio/flac"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
];

fn mime_for_path(path: &std::path::Path) -> String {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase);

    if let Some(ext) = ext {
        if let Some((_, mime)) = MIME_TYPES.iter().find(|(known, _)| *known == ext) {
            return (*mime).to_string();
        }
    }

    mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string()
}

/// Resolve a requested logical path to a contained filesystem path.
///
/// 403 when the path escapes the library root (lexically or through a
/// symlink), 404 when it does not exist, 400 when resolution fails.
async fn resolve_contained(root: &std::path::Path, rel_path: &str) -> Result<PathBuf> {
    let joined = root.join(rel_path);

    // Lexical escape check before touching the filesystem
    if !paths::is_contained(&joined, root) {
        return Err(ServerError::Forbidden("Access denied".to_string()));
    }

    // Symlink resolution
    let canonical = match tokio::fs::canonicalize(&joined).await {
        Ok(canonical) => canonical,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ServerError::NotFound("File not found".to_string()));
        }
        Err(_) => return Err(ServerError::BadRequest("Invalid path".to_string())),
    };
    let canonical_root = tokio::fs::canonicalize(root)
        .await
        .map_err(|_| ServerError::BadRequest("Invalid path".to_string()))?;

    // A symlink inside the tree may still point outside it
    if !canonical.starts_with(&canonical_root) {
        return Err(ServerError::Forbidden("Access denied".to_string()));
    }

    Ok(canonical)
}

/// Parse a single-range `bytes=<start>-<end>` header against a file size.
///
/// Either bound may be omitted (missing start means 0, missing end means the
/// last byte); bounds clamp into the file before the start/end comparison.
/// Malformed syntax, start past end, and any range against an empty file are
/// all range errors (416).
fn parse_range(raw: &str, file_size: u64) -> Result<(u64, u64)> {
    let range = raw
        .strip_prefix("bytes=")
        .ok_or_else(|| ServerError::InvalidRange("Invalid range format".to_string()))?;

    let (start_str, end_str) = range
        .split_once('-')
        .ok_or_else(|| ServerError::InvalidRange("Invalid range format".to_string()))?;

    let start: u64 = if start_str.is_empty() {
        0
    } else {
        start_str
            .trim()
            .parse()
            .map_err(|_| ServerError::InvalidRange("Invalid range format".to_string()))?
    };

    if file_size == 0 {
        return Err(ServerError::InvalidRange("Invalid range".to_string()));
    }

    let end: u64 = if end_str.is_empty() {
        file_size - 1
    } else {
        end_str
            .trim()
            .parse()
            .map_err(|_| ServerError::InvalidRange("Invalid range format".to_string()))?
    };

    let end = end.min(file_size - 1);
    if start > end {
        return Err(ServerError::InvalidRange("Invalid range".to_string()));
    }

    Ok((start, end))
}

/// A body streaming `length` bytes from `offset`, in fixed-size chunks.
async fn stream_window(path: &std::path::Path, offset: u64, length: u64) -> Result<Body> {
    let mut file = File::open(path).await?;
    file.seek(SeekFrom::Start(offset)).await?;
    let reader = ReaderStream::with_capacity(file.take(length), STREAM_CHUNK_SIZE);
    Ok(Body::from_stream(reader))
}

/// GET /stream/{*path}
/// Stream a library file with range request support
pub async fn stream_file(
    Path(rel_path): Path<String>,
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response> {
    let root = &app_state.config.library.music_path;
    let full_path = resolve_contained(root, &rel_path).await?;

    let metadata = tokio::fs::metadata(&full_path).await?;
    if !metadata.is_file() {
        return Err(ServerError::BadRequest("Not a file".to_string()));
    }

    let file_size = metadata.len();
    let mime_type = mime_for_path(&full_path);

    if let Some(range) = headers.get(header::RANGE) {
        let range_str = range
            .to_str()
            .map_err(|_| ServerError::InvalidRange("Invalid range header".to_string()))?;
        let (start, end) = parse_range(range_str, file_size)?;
        let content_length = end - start + 1;

        let body = stream_window(&full_path, start, content_length).await?;
        let response = Response::builder()
            .status(StatusCode::PARTIAL_CONTENT)
            .header(header::CONTENT_TYPE, mime_type)
            .header(header::CONTENT_LENGTH, content_length)
            .header(
                header::CONTENT_RANGE,
                format!("bytes {}-{}/{}", start, end, file_size),
            )
            .header(header::ACCEPT_RANGES, "bytes")
            .body(body)
            .map_err(|e| ServerError::Internal(format!("Failed to build response: {}", e)))?;

        return Ok(response);
    }

    // No range request - stream the entire file
    let body = stream_window(&full_path, 0, file_size).await?;
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime_type)
        .header(header::CONTENT_LENGTH, file_size)
        .header(header::ACCEPT_RANGES, "bytes")
        .body(body)
        .map_err(|e| ServerError::Internal(format!("Failed to build response: {}", e)))?;

    Ok(response)
}

/// GET /stream/art/{*path}
/// Serve folder album art, with the same containment rules as file streaming
pub async fn folder_art(
    Path(rel_path): Path<String>,
    State(app_state): State<AppState>,
) -> Result<Response> {
    let root = &app_state.config.library.music_path;
    let full_path = resolve_contained(root, &rel_path).await?;

    let metadata = tokio::fs::metadata(&full_path).await?;
    if !metadata.is_file() {
        return Err(ServerError::BadRequest("Not a file".to_string()));
    }

    let mime_type = mime_for_path(&full_path);
    let body = stream_window(&full_path, 0, metadata.len()).await?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime_type)
        .header(header::CONTENT_LENGTH, metadata.len())
        .body(body)
        .map_err(|e| ServerError::Internal(format!("Failed to build response: {}", e)))?;

    Ok(response)
}

/// GET /stream/art/embedded/{track_id}
/// Extract and serve a track's embedded album art
pub async fn embedded_art(
    Path(track_id): Path<i64>,
    State(app_state): State<AppState>,
) -> Result<Response> {
    let track = aria_storage::tracks::get_by_id(&app_state.pool, track_id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Track not found".to_string()))?;

    if !track.has_embedded_art {
        return Err(ServerError::NotFound("No embedded art".to_string()));
    }

    let root = &app_state.config.library.music_path;
    let full_path = resolve_contained(root, &track.file_path).await?;

    // Same extraction priority order as indexing: first dialect with
    // pictures wins, front cover preferred
    let artwork = app_state
        .artwork
        .extract(&full_path)
        .map_err(|e| ServerError::Internal(format!("Error extracting art: {}", e)))?
        .ok_or_else(|| ServerError::NotFound("Could not extract art".to_string()))?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, artwork.mime_type)
        .header(header::CONTENT_LENGTH, artwork.data.len())
        .body(Body::from(artwork.data))
        .map_err(|e| ServerError::Internal(format!("Failed to build response: {}", e)))?;

    Ok(response)
}
