//! Playlists vertical slice
//!
//! Playlist mutations that renumber positions (insert, remove, reorder) run
//! inside a single transaction each, so positions within one playlist always
//! form a contiguous zero-based sequence and concurrent mutations of the same
//! playlist cannot interleave mid-renumber.

use aria_core::types::{Playlist, PlaylistEntry, PlaylistId, PlaylistSummary, Track, TrackId};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::tracks::track_from_row;
use crate::StorageError;

type Result<T> = std::result::Result<T, StorageError>;

fn playlist_from_row(row: &SqliteRow) -> Playlist {
    Playlist {
        id: row.get("id"),
        name: row.get("name"),
        file_path: row.get("file_path"),
        is_user_created: row.get::<i64, _>("is_user_created") != 0,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        entries: None,
    }
}

fn entry_from_row(row: &SqliteRow) -> PlaylistEntry {
    PlaylistEntry {
        id: row.get("entry_id"),
        playlist_id: row.get("playlist_id"),
        track_id: row.get("track_id"),
        track_path: row.get("track_path"),
        position: row.get("position"),
    }
}

/// Create a new user playlist
pub async fn create(pool: &SqlitePool, name: &str) -> Result<Playlist> {
    let now = chrono::Utc::now().timestamp();

    let result = sqlx::query(
        "INSERT INTO playlists (name, file_path, is_user_created, created_at, updated_at)
         VALUES (?, NULL, 1, ?, ?)",
    )
    .bind(name)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    let id = result.last_insert_rowid();

    get_by_id(pool, id)
        .await?
        .ok_or_else(|| StorageError::not_found("Playlist", id.to_string()))
}

/// Import a playlist parsed from an on-disk playlist file.
///
/// The playlist row and all its entries commit in one transaction; entries
/// get dense positions in input order. Imported playlists are flagged
/// `is_user_created = 0` so the next full re-index replaces them.
pub async fn import(
    pool: &SqlitePool,
    name: &str,
    file_path: Option<&str>,
    entries: &[(Option<TrackId>, String)],
) -> Result<PlaylistId> {
    let now = chrono::Utc::now().timestamp();
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        "INSERT INTO playlists (name, file_path, is_user_created, created_at, updated_at)
         VALUES (?, ?, 0, ?, ?)",
    )
    .bind(name)
    .bind(file_path)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    let playlist_id = result.last_insert_rowid();

    for (position, (track_id, track_path)) in entries.iter().enumerate() {
        sqlx::query(
            "INSERT INTO playlist_entries (playlist_id, track_id, track_path, position)
             VALUES (?, ?, ?, ?)",
        )
        .bind(playlist_id)
        .bind(track_id)
        .bind(track_path)
        .bind(position as i64)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(playlist_id)
}

/// Get a playlist by id (without entries)
pub async fn get_by_id(pool: &SqlitePool, id: PlaylistId) -> Result<Option<Playlist>> {
    let row = sqlx::query(
        "SELECT id, name, file_path, is_user_created, created_at, updated_at
         FROM playlists WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| playlist_from_row(&row)))
}

/// All playlists with denormalized entry counts, alphabetical.
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<PlaylistSummary>> {
    let rows = sqlx::query(
        "SELECT p.id, p.name, p.is_user_created, p.created_at, p.updated_at,
                COUNT(pe.id) AS track_count
         FROM playlists p
         LEFT JOIN playlist_entries pe ON pe.playlist_id = p.id
         GROUP BY p.id
         ORDER BY p.name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| PlaylistSummary {
            id: row.get("id"),
            name: row.get("name"),
            track_count: row.get("track_count"),
            is_user_created: row.get::<i64, _>("is_user_created") != 0,
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
        .collect())
}

/// Entries of a playlist in position order
pub async fn entries(pool: &SqlitePool, playlist_id: PlaylistId) -> Result<Vec<PlaylistEntry>> {
    let rows = sqlx::query(
        "SELECT id AS entry_id, playlist_id, track_id, track_path, position
         FROM playlist_entries WHERE playlist_id = ? ORDER BY position",
    )
    .bind(playlist_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(entry_from_row).collect())
}

/// Entries of a playlist joined with their resolved tracks (when any), in
/// position order. Unresolved entries come back with `None`.
pub async fn entries_with_tracks(
    pool: &SqlitePool,
    playlist_id: PlaylistId,
) -> Result<Vec<(PlaylistEntry, Option<Track>)>> {
    let rows = sqlx::query(
        "SELECT pe.id AS entry_id, pe.playlist_id, pe.track_id, pe.track_path, pe.position,
                t.id, t.file_path, t.title, t.artist, t.album, t.album_artist,
                t.track_number, t.disc_number, t.duration, t.year, t.genre,
                t.has_embedded_art, t.has_folder_art, t.folder_art_path,
                t.file_size, t.file_format, t.last_modified, t.indexed_at
         FROM playlist_entries pe
         LEFT JOIN tracks t ON t.id = pe.track_id
         WHERE pe.playlist_id = ?
         ORDER BY pe.position",
    )
    .bind(playlist_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| {
            let entry = entry_from_row(row);
            let track = entry.track_id.map(|_| track_from_row(row));
            (entry, track)
        })
        .collect())
}

/// Get a playlist with its entries populated
pub async fn get_with_entries(pool: &SqlitePool, id: PlaylistId) -> Result<Option<Playlist>> {
    let Some(mut playlist) = get_by_id(pool, id).await? else {
        return Ok(None);
    };

    playlist.entries = Some(entries(pool, id).await?);
    Ok(Some(playlist))
}

/// Rename a playlist. Returns false when the playlist does not exist.
pub async fn rename(pool: &SqlitePool, id: PlaylistId, name: &str) -> Result<bool> {
    let result = sqlx::query("UPDATE playlists SET name = ?, updated_at = ? WHERE id = ?")
        .bind(name)
        .bind(chrono::Utc::now().timestamp())
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Record the backing M3U file a playlist was saved to
pub async fn set_file_path(pool: &SqlitePool, id: PlaylistId, file_path: &str) -> Result<()> {
    sqlx::query("UPDATE playlists SET file_path = ?, updated_at = ? WHERE id = ?")
        .bind(file_path)
        .bind(chrono::Utc::now().timestamp())
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Delete a playlist (entries cascade). Returns false when absent.
pub async fn delete(pool: &SqlitePool, id: PlaylistId) -> Result<bool> {
    let result = sqlx::query("DELETE FROM playlists WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete every imported (non-user-created) playlist, cascading entries.
/// Part of the indexer's clearing step; user playlists are untouched.
pub async fn delete_imported(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM playlists WHERE is_user_created = 0")
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Append or insert one entry, keeping positions dense.
///
/// With no explicit position the entry lands at the end; an explicit
/// position shifts later entries up by one inside the same transaction.
/// Returns the position the entry was stored at.
pub async fn add_entry(
    pool: &SqlitePool,
    playlist_id: PlaylistId,
    track_id: Option<TrackId>,
    track_path: &str,
    position: Option<i64>,
) -> Result<i64> {
    let mut tx = pool.begin().await?;

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM playlist_entries WHERE playlist_id = ?")
            .bind(playlist_id)
            .fetch_one(&mut *tx)
            .await?;

    let position = position.map_or(count, |p| p.clamp(0, count));

    sqlx::query(
        "UPDATE playlist_entries SET position = position + 1
         WHERE playlist_id = ? AND position >= ?",
    )
    .bind(playlist_id)
    .bind(position)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO playlist_entries (playlist_id, track_id, track_path, position)
         VALUES (?, ?, ?, ?)",
    )
    .bind(playlist_id)
    .bind(track_id)
    .bind(track_path)
    .bind(position)
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE playlists SET updated_at = ? WHERE id = ?")
        .bind(chrono::Utc::now().timestamp())
        .bind(playlist_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(position)
}

/// Remove the entry at a position, compacting the ones after it.
/// Returns false when no entry sat at that position.
pub async fn remove_entry_at(
    pool: &SqlitePool,
    playlist_id: PlaylistId,
    position: i64,
) -> Result<bool> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query("DELETE FROM playlist_entries WHERE playlist_id = ? AND position = ?")
        .bind(playlist_id)
        .bind(position)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Ok(false);
    }

    // Rewrite each remaining position as the count of entries before it
    sqlx::query(
        "UPDATE playlist_entries
         SET position = (
             SELECT COUNT(*)
             FROM playlist_entries pe2
             WHERE pe2.playlist_id = playlist_entries.playlist_id
               AND pe2.position < playlist_entries.position
         )
         WHERE playlist_id = ?",
    )
    .bind(playlist_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE playlists SET updated_at = ? WHERE id = ?")
        .bind(chrono::Utc::now().timestamp())
        .bind(playlist_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(true)
}

/// Reorder a playlist by resolved track ids.
///
/// Listed tracks take the head positions in request order; entries not
/// listed (including unresolved ones) keep their relative order after them.
pub async fn reorder(
    pool: &SqlitePool,
    playlist_id: PlaylistId,
    track_ids: &[TrackId],
) -> Result<()> {
    let mut tx = pool.begin().await?;

    let rows = sqlx::query(
        "SELECT id, track_id FROM playlist_entries WHERE playlist_id = ? ORDER BY position",
    )
    .bind(playlist_id)
    .fetch_all(&mut *tx)
    .await?;

    let mut remaining: Vec<(i64, Option<i64>)> = rows
        .iter()
        .map(|row| (row.get("id"), row.get("track_id")))
        .collect();

    let mut ordered: Vec<i64> = Vec::with_capacity(remaining.len());
    for &track_id in track_ids {
        if let Some(index) = remaining
            .iter()
            .position(|(_, tid)| *tid == Some(track_id))
        {
            ordered.push(remaining.remove(index).0);
        }
    }
    ordered.extend(remaining.iter().map(|(entry_id, _)| *entry_id));

    for (position, entry_id) in ordered.iter().enumerate() {
        sqlx::query("UPDATE playlist_entries SET position = ? WHERE id = ?")
            .bind(position as i64)
            .bind(entry_id)
            .execute(&mut *tx)
            .await?;
    }

    sqlx::query("UPDATE playlists SET updated_at = ? WHERE id = ?")
        .bind(chrono::Utc::now().timestamp())
        .bind(playlist_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

/// Point every unresolved entry at the track whose catalog path matches its
/// stored raw path, where one exists. Runs after an indexing run rebuilds
/// the track table.
pub async fn resolve_entries(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query(
        "UPDATE playlist_entries
         SET track_id = (SELECT id FROM tracks WHERE tracks.file_path = playlist_entries.track_path)
         WHERE track_id IS NULL",
    )
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
