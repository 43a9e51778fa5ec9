//! Tracks vertical slice
//!
//! The indexer writes tracks in batches (one transaction per batch); the
//! library endpoints read through the query helpers here. Readers during an
//! in-progress indexing run may observe a partially populated catalog; that
//! window is accepted.

use aria_core::types::{NewTrack, Track, TrackId};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::StorageError;

type Result<T> = std::result::Result<T, StorageError>;

const TRACK_COLUMNS: &str = "id, file_path, title, artist, album, album_artist, track_number, \
     disc_number, duration, year, genre, has_embedded_art, has_folder_art, folder_art_path, \
     file_size, file_format, last_modified, indexed_at";

pub(crate) fn track_from_row(row: &SqliteRow) -> Track {
    Track {
        id: row.get("id"),
        file_path: row.get("file_path"),
        title: row.get("title"),
        artist: row.get("artist"),
        album: row.get("album"),
        album_artist: row.get("album_artist"),
        track_number: row.get::<Option<i64>, _>("track_number").map(|n| n as u32),
        disc_number: row.get::<Option<i64>, _>("disc_number").map(|n| n as u32),
        duration: row.get("duration"),
        year: row.get::<Option<i64>, _>("year").map(|n| n as i32),
        genre: row.get("genre"),
        has_embedded_art: row.get::<i64, _>("has_embedded_art") != 0,
        has_folder_art: row.get::<i64, _>("has_folder_art") != 0,
        folder_art_path: row.get("folder_art_path"),
        file_size: row.get("file_size"),
        file_format: row.get("file_format"),
        last_modified: row.get("last_modified"),
        indexed_at: row.get("indexed_at"),
    }
}

/// Insert a batch of tracks in a single transaction.
///
/// Returns the number of rows written. The batch timestamp is shared so one
/// indexing run stamps every row it produced identically.
pub async fn insert_batch(pool: &SqlitePool, tracks: &[NewTrack]) -> Result<u64> {
    if tracks.is_empty() {
        return Ok(0);
    }

    let indexed_at = chrono::Utc::now().timestamp();
    let mut tx = pool.begin().await?;

    for track in tracks {
        sqlx::query(
            "INSERT OR REPLACE INTO tracks (file_path, title, artist, album, album_artist, \
             track_number, disc_number, duration, year, genre, has_embedded_art, \
             has_folder_art, folder_art_path, file_size, file_format, last_modified, indexed_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&track.file_path)
        .bind(&track.title)
        .bind(&track.artist)
        .bind(&track.album)
        .bind(&track.album_artist)
        .bind(track.track_number.map(i64::from))
        .bind(track.disc_number.map(i64::from))
        .bind(track.duration)
        .bind(track.year.map(i64::from))
        .bind(&track.genre)
        .bind(i64::from(track.has_embedded_art))
        .bind(i64::from(track.has_folder_art))
        .bind(&track.folder_art_path)
        .bind(track.file_size)
        .bind(&track.file_format)
        .bind(track.last_modified)
        .bind(indexed_at)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(tracks.len() as u64)
}

/// Get a track by id
pub async fn get_by_id(pool: &SqlitePool, id: TrackId) -> Result<Option<Track>> {
    let row = sqlx::query(&format!(
        "SELECT {TRACK_COLUMNS} FROM tracks WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| track_from_row(&row)))
}

/// Get a track by its library-relative path (the catalog key)
pub async fn get_by_path(pool: &SqlitePool, file_path: &str) -> Result<Option<Track>> {
    let row = sqlx::query(&format!(
        "SELECT {TRACK_COLUMNS} FROM tracks WHERE file_path = ?"
    ))
    .bind(file_path)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| track_from_row(&row)))
}

/// Point lookup of a track id by exact catalog path
pub async fn get_id_by_path(pool: &SqlitePool, file_path: &str) -> Result<Option<TrackId>> {
    let id = sqlx::query_scalar::<_, i64>("SELECT id FROM tracks WHERE file_path = ?")
        .bind(file_path)
        .fetch_optional(pool)
        .await?;

    Ok(id)
}

/// Filters for track listing
#[derive(Debug, Clone, Default)]
pub struct TrackQuery {
    /// Substring match across title/artist/album
    pub search: Option<String>,
    /// Exact artist match
    pub artist: Option<String>,
    /// Exact album match
    pub album: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

/// List tracks with optional filtering, ordered artist/album/track number.
pub async fn list(pool: &SqlitePool, query: &TrackQuery) -> Result<Vec<Track>> {
    let mut sql = format!("SELECT {TRACK_COLUMNS} FROM tracks");
    let mut clauses = Vec::new();

    if query.search.is_some() {
        clauses.push("(title LIKE ? OR artist LIKE ? OR album LIKE ?)");
    }
    if query.artist.is_some() {
        clauses.push("artist = ?");
    }
    if query.album.is_some() {
        clauses.push("album = ?");
    }
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY artist, album, track_number LIMIT ? OFFSET ?");

    let mut q = sqlx::query(&sql);
    if let Some(ref search) = query.search {
        let pattern = format!("%{}%", search);
        q = q.bind(pattern.clone()).bind(pattern.clone()).bind(pattern);
    }
    if let Some(ref artist) = query.artist {
        q = q.bind(artist.clone());
    }
    if let Some(ref album) = query.album {
        q = q.bind(album.clone());
    }

    let rows = q.bind(query.limit).bind(query.offset).fetch_all(pool).await?;
    Ok(rows.iter().map(track_from_row).collect())
}

/// Tracks whose title matches a substring (for the search endpoint)
pub async fn search_by_title(pool: &SqlitePool, term: &str, limit: i64) -> Result<Vec<Track>> {
    let pattern = format!("%{}%", term);
    let rows = sqlx::query(&format!(
        "SELECT {TRACK_COLUMNS} FROM tracks WHERE title LIKE ? LIMIT ?"
    ))
    .bind(pattern)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(track_from_row).collect())
}

/// Distinct artist names matching a substring
pub async fn distinct_artists(pool: &SqlitePool, term: &str, limit: i64) -> Result<Vec<String>> {
    let pattern = format!("%{}%", term);
    let rows = sqlx::query(
        "SELECT DISTINCT artist FROM tracks WHERE artist LIKE ? AND artist IS NOT NULL LIMIT ?",
    )
    .bind(pattern)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(|row| row.get("artist")).collect())
}

/// Distinct (album, artist) pairs matching a substring
pub async fn distinct_albums(
    pool: &SqlitePool,
    term: &str,
    limit: i64,
) -> Result<Vec<(String, Option<String>)>> {
    let pattern = format!("%{}%", term);
    let rows = sqlx::query(
        "SELECT DISTINCT album, artist FROM tracks WHERE album LIKE ? AND album IS NOT NULL LIMIT ?",
    )
    .bind(pattern)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| (row.get("album"), row.get("artist")))
        .collect())
}

/// Aggregate library statistics
#[derive(Debug, Clone, Serialize)]
pub struct LibraryStats {
    pub tracks: i64,
    pub artists: i64,
    pub albums: i64,
    /// Sum of known track durations, in seconds
    pub total_duration: f64,
}

/// Count tracks, distinct artists/albums, and total duration.
pub async fn stats(pool: &SqlitePool) -> Result<LibraryStats> {
    let tracks = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tracks")
        .fetch_one(pool)
        .await?;

    let artists = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(DISTINCT artist) FROM tracks WHERE artist IS NOT NULL",
    )
    .fetch_one(pool)
    .await?;

    let albums = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(DISTINCT album) FROM tracks WHERE album IS NOT NULL",
    )
    .fetch_one(pool)
    .await?;

    let total_duration = sqlx::query_scalar::<_, f64>(
        "SELECT COALESCE(SUM(duration), 0.0) FROM tracks WHERE duration IS NOT NULL",
    )
    .fetch_one(pool)
    .await?;

    Ok(LibraryStats {
        tracks,
        artists,
        albums,
        total_duration,
    })
}

/// Artist listing row
#[derive(Debug, Clone, Serialize)]
pub struct ArtistRow {
    pub name: String,
    pub track_count: i64,
}

/// Artists with per-artist track counts, alphabetical.
pub async fn artists(
    pool: &SqlitePool,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<ArtistRow>> {
    let mut sql = String::from(
        "SELECT artist, COUNT(id) AS track_count FROM tracks WHERE artist IS NOT NULL",
    );
    if search.is_some() {
        sql.push_str(" AND artist LIKE ?");
    }
    sql.push_str(" GROUP BY artist ORDER BY artist LIMIT ? OFFSET ?");

    let mut q = sqlx::query(&sql);
    if let Some(term) = search {
        q = q.bind(format!("%{}%", term));
    }
    let rows = q.bind(limit).bind(offset).fetch_all(pool).await?;

    Ok(rows
        .iter()
        .map(|row| ArtistRow {
            name: row.get("artist"),
            track_count: row.get("track_count"),
        })
        .collect())
}

/// Album listing row (grouped aggregate, not a table of its own)
#[derive(Debug, Clone, Serialize)]
pub struct AlbumRow {
    pub name: Option<String>,
    pub artist: Option<String>,
    pub album_artist: Option<String>,
    pub track_count: i64,
    pub year: Option<i64>,
}

/// Albums with track counts and first-seen year, alphabetical.
pub async fn albums(
    pool: &SqlitePool,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<AlbumRow>> {
    let mut sql = String::from(
        "SELECT album, artist, album_artist, COUNT(id) AS track_count, MIN(year) AS year \
         FROM tracks WHERE album IS NOT NULL",
    );
    if search.is_some() {
        sql.push_str(" AND album LIKE ?");
    }
    sql.push_str(" GROUP BY album, artist, album_artist ORDER BY album LIMIT ? OFFSET ?");

    let mut q = sqlx::query(&sql);
    if let Some(term) = search {
        q = q.bind(format!("%{}%", term));
    }
    let rows = q.bind(limit).bind(offset).fetch_all(pool).await?;

    Ok(rows
        .iter()
        .map(|row| AlbumRow {
            name: row.get("album"),
            artist: row.get("artist"),
            album_artist: row.get("album_artist"),
            track_count: row.get("track_count"),
            year: row.get("year"),
        })
        .collect())
}

/// Albums by one artist, ordered by year then name.
pub async fn albums_for_artist(pool: &SqlitePool, artist: &str) -> Result<Vec<AlbumRow>> {
    let rows = sqlx::query(
        "SELECT album, album_artist, COUNT(id) AS track_count, MIN(year) AS year \
         FROM tracks WHERE artist = ? \
         GROUP BY album, album_artist ORDER BY year, album",
    )
    .bind(artist)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| AlbumRow {
            name: row.get("album"),
            artist: Some(artist.to_string()),
            album_artist: row.get("album_artist"),
            track_count: row.get("track_count"),
            year: row.get("year"),
        })
        .collect())
}

/// Tracks in an album, in disc/track/title order.
pub async fn tracks_for_album(
    pool: &SqlitePool,
    album: &str,
    artist: Option<&str>,
) -> Result<Vec<Track>> {
    let mut sql = format!("SELECT {TRACK_COLUMNS} FROM tracks WHERE album = ?");
    if artist.is_some() {
        sql.push_str(" AND artist = ?");
    }
    sql.push_str(" ORDER BY disc_number, track_number, title");

    let mut q = sqlx::query(&sql).bind(album);
    if let Some(artist) = artist {
        q = q.bind(artist);
    }
    let rows = q.fetch_all(pool).await?;

    Ok(rows.iter().map(track_from_row).collect())
}

/// Remove every track. Used by the indexer's clearing step; playlist entry
/// links are nulled out by the `ON DELETE SET NULL` constraint.
pub async fn delete_all(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM tracks").execute(pool).await?;
    Ok(result.rows_affected())
}
