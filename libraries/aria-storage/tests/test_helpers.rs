//! Test helpers and fixtures for storage integration tests
//!
//! These helpers create test databases using REAL SQLite files (NOT in-memory)
//! to match production behavior and properly test migrations, constraints, and
//! indexes.

use aria_core::types::NewTrack;
use sqlx::SqlitePool;
use tempfile::TempDir;

/// Test database wrapper that cleans up on drop
pub struct TestDb {
    pub pool: SqlitePool,
    _temp_dir: TempDir,
}

impl TestDb {
    /// Create a new test database with migrations applied
    pub async fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");
        let db_url = format!("sqlite://{}", db_path.display());

        let pool = aria_storage::create_pool(&db_url)
            .await
            .expect("Failed to create pool");

        aria_storage::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        Self {
            pool,
            _temp_dir: temp_dir,
        }
    }

    /// Get the pool reference
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Test fixture: a bare track with just a path and title
pub fn new_track(file_path: &str, title: &str) -> NewTrack {
    NewTrack {
        file_path: file_path.to_string(),
        title: title.to_string(),
        artist: None,
        album: None,
        album_artist: None,
        track_number: None,
        disc_number: None,
        duration: None,
        year: None,
        genre: None,
        has_embedded_art: false,
        has_folder_art: false,
        folder_art_path: None,
        file_size: 0,
        file_format: "mp3".to_string(),
        last_modified: None,
    }
}

/// Test fixture: a track with artist/album/duration filled in
pub fn tagged_track(
    file_path: &str,
    title: &str,
    artist: &str,
    album: &str,
    duration: f64,
) -> NewTrack {
    let mut track = new_track(file_path, title);
    track.artist = Some(artist.to_string());
    track.album = Some(album.to_string());
    track.duration = Some(duration);
    track
}
