//! Aria Storage
//!
//! `SQLite` catalog store for the Aria media server.
//!
//! This crate provides persistent storage for tracks, playlists, and the
//! indexing status row.
//!
//! # Architecture
//!
//! - **Vertical Slicing**: each feature owns its own queries and logic
//!   (`tracks`, `playlists`, `index_status`)
//! - **Runtime Queries**: queries bind at runtime, so building the crate
//!   never needs a database
//! - **Batched Writes**: the indexer commits track batches in single
//!   transactions for incremental durability
//!
//! # Example
//!
//! ```rust,no_run
//! use aria_storage::{create_pool, run_migrations};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://aria.db").await?;
//! run_migrations(&pool).await?;
//!
//! let stats = aria_storage::tracks::stats(&pool).await?;
//! println!("{} tracks", stats.tracks);
//! # Ok(())
//! # }
//! ```

mod error;

// Vertical slices
pub mod index_status;
pub mod playlists;
pub mod tracks;

pub use error::StorageError;

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// This should be called once when the application starts to ensure
/// the database schema is up to date.
///
/// # Errors
///
/// Returns an error if migrations fail to run
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `<sqlite://aria.db>`)
///
/// # Errors
///
/// Returns an error if the connection fails
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    // Parse the URL into options so we can configure SQLite behavior
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true) // Create database file if it doesn't exist
        .journal_mode(SqliteJournalMode::Wal) // Use WAL mode for better concurrency
        .foreign_keys(true) // Entry links rely on ON DELETE CASCADE / SET NULL
        .busy_timeout(std::time::Duration::from_secs(30)); // Wait up to 30s for locks

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}
