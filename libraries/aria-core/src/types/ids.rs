//! ID aliases for Aria entities
//!
//! Catalog rows are keyed by SQLite rowids; the aliases keep signatures
//! readable without wrapper-type ceremony.

/// Track identifier (SQLite rowid)
pub type TrackId = i64;

/// Playlist identifier (SQLite rowid)
pub type PlaylistId = i64;
