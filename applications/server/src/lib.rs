//! Aria Server Library
//!
//! Local music streaming server: catalog queries, playlist management,
//! range-aware file/art streaming, and renderer proxying over HTTP.
//!
//! This library exposes the core components for testing purposes.

pub mod api;
pub mod config;
pub mod error;
pub mod router;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use router::create_router;
pub use state::AppState;
