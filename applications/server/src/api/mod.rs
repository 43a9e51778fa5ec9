/// API route modules
pub mod health;
pub mod library;
pub mod playlists;
pub mod renderers;
pub mod stream;
