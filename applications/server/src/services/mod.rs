/// Service objects owned by the application
pub mod renderers;
