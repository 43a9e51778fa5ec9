//! Aria Metadata
//!
//! Audio tag extraction for the library indexer and the art endpoints.
//!
//! - [`reader::TagReader`] parses one audio file into a normalized
//!   [`reader::FileTags`] record, trying an ordered list of key aliases per
//!   field across whatever tag dialects the file carries
//! - [`fallback`] derives title/artist/album from the directory structure
//!   when tags are absent or incomplete
//! - [`art`] finds folder cover images and extracts embedded pictures

#![forbid(unsafe_code)]

pub mod art;
pub mod error;
pub mod fallback;
pub mod reader;

pub use art::{find_folder_art, ArtExtractor, ArtworkData, FOLDER_ART_NAMES};
pub use error::MetadataError;
pub use fallback::apply_path_fallback;
pub use reader::{FileTags, TagReader};

/// Result type alias using `MetadataError`
pub type Result<T> = std::result::Result<T, MetadataError>;
