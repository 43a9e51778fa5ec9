//! M3U playlist parsing and rendering
//!
//! Parsing is line-oriented: blank lines and `#` directive/comment lines are
//! skipped, every other line is a track path. Relative lines resolve against
//! the playlist file's own directory and are then re-expressed relative to
//! the library root; when that fails (the line points outside the library)
//! the literal line is kept so the entry can still display and be re-resolved
//! later. Rendering writes the `#EXTM3U` format the importer reads back.

use aria_core::paths;
use std::path::Path;

/// A parsed playlist file: its name and the catalog paths of its lines.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPlaylist {
    /// Playlist name (the file stem)
    pub name: String,
    /// One path per kept line, in order. Library-relative where the line
    /// could be re-expressed against the root, verbatim otherwise.
    pub paths: Vec<String>,
}

/// Parse a playlist file's text content.
///
/// `playlist_path` is the playlist file's own (absolute) path, used both for
/// the name and to resolve relative lines; `library_root` anchors the
/// re-expression of resolved paths.
pub fn parse(content: &str, playlist_path: &Path, library_root: &Path) -> ParsedPlaylist {
    let name = playlist_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("playlist")
        .to_string();
    let playlist_dir = playlist_path.parent().unwrap_or_else(|| Path::new(""));

    let mut paths = Vec::new();
    for line in content.lines() {
        let line = line.trim();

        // Skip blanks, comments, and #EXTINF-style directives
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if Path::new(line).is_absolute() {
            paths.push(line.to_string());
            continue;
        }

        let resolved = paths::normalize(&playlist_dir.join(line));
        match paths::relative_to(&resolved, library_root) {
            Some(rel) => paths.push(rel.to_string_lossy().into_owned()),
            None => paths.push(line.to_string()),
        }
    }

    ParsedPlaylist { name, paths }
}

/// One line of a rendered playlist
#[derive(Debug, Clone)]
pub enum M3uLine<'a> {
    /// An entry resolved against the catalog: gets an `#EXTINF` directive
    Resolved {
        /// Track duration in seconds (-1 when unknown)
        duration: Option<f64>,
        /// Artist for the display title
        artist: Option<&'a str>,
        /// Track title
        title: &'a str,
        /// Catalog path written as the entry line
        path: &'a str,
    },
    /// An unresolved entry: its raw path alone
    Raw(&'a str),
}

/// Render playlist lines as `#EXTM3U` text.
pub fn render(lines: &[M3uLine<'_>]) -> String {
    let mut out = vec!["#EXTM3U".to_string()];

    for line in lines {
        match line {
            M3uLine::Resolved {
                duration,
                artist,
                title,
                path,
            } => {
                let seconds = duration.map_or(-1, |d| d as i64);
                let artist = artist.unwrap_or("");
                out.push(format!("#EXTINF:{seconds},{artist} - {title}"));
                out.push((*path).to_string());
            }
            M3uLine::Raw(path) => out.push((*path).to_string()),
        }
    }

    out.join("\n")
}
