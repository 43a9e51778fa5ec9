//! Lexical path helpers
//!
//! The streaming endpoints and the playlist importer both need to reason
//! about paths that may not exist on disk yet (or must not be touched before
//! a containment decision is made), so these helpers work purely on path
//! components and never hit the filesystem. Symlink resolution is a separate
//! step owned by the caller.

use std::path::{Component, Path, PathBuf};

/// Normalize a path lexically: drop `.` components and fold `..` into the
/// preceding component where possible.
///
/// A `..` that would climb past the start of the path is dropped, so the
/// result of normalizing `root.join(untrusted)` can be checked with
/// [`is_contained`] to detect escape attempts.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Whether `path` lies within `root` after lexical normalization.
pub fn is_contained(path: &Path, root: &Path) -> bool {
    normalize(path).starts_with(normalize(root))
}

/// Re-express `path` relative to `root`, both normalized lexically.
///
/// Returns `None` when `path` does not lie within `root`.
pub fn relative_to(path: &Path, root: &Path) -> Option<PathBuf> {
    let path = normalize(path);
    let root = normalize(root);
    path.strip_prefix(&root).ok().map(Path::to_path_buf)
}
