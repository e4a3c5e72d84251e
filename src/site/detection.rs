//! Locating the `search/` directory of a Doxygen HTML output tree.
//!
//! Users point at whatever they have at hand: the project root, the `docs`
//! folder, the HTML output folder, or the `search` folder itself.

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Subdirectories checked below a candidate directory, in order.
const SEARCH_DIR_CANDIDATES: &[&str] = &[
    "search",
    "html/search",
    "docs/search",
    "docs/html/search",
    "doc/html/search",
    "doc/search",
];

/// How many parent directories auto-detection may climb.
const MAX_PARENT_DEPTH: usize = 2;

/// Whether `dir` looks like a Doxygen search directory.
///
/// Requires `searchdata.js` or at least one `<name>_<n>.js` data file.
pub fn is_search_dir(dir: &Path) -> bool {
    if !dir.is_dir() {
        return false;
    }
    if dir.join("searchdata.js").is_file() {
        return true;
    }
    std::fs::read_dir(dir)
        .map(|entries| {
            entries.filter_map(Result::ok).any(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| super::loader::data_file_stem(name).is_some())
            })
        })
        .unwrap_or(false)
}

/// Resolves `start` (a search directory or any ancestor layout) to a search directory.
pub fn find_search_dir(start: &Path) -> Option<PathBuf> {
    if is_search_dir(start) {
        return Some(start.to_path_buf());
    }
    SEARCH_DIR_CANDIDATES
        .iter()
        .map(|candidate| start.join(candidate))
        .find(|dir| is_search_dir(dir))
}

/// Resolves a path the user named explicitly. Never looks above `path`.
pub fn resolve_search_dir(path: &Path) -> Option<PathBuf> {
    let found = find_search_dir(path)?;
    std::fs::canonicalize(&found).ok().or(Some(found))
}

/// Detects a search directory from `start`, climbing at most two parents.
///
/// Only for auto-detection; explicit paths go through [`resolve_search_dir`].
pub fn detect_search_dir(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);
    for depth in 0..=MAX_PARENT_DEPTH {
        let dir = current?;
        if let Some(found) = resolve_search_dir(dir) {
            debug!("Found search index at {} (depth {})", found.display(), depth);
            return Some(found);
        }
        current = dir.parent();
    }
    debug!("No search index found from {}", start.display());
    None
}

/// Expands tilde (`~`) in a path to the user's home directory.
///
/// - `~/foo` becomes `/home/user/foo`
/// - `~` becomes `/home/user`
/// - Other paths are returned unchanged
pub fn expand_tilde(path: &str) -> Cow<'_, str> {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return Cow::Owned(home.join(stripped).display().to_string());
        }
    } else if path == "~"
        && let Some(home) = dirs::home_dir()
    {
        return Cow::Owned(home.display().to_string());
    }
    Cow::Borrowed(path)
}
