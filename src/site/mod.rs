//! A Doxygen HTML output's `search/` directory as one queryable site.

pub mod detection;
pub mod loader;

pub use detection::{
    detect_search_dir, expand_tilde, find_search_dir, is_search_dir, resolve_search_dir,
};
pub use loader::{DEFAULT_SECTION, DataFile, Hit, SearchSite, fingerprint};
