//! Shared test fixtures and utilities for integration tests.
//!
//! # Test Isolation Strategy
//!
//! Tests never query `tests/fixtures/` in place. Each test gets:
//! - A fresh temporary directory with the fixture search files copied in
//! - Its own `DocState` with an empty in-memory LRU cache
//! - Snapshot caching pointed into the same temporary directory
//!
//! # Available Fixtures
//!
//! - `isolated_docs`: the sample `search/` directory with `searchdata.js`
//! - `isolated_docs_without_metadata`: the same data files, no `searchdata.js`

use doxsearch::{Config, DocState};
use rstest::fixture;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Returns the project root directory (where Cargo.toml lives).
pub fn project_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Directory holding the sample Doxygen search files.
#[allow(dead_code)] // Used by some integration test crates only
pub fn fixture_search_dir() -> PathBuf {
    project_root().join("tests/fixtures/docs/search")
}

/// Contents of the sample `all_0.js`.
#[allow(dead_code)] // Used by some integration test crates only
pub fn sample_all_0() -> String {
    std::fs::read_to_string(fixture_search_dir().join("all_0.js"))
        .expect("Failed to read sample all_0.js")
}

/// A temporary directory for test isolation.
///
/// Provides basic filesystem operations within a temp directory that is
/// automatically cleaned up when dropped.
///
/// # Example
///
/// ```ignore
/// let workspace = TempWorkspace::new();
/// workspace.create_file("html/search/all_0.js", "var searchData=\n[\n];\n");
/// assert!(workspace.path().join("html/search/all_0.js").exists());
/// ```
#[allow(dead_code)] // Methods used across different integration test crates
pub struct TempWorkspace {
    _temp: TempDir,
    root: PathBuf,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl TempWorkspace {
    /// Creates a new empty temporary workspace.
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().to_path_buf();
        Self { _temp: temp, root }
    }

    /// Returns the root path of this workspace.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Creates a directory (and all parent directories) within this workspace.
    pub fn create_dir(&self, path: &str) {
        let full_path = self.root.join(path);
        std::fs::create_dir_all(&full_path)
            .unwrap_or_else(|e| panic!("Failed to create directory '{}': {}", path, e));
    }

    /// Creates a file with the given content, creating parent directories.
    pub fn create_file(&self, path: &str, content: &str) {
        let full_path = self.root.join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap_or_else(|e| {
                panic!("Failed to create parent directory for '{}': {}", path, e)
            });
        }
        std::fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("Failed to write file '{}': {}", path, e));
    }

    /// Copies a file from the real filesystem into this workspace.
    pub fn copy_file(&self, source: &Path, dest_relative: &str) {
        let dest = self.root.join(dest_relative);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).unwrap_or_else(|e| {
                panic!(
                    "Failed to create parent directory for '{}': {}",
                    dest_relative, e
                )
            });
        }
        std::fs::copy(source, &dest).unwrap_or_else(|e| {
            panic!(
                "Failed to copy '{}' to '{}': {}",
                source.display(),
                dest_relative,
                e
            )
        });
    }

    /// Reads a file relative to this workspace.
    pub fn read_file(&self, path: &str) -> String {
        std::fs::read_to_string(self.root.join(path))
            .unwrap_or_else(|e| panic!("Failed to read '{}': {}", path, e))
    }
}

impl Default for TempWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// A copy of the sample documentation with its own `DocState`.
///
/// The layout is `<temp>/html/search/*.js`, so tools can be pointed at the
/// temp root and must detect the search folder themselves.
#[allow(dead_code)] // Fields used across different integration test crates
pub struct IsolatedDocs {
    pub workspace: TempWorkspace,
    pub state: Arc<DocState>,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl IsolatedDocs {
    pub fn new(with_metadata: bool) -> Self {
        doxsearch::tracing::init();
        let workspace = TempWorkspace::new();
        workspace.copy_file(&fixture_search_dir().join("all_0.js"), "html/search/all_0.js");
        if with_metadata {
            workspace.copy_file(
                &fixture_search_dir().join("searchdata.js"),
                "html/search/searchdata.js",
            );
        }
        let state = Arc::new(DocState::new(test_config(workspace.path())));
        Self { workspace, state }
    }

    /// Root the tools should be pointed at.
    pub fn root(&self) -> &Path {
        self.workspace.path()
    }

    pub fn search_dir(&self) -> PathBuf {
        self.workspace.path().join("html/search")
    }

    /// Points the state at this copy and waits for it to load.
    pub async fn select(&self) {
        self.state
            .set_docs_root(&self.root().display().to_string())
            .await
            .expect("sample docs should be detected");
        self.state
            .current_site()
            .await
            .expect("sample docs should load");
    }
}

/// Configuration with snapshots written below `root`.
pub fn test_config(root: &Path) -> Config {
    let mut config = Config::default();
    config.cache.dir = Some(root.join(".cache"));
    config
}

/// The sample documentation with `searchdata.js`.
#[fixture]
pub fn isolated_docs() -> IsolatedDocs {
    IsolatedDocs::new(true)
}

/// The sample documentation without `searchdata.js`.
#[fixture]
pub fn isolated_docs_without_metadata() -> IsolatedDocs {
    IsolatedDocs::new(false)
}
