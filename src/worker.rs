//! Shared site state and the background rescan loop.
//!
//! Tool handlers fetch sites through [`DocState::get_site`], which serves the
//! LRU, joins an in-flight load, or starts one. The [`BackgroundWorker`]
//! keeps the current documentation root loaded and reloads it when its data
//! files change on disk.

use crate::cache::SiteCache;
use crate::config::Config;
use crate::site::{
    SearchSite, expand_tilde, fingerprint, resolve_search_dir,
};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use lru::LruCache;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::time::interval;
use tokio_util::sync::CancellationToken;

/// Type alias for shared site load futures.
type SharedSiteFuture = Shared<BoxFuture<'static, Result<Arc<SearchSite>, String>>>;

/// Shared state for loaded documentation sites.
pub struct DocState {
    /// Loaded sites keyed by search directory
    cache: RwLock<LruCache<PathBuf, Arc<SearchSite>>>,

    /// In-flight loads (can be awaited by multiple callers)
    in_flight: Mutex<HashMap<PathBuf, SharedSiteFuture>>,

    /// Search directory that tools query
    docs_root: RwLock<Option<PathBuf>>,

    snapshots: Option<SiteCache>,
    config: Config,
}

impl std::fmt::Debug for DocState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocState")
            .field("cache_size", &self.cache.try_read().map(|c| c.len()).ok())
            .field("docs_root", &self.docs_root.try_read().ok().and_then(|r| r.clone()))
            .field("snapshots", &self.snapshots)
            .finish_non_exhaustive()
    }
}

impl DocState {
    pub fn new(config: Config) -> Self {
        let size = NonZeroUsize::new(config.cache.lru_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: RwLock::new(LruCache::new(size)),
            in_flight: Mutex::new(HashMap::new()),
            docs_root: RwLock::new(None),
            snapshots: config.site_cache(),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the current search directory.
    pub async fn docs_root(&self) -> Option<PathBuf> {
        self.docs_root.read().await.clone()
    }

    /// Resolves `path` to a search directory and makes it current.
    ///
    /// Returns the resolved directory and whether it differs from the previous one.
    pub async fn set_docs_root(&self, path: &str) -> Result<(PathBuf, bool), String> {
        let expanded = PathBuf::from(expand_tilde(path).as_ref());
        if !expanded.exists() {
            return Err(format!("Path does not exist: {}", expanded.display()));
        }
        let dir = resolve_search_dir(&expanded).ok_or_else(|| {
            format!(
                "No Doxygen search index found at {}. Expected a directory containing \
                 searchdata.js or files like all_0.js (usually html/search).",
                expanded.display()
            )
        })?;

        let mut current = self.docs_root.write().await;
        let changed = current.as_deref() != Some(dir.as_path());
        *current = Some(dir.clone());
        if changed {
            tracing::info!("Documentation root set to {}", dir.display());
        }
        Ok((dir, changed))
    }

    /// Loads the site for the current documentation root.
    pub async fn current_site(&self) -> Result<Arc<SearchSite>, String> {
        let root = self.docs_root().await.ok_or_else(|| {
            "No documentation configured. Use set_docs_root with the path of a Doxygen \
             HTML output directory."
                .to_string()
        })?;
        self.get_site(&root).await
    }

    /// Get a site, waiting for an in-flight load if needed.
    pub async fn get_site(&self, dir: &Path) -> Result<Arc<SearchSite>, String> {
        {
            let mut cache = self.cache.write().await;
            if let Some(site) = cache.get(dir) {
                tracing::debug!("Cache hit for {}", dir.display());
                return Ok(site.clone());
            }
        }

        let future = {
            let mut in_flight = self.in_flight.lock().await;
            if let Some(future) = in_flight.get(dir) {
                tracing::debug!("Awaiting in-flight load for {}", dir.display());
                future.clone()
            } else {
                let future = self.load_future(dir.to_path_buf());
                in_flight.insert(dir.to_path_buf(), future.clone());
                future
            }
        };

        let result = future.clone().await;

        self.finish_load(dir, &future).await;
        if let Ok(site) = &result {
            self.cache.write().await.put(dir.to_path_buf(), site.clone());
        }
        result
    }

    /// Clears the in-flight slot for `dir` if it still holds `future`.
    ///
    /// A newer load may have taken the slot after an invalidate.
    async fn finish_load(&self, dir: &Path, future: &SharedSiteFuture) {
        let mut in_flight = self.in_flight.lock().await;
        if in_flight.get(dir).is_some_and(|current| current.ptr_eq(future)) {
            in_flight.remove(dir);
        }
    }

    fn load_future(&self, dir: PathBuf) -> SharedSiteFuture {
        let snapshots = self.snapshots.clone();
        let future: BoxFuture<'static, Result<Arc<SearchSite>, String>> = Box::pin(async move {
            tracing::info!("Loading search index from {}", dir.display());
            tokio::task::spawn_blocking(move || SearchSite::open(&dir, snapshots.as_ref()))
                .await
                .map_err(|e| format!("Load task failed: {}", e))?
                .map(Arc::new)
                .map_err(|e| format!("{:#}", e))
        });
        future.shared()
    }

    /// Drops a loaded site so the next request reloads it.
    pub async fn invalidate(&self, dir: &Path) {
        self.cache.write().await.pop(dir);
    }

    /// Check if a site is loaded.
    pub async fn is_cached(&self, dir: &Path) -> bool {
        self.cache.read().await.contains(dir)
    }

    /// Get a loaded site without triggering a load.
    pub async fn get_cached(&self, dir: &Path) -> Option<Arc<SearchSite>> {
        self.cache.write().await.get(dir).cloned()
    }

    /// Check if a load is in progress.
    pub async fn is_loading(&self, dir: &Path) -> bool {
        self.in_flight.lock().await.contains_key(dir)
    }
}

/// Keeps the current documentation root loaded and fresh.
pub struct BackgroundWorker {
    state: Arc<DocState>,
    cancel: CancellationToken,
}

impl BackgroundWorker {
    pub fn new(state: Arc<DocState>, cancel: CancellationToken) -> Self {
        Self { state, cancel }
    }

    /// Rescans until cancelled.
    pub async fn run(&self) {
        let mut ticker = interval(self.state.config().worker.rescan_interval());
        loop {
            tokio::select! {
                () = self.cancel.cancelled() => {
                    tracing::debug!("Background worker stopped");
                    return;
                }
                _ = ticker.tick() => self.rescan().await,
            }
        }
    }

    /// One cycle: pick a root if none is set, then reload it if it changed.
    pub async fn rescan(&self) {
        let root = match self.state.docs_root().await {
            Some(root) => root,
            None => match self.detect_root().await {
                Some(root) => root,
                None => {
                    tracing::trace!("No documentation root detected");
                    return;
                }
            },
        };

        if let Some(site) = self.state.get_cached(&root).await {
            let dir = root.clone();
            let current = tokio::task::spawn_blocking(move || fingerprint(&dir)).await;
            match current {
                Ok(Ok(current)) if current == site.fingerprint() => return,
                Ok(Ok(current)) => {
                    tracing::info!(
                        "Search data in {} changed ({} -> {}), reloading",
                        root.display(),
                        site.fingerprint(),
                        current
                    );
                    self.state.invalidate(&root).await;
                }
                Ok(Err(e)) => {
                    tracing::warn!("Failed to fingerprint {}: {:#}", root.display(), e);
                    return;
                }
                Err(e) => {
                    tracing::warn!("Fingerprint task failed: {}", e);
                    return;
                }
            }
        }

        if let Err(e) = self.state.get_site(&root).await {
            tracing::warn!("Background load failed for {}: {}", root.display(), e);
        }
    }

    /// Configured `docs_root`, else the working directory.
    async fn detect_root(&self) -> Option<PathBuf> {
        let start = match &self.state.config().docs_root {
            Some(root) => root.clone(),
            None => std::env::current_dir().ok()?,
        };
        match self.state.set_docs_root(&start.display().to_string()).await {
            Ok((root, _)) => Some(root),
            Err(e) => {
                tracing::trace!("Auto-detection from {} failed: {}", start.display(), e);
                None
            }
        }
    }
}

/// Spawn the background worker as a tokio task.
pub fn spawn_background_worker(
    state: Arc<DocState>,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        BackgroundWorker::new(state, cancel).run().await;
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use tempfile::TempDir;

    const DATA: &str = "var searchData=\n[\n  ['average_0',['average',['../opts.html#a1',1,'Options']]]\n];\n";

    fn config() -> Config {
        let mut config = Config::default();
        config.cache.enabled = false;
        config
    }

    fn docs() -> TempDir {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("html/search")).unwrap();
        std::fs::write(temp.path().join("html/search/all_0.js"), DATA).unwrap();
        temp
    }

    #[tokio::test]
    async fn test_doc_state_new() {
        let state = DocState::new(config());
        check!(state.docs_root().await.is_none());
        let_assert!(Err(msg) = state.current_site().await);
        check!(msg.contains("set_docs_root"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_set_docs_root_detects_and_caches() {
        let temp = docs();
        let state = DocState::new(config());

        let (root, changed) = state.set_docs_root(&temp.path().display().to_string()).await.unwrap();
        check!(changed);
        check!(root.ends_with("html/search"));

        let site = state.current_site().await.unwrap();
        check!(site.entry_count() == 1);
        check!(state.is_cached(&root).await);
        check!(!state.is_loading(&root).await);

        let (_, changed) = state.set_docs_root(&root.display().to_string()).await.unwrap();
        check!(!changed);
    }

    #[tokio::test]
    async fn test_set_docs_root_rejects_missing_index() {
        let temp = TempDir::new().unwrap();
        let state = DocState::new(config());
        let_assert!(Err(msg) = state.set_docs_root(&temp.path().display().to_string()).await);
        check!(msg.contains("No Doxygen search index"));
    }

    #[tokio::test]
    async fn test_set_docs_root_does_not_climb_to_parent_index() {
        let temp = docs();
        std::fs::create_dir_all(temp.path().join("empty")).unwrap();
        let state = DocState::new(config());

        let path = temp.path().join("empty").display().to_string();
        let_assert!(Err(msg) = state.set_docs_root(&path).await);
        check!(msg.contains("No Doxygen search index"));
        check!(state.docs_root().await.is_none());
    }

    #[tokio::test]
    async fn test_finished_load_keeps_newer_in_flight_entry() {
        let temp = docs();
        let state = DocState::new(config());
        let root = temp.path().join("html/search");

        let older = state.load_future(root.clone());
        let newer = state.load_future(root.clone());
        state.in_flight.lock().await.insert(root.clone(), newer.clone());

        state.finish_load(&root, &older).await;
        check!(state.is_loading(&root).await);

        state.finish_load(&root, &newer).await;
        check!(!state.is_loading(&root).await);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_loads_share_one_site() {
        let temp = docs();
        let state = Arc::new(DocState::new(config()));
        let (root, _) = state.set_docs_root(&temp.path().display().to_string()).await.unwrap();

        let (a, b) = tokio::join!(state.get_site(&root), state.get_site(&root));
        check!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_rescan_reloads_changed_data() {
        let temp = docs();
        let state = Arc::new(DocState::new(config()));
        let (root, _) = state.set_docs_root(&temp.path().display().to_string()).await.unwrap();
        let before = state.current_site().await.unwrap();

        std::fs::write(
            root.join("all_1.js"),
            "var searchData=\n[\n  ['bias_0',['bias',['../b.html',1,'']]]\n];\n",
        )
        .unwrap();

        let worker = BackgroundWorker::new(state.clone(), CancellationToken::new());
        worker.rescan().await;

        let after = state.current_site().await.unwrap();
        check!(!Arc::ptr_eq(&before, &after));
        check!(after.entry_count() == 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_worker_stops_on_cancel() {
        let state = Arc::new(DocState::new(config()));
        let cancel = CancellationToken::new();
        let handle = spawn_background_worker(state, cancel.clone());
        cancel.cancel();
        check!(handle.await.is_ok());
    }
}
