//! `doxsearch.toml` configuration.

use crate::cache::SiteCache;
use crate::error::Result;
use crate::site::expand_tilde;
use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming a configuration file.
pub const CONFIG_ENV: &str = "DOXSEARCH_CONFIG";

/// Configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "doxsearch.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Documentation root; auto-detected from the working directory when unset.
    pub docs_root: Option<PathBuf>,
    pub search: SearchConfig,
    pub cache: CacheConfig,
    pub worker: WorkerConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    pub default_limit: usize,
    /// Minimum Jaro-Winkler similarity for "did you mean" suggestions.
    pub suggestion_threshold: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            suggestion_threshold: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Parent of the `doxsearch` snapshot directory; defaults to the user cache dir.
    pub dir: Option<PathBuf>,
    /// Number of loaded sites kept in memory.
    pub lru_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
            lru_size: 16,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkerConfig {
    pub rescan_interval_secs: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            rescan_interval_secs: 5,
        }
    }
}

impl WorkerConfig {
    pub fn rescan_interval(&self) -> Duration {
        Duration::from_secs(self.rescan_interval_secs.max(1))
    }
}

impl Config {
    /// Parses a configuration document and expands `~` in paths.
    pub fn parse(src: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(src).context("Invalid configuration")?;
        config.docs_root = config.docs_root.map(expand_path);
        config.cache.dir = config.cache.dir.map(expand_path);
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let src = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::parse(&src).with_context(|| format!("In {}", path.display()))
    }

    /// Loads from `explicit`, then `$DOXSEARCH_CONFIG`, then `./doxsearch.toml`.
    ///
    /// Falls back to defaults when none of them exist. An explicitly named file
    /// that is missing is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::from_file(Path::new(&path));
        }
        let local = Path::new(CONFIG_FILE);
        if local.is_file() {
            return Self::from_file(local);
        }
        tracing::debug!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Snapshot store, or `None` when caching is disabled or no cache dir exists.
    pub fn site_cache(&self) -> Option<SiteCache> {
        if !self.cache.enabled {
            return None;
        }
        match &self.cache.dir {
            Some(dir) => Some(SiteCache::new(dir.join("doxsearch"))),
            None => SiteCache::default_dir().map(SiteCache::new),
        }
    }
}

fn expand_path(path: PathBuf) -> PathBuf {
    match path.to_str() {
        Some(s) => PathBuf::from(expand_tilde(s).as_ref()),
        None => path,
    }
}
