//! Persisted site snapshots keyed by a content fingerprint.
//!
//! Parsing a large Doxygen search directory and building its full-text index
//! takes a while, so loaded sites are written to the user cache directory with
//! postcard. A snapshot is only used while the fingerprint of the directory it
//! came from still matches.

use crate::error::Result;
use crate::site::SearchSite;
use anyhow::Context;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use xxhash_rust::xxh3::xxh3_64;

/// xxh3 digest of a search directory's data files.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct Fingerprint(u64);

impl Fingerprint {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the fingerprint as a lowercase hexadecimal string
    pub fn as_hex(self) -> String {
        format!("{:016x}", self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_hex())
    }
}

/// Error type for fingerprint parsing failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseFingerprintError {
    #[error("invalid hexadecimal characters in fingerprint")]
    InvalidHex,
    #[error("invalid fingerprint length: expected 16 hex characters, got {0}")]
    InvalidLength(usize),
}

impl FromStr for Fingerprint {
    type Err = ParseFingerprintError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() != 16 {
            return Err(ParseFingerprintError::InvalidLength(s.len()));
        }
        u64::from_str_radix(s, 16)
            .map(Self)
            .map_err(|_| ParseFingerprintError::InvalidHex)
    }
}

impl Serialize for Fingerprint {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.as_hex())
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// On-disk store of [`SearchSite`] snapshots.
#[derive(Debug, Clone)]
pub struct SiteCache {
    dir: PathBuf,
}

impl SiteCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<user cache dir>/doxsearch`, when the platform has one.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::cache_dir().map(|dir| dir.join("doxsearch"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Snapshot file for a search directory, named by a hash of its path.
    pub fn path_for(&self, root: &Path) -> PathBuf {
        let key = xxh3_64(root.as_os_str().as_encoded_bytes());
        self.dir.join(format!("{:016x}.idx", key))
    }

    /// Loads the snapshot for `root` if it was taken at `fingerprint`.
    ///
    /// Stale or unreadable snapshots are deleted.
    pub fn load(&self, root: &Path, fingerprint: Fingerprint) -> Option<SearchSite> {
        let path = self.path_for(root);
        let bytes = std::fs::read(&path).ok()?;

        match postcard::from_bytes::<SearchSite>(&bytes) {
            Ok(site) if site.fingerprint() == fingerprint && site.root() == root => {
                tracing::debug!("Using cached index {} ({})", path.display(), fingerprint);
                Some(site)
            }
            Ok(site) => {
                tracing::info!(
                    "Cached index is stale ({} != {}), will rebuild (file: {})",
                    site.fingerprint(),
                    fingerprint,
                    path.display()
                );
                let _ = std::fs::remove_file(&path);
                None
            }
            Err(e) => {
                tracing::warn!("Failed to deserialize cached index at {}: {}", path.display(), e);
                let _ = std::fs::remove_file(&path);
                None
            }
        }
    }

    /// Writes a snapshot, replacing any previous one atomically.
    pub fn store(&self, site: &SearchSite) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create cache directory {}", self.dir.display()))?;

        let path = self.path_for(site.root());
        let bytes = postcard::to_allocvec(site).context("Failed to serialize search index")?;

        let partial = path.with_extension("idx.partial");
        std::fs::write(&partial, bytes)
            .with_context(|| format!("Failed to write {}", partial.display()))?;
        std::fs::rename(&partial, &path)
            .with_context(|| format!("Failed to move snapshot into {}", path.display()))?;

        tracing::debug!("Cached search index to {}", path.display());
        Ok(path)
    }
}
