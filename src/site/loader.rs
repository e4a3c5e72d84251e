//! Loading every data file of a Doxygen search directory.

use crate::cache::{Fingerprint, SiteCache};
use crate::error::{LoadError, Result, UnknownSection};
use crate::index::{
    EntryRef, FullTextIndex, SearchEntry, SearchTable, SectionIndex, TokenSuggestion,
    ValidationReport, entry_relevance, parse_search_data, validate_table,
};
use anyhow::Context;
use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use xxhash_rust::xxh3::Xxh3;

/// Section used by the search widget when none is selected.
pub const DEFAULT_SECTION: &str = "all";

const SECTIONS_FILE: &str = "searchdata.js";

/// Splits a data file name like `all_0.js` into its section and ordinal.
///
/// `search.js`, `searchdata.js` and other scripts return `None`.
pub(crate) fn data_file_stem(file_name: &str) -> Option<(&str, u32)> {
    let stem = file_name.strip_suffix(".js")?;
    let (section, ordinal) = stem.rsplit_once('_')?;
    if section.is_empty()
        || !section.bytes().all(|b| b.is_ascii_lowercase() || b == b'_')
        || ordinal.is_empty()
        || !ordinal.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    Some((section, ordinal.parse().ok()?))
}

/// One parsed `<section>_<n>.js` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataFile {
    pub section: String,
    pub ordinal: u32,
    pub table: SearchTable,
}

impl DataFile {
    /// File stem, e.g. `all_0`.
    pub fn stem(&self) -> String {
        format!("{}_{}", self.section, self.ordinal)
    }

    pub fn file_name(&self) -> String {
        format!("{}.js", self.stem())
    }
}

/// An entry together with the file it came from.
#[derive(Debug, Clone, Copy)]
pub struct Hit<'a> {
    pub file: &'a DataFile,
    pub entry: &'a SearchEntry,
    pub at: EntryRef,
}

/// All search data of one documentation site, immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSite {
    root: PathBuf,
    fingerprint: Fingerprint,
    sections: Option<SectionIndex>,
    files: Vec<DataFile>,
    fulltext: FullTextIndex,
}

impl SearchSite {
    /// Parses every data file under `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        let start = std::time::Instant::now();
        let paths = discover(dir)?;
        let fingerprint = fingerprint_files(dir, &paths)?;

        let mut sections = None;
        let mut files = Vec::new();
        for path in &paths {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;

            if name == SECTIONS_FILE {
                let index = SectionIndex::parse(&source).map_err(|source| LoadError::Parse {
                    path: path.clone(),
                    source,
                })?;
                sections = Some(index);
            } else if let Some((section, ordinal)) = data_file_stem(name) {
                let table = parse_search_data(&source).map_err(|source| LoadError::Parse {
                    path: path.clone(),
                    source,
                })?;
                files.push(DataFile {
                    section: section.to_string(),
                    ordinal,
                    table,
                });
            }
        }

        if sections.is_none() && files.is_empty() {
            return Err(LoadError::NotFound {
                path: dir.to_path_buf(),
            }
            .into());
        }

        let site = Self::from_parts(dir.to_path_buf(), fingerprint, sections, files);
        tracing::info!(
            "Loaded {} entries from {} data files in {} ({:?})",
            site.entry_count(),
            site.files.len(),
            dir.display(),
            start.elapsed()
        );
        Ok(site)
    }

    /// Loads from `cache` when its snapshot is current, otherwise parses and stores.
    pub fn open(dir: &Path, cache: Option<&SiteCache>) -> Result<Self> {
        let Some(cache) = cache else {
            return Self::load(dir);
        };

        let current = fingerprint(dir)?;
        if let Some(site) = cache.load(dir, current) {
            return Ok(site);
        }

        let site = Self::load(dir)?;
        if let Err(e) = cache.store(&site) {
            tracing::warn!("Failed to cache search index for {}: {:#}", dir.display(), e);
        }
        Ok(site)
    }

    /// Assembles a site from already parsed tables and builds its full-text index.
    pub fn from_parts(
        root: PathBuf,
        fingerprint: Fingerprint,
        sections: Option<SectionIndex>,
        mut files: Vec<DataFile>,
    ) -> Self {
        files.sort_by(|a, b| a.section.cmp(&b.section).then(a.ordinal.cmp(&b.ordinal)));
        let mut site = Self {
            root,
            fingerprint,
            sections,
            files,
            fulltext: FullTextIndex::default(),
        };
        site.fulltext = FullTextIndex::build(
            site.primary_files()
                .map(|(number, file)| (number, &file.table)),
        );
        site
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    pub fn sections(&self) -> Option<&SectionIndex> {
        self.sections.as_ref()
    }

    pub fn files(&self) -> &[DataFile] {
        &self.files
    }

    /// The file with the given stem, e.g. `all_0`.
    pub fn file(&self, stem: &str) -> Option<&DataFile> {
        let (section, ordinal) = stem.rsplit_once('_')?;
        let ordinal: u32 = ordinal.parse().ok()?;
        self.files
            .iter()
            .find(|f| f.section == section && f.ordinal == ordinal)
    }

    pub fn entry_count(&self) -> usize {
        self.files.iter().map(|f| f.table.len()).sum()
    }

    /// Section names from `searchdata.js`, or from the loaded files without it.
    pub fn section_names(&self) -> Vec<String> {
        if let Some(sections) = &self.sections {
            return sections.sections().iter().map(|s| s.name.clone()).collect();
        }
        let mut names: Vec<String> = self.files.iter().map(|f| f.section.clone()).collect();
        names.dedup();
        names
    }

    /// Rejects a section name this site does not have.
    pub fn check_section(&self, name: &str) -> std::result::Result<(), UnknownSection> {
        let available = self.section_names();
        if available.iter().any(|known| known == name) {
            return Ok(());
        }
        Err(UnknownSection {
            name: name.to_string(),
            available,
        })
    }

    /// Resolves an [`EntryRef`] produced by this site.
    pub fn hit(&self, at: EntryRef) -> Option<Hit<'_>> {
        let file = self.files.get(at.file as usize)?;
        let entry = file.table.entries().get(at.entry as usize)?;
        Some(Hit { file, entry, at })
    }

    /// Exact token lookup across every data file.
    ///
    /// The same token can legitimately appear once per section.
    pub fn lookup(&self, token: &str) -> Vec<Hit<'_>> {
        self.numbered_files()
            .filter_map(|(number, file)| {
                let position = file.table.position(token)?;
                self.hit(EntryRef {
                    file: number,
                    entry: position as u32,
                })
            })
            .collect()
    }

    /// Prefix search the way the search widget performs it.
    ///
    /// With section metadata only the file for the query's first character is
    /// consulted; without it every file of the section is scanned in order.
    pub fn search(&self, query: &str, section: Option<&str>) -> Vec<Hit<'_>> {
        let section = section.unwrap_or(DEFAULT_SECTION);
        let routed = self
            .sections
            .as_ref()
            .filter(|index| index.section(section).is_some())
            .map(|index| index.file_for(section, query));

        let hits = self.numbered_files().filter(|(_, file)| match &routed {
            Some(Some(stem)) => file.stem() == *stem,
            Some(None) => false,
            None => file.section == section,
        });

        hits.flat_map(|(number, file)| {
            file.table
                .search_positions(query)
                .into_iter()
                .filter_map(move |position| {
                    self.hit(EntryRef {
                        file: number,
                        entry: position as u32,
                    })
                })
        })
        .collect()
    }

    /// Case-insensitive substring matches, best relevance first.
    pub fn find(&self, text: &str, limit: usize) -> Vec<Hit<'_>> {
        let mut scored: Vec<(u32, Hit<'_>)> = self
            .primary_files()
            .flat_map(|(number, file)| {
                file.table
                    .find_positions(text)
                    .into_iter()
                    .filter_map(move |position| {
                        self.hit(EntryRef {
                            file: number,
                            entry: position as u32,
                        })
                    })
            })
            .map(|hit| (entry_relevance(hit.entry, text).unwrap_or(0), hit))
            .collect();

        scored.sort_by(|(a, ha), (b, hb)| b.cmp(a).then(ha.at.cmp(&hb.at)));
        scored.into_iter().take(limit).map(|(_, hit)| hit).collect()
    }

    /// Stemmed TF-IDF search over labels and scopes.
    pub fn full_text(&self, query: &str, limit: usize) -> Vec<(Hit<'_>, f32)> {
        self.fulltext
            .search(query, limit)
            .into_iter()
            .filter_map(|(at, score)| self.hit(at).map(|hit| (hit, score)))
            .collect()
    }

    /// Near-miss tokens for a failed lookup, best first.
    pub fn suggest(&self, token: &str, threshold: f64, limit: usize) -> Vec<TokenSuggestion<'_>> {
        let mut suggestions: Vec<_> = self
            .primary_files()
            .flat_map(|(_, file)| file.table.suggest(token, threshold, limit))
            .collect();
        suggestions.sort_by(|a, b| b.score.total_cmp(&a.score));
        suggestions.truncate(limit);
        suggestions
    }

    /// Lint report per data file, in file order.
    pub fn validate(&self) -> Vec<(String, ValidationReport)> {
        self.files
            .iter()
            .map(|file| (file.file_name(), validate_table(&file.table)))
            .collect()
    }

    fn numbered_files(&self) -> impl Iterator<Item = (u32, &DataFile)> {
        self.files
            .iter()
            .enumerate()
            .map(|(number, file)| (number as u32, file))
    }

    /// The `all` section when loaded, otherwise every file.
    fn primary_files(&self) -> impl Iterator<Item = (u32, &DataFile)> {
        let has_all = self.files.iter().any(|f| f.section == DEFAULT_SECTION);
        self.numbered_files()
            .filter(move |(_, file)| !has_all || file.section == DEFAULT_SECTION)
    }
}

/// Data and metadata scripts directly inside `dir`, sorted by name.
fn discover(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(LoadError::NotFound {
            path: dir.to_path_buf(),
        }
        .into());
    }

    let mut paths = Vec::new();
    for result in WalkBuilder::new(dir)
        .max_depth(Some(1))
        .standard_filters(false)
        .build()
    {
        let entry = result.with_context(|| format!("Failed to scan {}", dir.display()))?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let is_data = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name == SECTIONS_FILE || data_file_stem(name).is_some());
        if is_data {
            paths.push(entry.into_path());
        }
    }
    paths.sort();
    Ok(paths)
}

/// Content fingerprint of the search data under `dir`.
pub fn fingerprint(dir: &Path) -> Result<Fingerprint> {
    let paths = discover(dir)?;
    fingerprint_files(dir, &paths)
}

fn fingerprint_files(dir: &Path, paths: &[PathBuf]) -> Result<Fingerprint> {
    let mut hasher = Xxh3::new();
    for path in paths {
        let relative = path.strip_prefix(dir).unwrap_or(path);
        hasher.update(relative.as_os_str().as_encoded_bytes());
        hasher.update(&[0]);
        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        hasher.update(&bytes);
    }
    Ok(Fingerprint::new(hasher.digest()))
}
