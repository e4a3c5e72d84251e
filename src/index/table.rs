//! An immutable table of search entries with the lookups the search widget offers.

use super::codec;
use super::entry::SearchEntry;
use super::token::{self, encode_query};
use crate::error::ParseError;
use ahash::AHashMap;
use rapidfuzz::distance::jaro_winkler;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One search data file: the ordered entries plus a token index.
///
/// Tokens are unique and every entry has at least one target; both are checked
/// once, in [`SearchTable::new`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawTable", into = "RawTable")]
pub struct SearchTable {
    variable: String,
    entries: Vec<SearchEntry>,
    by_token: AHashMap<String, usize>,
}

impl PartialEq for SearchTable {
    fn eq(&self, other: &Self) -> bool {
        self.variable == other.variable && self.entries == other.entries
    }
}

impl Eq for SearchTable {}

/// Serialized form; the token index is rebuilt on load.
#[derive(Serialize, Deserialize)]
struct RawTable {
    variable: String,
    entries: Vec<SearchEntry>,
}

impl TryFrom<RawTable> for SearchTable {
    type Error = ParseError;

    fn try_from(raw: RawTable) -> Result<Self, Self::Error> {
        Self::new(raw.variable, raw.entries)
    }
}

impl From<SearchTable> for RawTable {
    fn from(table: SearchTable) -> Self {
        Self {
            variable: table.variable,
            entries: table.entries,
        }
    }
}

/// A near miss for a token that was not found.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenSuggestion<'a> {
    pub entry: &'a SearchEntry,
    /// Jaro-Winkler similarity, 0.0 to 1.0.
    pub score: f64,
}

impl SearchTable {
    /// Builds a table, rejecting duplicate tokens and entries without targets.
    pub fn new(variable: impl Into<String>, entries: Vec<SearchEntry>) -> Result<Self, ParseError> {
        let mut by_token = AHashMap::with_capacity(entries.len());

        for (position, entry) in entries.iter().enumerate() {
            if entry.targets.is_empty() {
                return Err(ParseError::EmptyTargets {
                    token: entry.token.clone(),
                });
            }
            if let Some(first) = by_token.insert(entry.token.clone(), position) {
                return Err(ParseError::DuplicateToken {
                    token: entry.token.clone(),
                    first,
                    second: position,
                });
            }
        }

        Ok(Self {
            variable: variable.into(),
            entries,
            by_token,
        })
    }

    /// Name of the JavaScript variable the table is assigned to.
    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn entries(&self) -> &[SearchEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact token lookup.
    pub fn get(&self, token: &str) -> Option<&SearchEntry> {
        self.position(token).map(|i| &self.entries[i])
    }

    /// File position of a token.
    pub fn position(&self, token: &str) -> Option<usize> {
        self.by_token.get(token).copied()
    }

    /// Entries the search widget shows for `query`, in file order.
    ///
    /// The query is encoded like a token and matched as a prefix of each token,
    /// so `aggregate_across` finds `aggregate_5facross_5fcells_2` and friends.
    pub fn search(&self, query: &str) -> Vec<&SearchEntry> {
        self.search_positions(query)
            .into_iter()
            .map(|i| &self.entries[i])
            .collect()
    }

    /// Like [`SearchTable::search`], returning file positions.
    pub fn search_positions(&self, query: &str) -> Vec<usize> {
        let encoded = encode_query(query);
        if encoded.is_empty() {
            return Vec::new();
        }
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.token.starts_with(&encoded))
            .map(|(i, _)| i)
            .collect()
    }

    /// Case-insensitive substring match on labels and decoded token names.
    pub fn find(&self, needle: &str) -> Vec<&SearchEntry> {
        self.find_positions(needle)
            .into_iter()
            .map(|i| &self.entries[i])
            .collect()
    }

    /// Like [`SearchTable::find`], returning file positions.
    pub fn find_positions(&self, needle: &str) -> Vec<usize> {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| {
                entry.label().to_lowercase().contains(&needle)
                    || entry.name().is_some_and(|name| name.contains(&needle))
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// Tokens similar to one that was not found, best first.
    ///
    /// Serial numbers are ignored when comparing, so `average_3` still suggests
    /// `average_17`.
    pub fn suggest(&self, token: &str, threshold: f64, limit: usize) -> Vec<TokenSuggestion<'_>> {
        let wanted = token::split_serial(token).map_or(token, |(stem, _)| stem);

        let mut suggestions: Vec<_> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let stem = token::split_serial(&entry.token).map_or(entry.token.as_str(), |(s, _)| s);
                let score = jaro_winkler::similarity(wanted.chars(), stem.chars());
                (score >= threshold).then_some(TokenSuggestion { entry, score })
            })
            .collect();

        suggestions.sort_by(|a, b| b.score.total_cmp(&a.score));
        suggestions.truncate(limit);
        suggestions
    }

    /// Writes the table back out in Doxygen's layout.
    pub fn to_js(&self) -> String {
        codec::serialize_search_data(self)
    }
}

impl FromStr for SearchTable {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        codec::parse_search_data(s)
    }
}
