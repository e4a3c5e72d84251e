//! TF-IDF inverted index over entry labels and target scopes.

use super::table::SearchTable;
use super::tokenize::{hash_term, tokenize_and_stem};
use ahash::AHashMap;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Term hash for fast lookup
type TermHash = u64;

/// Weight of a term found in an entry's display label.
const LABEL_WEIGHT: f32 = 2.0;
/// Weight of a term found in a target scope or signature.
const SCOPE_WEIGHT: f32 = 1.0;

/// Address of an entry inside a loaded site: data file, then position in file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryRef {
    pub file: u32,
    pub entry: u32,
}

/// A searchable term index with TF-IDF scoring.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FullTextIndex {
    /// Term hash to (document, score) pairs, sorted by score descending
    terms: HashMap<TermHash, Vec<(u32, f32)>>,
    /// Document number to entry address
    docs: Vec<EntryRef>,
}

impl FullTextIndex {
    /// Indexes every entry of the given tables, keyed by file number.
    pub fn build<'a>(tables: impl IntoIterator<Item = (u32, &'a SearchTable)>) -> Self {
        let start = std::time::Instant::now();
        let mut builder = TermBuilder::default();

        for (file, table) in tables {
            for (position, entry) in table.entries().iter().enumerate() {
                let doc = builder.add_document(EntryRef {
                    file,
                    entry: u32::try_from(position).unwrap_or(u32::MAX),
                });
                builder.add_terms(&entry.display, doc, LABEL_WEIGHT);
                for target in &entry.targets {
                    builder.add_terms(&target.scope, doc, SCOPE_WEIGHT);
                }
            }
        }

        let index = builder.finalize();
        tracing::info!(
            "Built full-text index: {} unique terms, {} entries in {:?}",
            index.term_count(),
            index.document_count(),
            start.elapsed()
        );
        index
    }

    /// Entries matching the query, highest score first.
    ///
    /// The query goes through the same tokenizer, so `averages` matches `average`
    /// and `AcrossCells` matches labels containing `across` or `cells`.
    pub fn search(&self, query: &str, limit: usize) -> Vec<(EntryRef, f32)> {
        let stemmer = Stemmer::create(Algorithm::English);
        let tokens = tokenize_and_stem(query, &stemmer);
        if tokens.is_empty() {
            return vec![];
        }

        let mut combined: AHashMap<u32, f32> = AHashMap::new();
        for token in &tokens {
            if let Some(postings) = self.terms.get(&hash_term(token)) {
                for (doc, score) in postings {
                    *combined.entry(*doc).or_insert(0.0) += score;
                }
            }
        }

        let mut results: Vec<_> = combined
            .into_iter()
            .filter_map(|(doc, score)| self.docs.get(doc as usize).map(|r| (*r, score)))
            .collect();
        results.sort_by(|(ra, a), (rb, b)| b.total_cmp(a).then_with(|| ra.cmp(rb)));
        results.truncate(limit);
        results
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    pub fn document_count(&self) -> usize {
        self.docs.len()
    }
}

/// Accumulates raw term frequencies before IDF weighting.
struct TermBuilder {
    /// (term, document) to weighted term count
    term_docs: AHashMap<(TermHash, u32), f32>,
    /// Number of terms per document, for length normalization
    doc_lengths: Vec<usize>,
    docs: Vec<EntryRef>,
    stemmer: Stemmer,
}

impl Default for TermBuilder {
    fn default() -> Self {
        Self {
            term_docs: AHashMap::default(),
            doc_lengths: Vec::new(),
            docs: Vec::new(),
            stemmer: Stemmer::create(Algorithm::English),
        }
    }
}

impl TermBuilder {
    fn add_document(&mut self, entry: EntryRef) -> u32 {
        let doc = u32::try_from(self.docs.len()).unwrap_or(u32::MAX);
        self.docs.push(entry);
        self.doc_lengths.push(0);
        doc
    }

    fn add_terms(&mut self, text: &str, doc: u32, weight: f32) {
        let words = tokenize_and_stem(text, &self.stemmer);
        if let Some(length) = self.doc_lengths.get_mut(doc as usize) {
            *length += words.len();
        }
        for word in words {
            *self.term_docs.entry((hash_term(&word), doc)).or_insert(0.0) += weight;
        }
    }

    /// TF-IDF = ln(1 + tf / length_norm) * ln(1 + docs / doc_freq).
    ///
    /// Long signatures would otherwise dominate every query, so term frequency is
    /// divided by the document length relative to the average.
    fn finalize(self) -> FullTextIndex {
        let total_docs = self.docs.len() as f32;
        let total_length: usize = self.doc_lengths.iter().sum();
        let avg_length = if self.docs.is_empty() {
            1.0
        } else {
            (total_length as f32 / total_docs).max(1.0)
        };

        let mut grouped: HashMap<TermHash, Vec<(u32, f32)>> = HashMap::new();
        for ((term, doc), tf) in self.term_docs {
            grouped.entry(term).or_default().push((doc, tf));
        }

        let terms = grouped
            .into_iter()
            .map(|(term, postings)| {
                let idf = (1.0 + total_docs / postings.len() as f32).ln();
                let mut scored: Vec<_> = postings
                    .into_iter()
                    .map(|(doc, tf)| {
                        let length = self.doc_lengths.get(doc as usize).copied().unwrap_or(1) as f32;
                        let length_norm = (length / avg_length).max(0.5);
                        (doc, (1.0 + tf / length_norm).ln() * idf)
                    })
                    .collect();
                scored.sort_by(|(da, a), (db, b)| b.total_cmp(a).then_with(|| da.cmp(db)));
                (term, scored)
            })
            .collect();

        FullTextIndex {
            terms,
            docs: self.docs,
        }
    }
}
