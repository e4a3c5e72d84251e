//! Doxygen search index data: tokens, entries, file codec, and lookup.
//!
//! A search data file assigns one JavaScript array to a variable:
//! `[token, [display, [url, flag, scope], ...]]` per entry. This module parses
//! those files into immutable [`SearchTable`]s, writes them back byte-for-byte,
//! and answers the lookups the documentation search widget performs, plus a
//! stemmed full-text search over labels and signatures.

// Module declarations
pub(crate) mod codec;
pub(crate) mod entry;
pub(crate) mod fulltext;
pub(crate) mod scoring;
pub(crate) mod sections;
pub(crate) mod table;
pub(crate) mod token;
pub(crate) mod tokenize;

// Public re-exports (used via lib.rs)
pub use codec::{parse_search_data, serialize_search_data};
pub use entry::{SearchEntry, Severity, Target, ValidationReport, Violation, html_unescape, validate_table};
pub use fulltext::{EntryRef, FullTextIndex};
pub use scoring::{calculate_relevance, entry_relevance};
pub use sections::{Section, SectionIndex};
pub use table::{SearchTable, TokenSuggestion};
pub use token::{DecodedToken, decode_token, encode_query, is_well_formed, split_serial};
