//! Read, validate and query Doxygen HTML search indexes.
//!
//! Doxygen writes its client-side search index as JavaScript data files under
//! `html/search/`. This crate parses them into immutable tables, writes them
//! back byte-for-byte, lints them, and answers the lookups the search widget
//! performs, from the command line or as an MCP server.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod index;
pub mod server;
pub mod site;
pub mod tools;
pub mod tracing;
pub mod worker;

pub use cache::{Fingerprint, SiteCache};
pub use config::Config;
pub use error::{LoadError, ParseError, Position, TokenError, UnknownSection};
pub use index::{
    DecodedToken, SearchEntry, SearchTable, SectionIndex, Target, ValidationReport, Violation,
    decode_token, encode_query, parse_search_data, serialize_search_data, validate_table,
};
pub use site::{SearchSite, detect_search_dir};
pub use worker::DocState;
