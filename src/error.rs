//! Error handling types and utilities.

use std::fmt;
use std::path::PathBuf;

/// A specialized Result type for doxsearch operations.
///
/// This is an alias for `anyhow::Result` with context added via `.context()` and
/// `.with_context()` methods throughout the codebase.
pub type Result<T> = anyhow::Result<T>;

/// Position of a syntax error inside a search data file (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Error returned when a search data file cannot be turned into a table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The lexer or parser hit something it did not expect.
    #[error("{position}: expected {expected}, found {found}")]
    Unexpected {
        position: Position,
        expected: &'static str,
        found: String,
    },
    /// A string literal was not closed before end of input.
    #[error("{position}: unterminated string literal")]
    UnterminatedString { position: Position },
    /// A backslash escape was not recognised.
    #[error("{position}: invalid escape sequence '\\{sequence}'")]
    InvalidEscape { position: Position, sequence: String },
    /// An integer flag did not fit in a `u8`.
    #[error("{position}: integer '{value}' out of range")]
    IntegerOutOfRange { position: Position, value: String },
    /// Two entries share the same token.
    #[error("duplicate token '{token}' (entries {first} and {second})")]
    DuplicateToken {
        token: String,
        first: usize,
        second: usize,
    },
    /// An entry has no targets.
    #[error("entry '{token}' has no targets")]
    EmptyTargets { token: String },
}

/// Error returned when a token cannot be decoded back into a name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token is empty")]
    Empty,
    #[error("token '{0}' has no trailing serial number")]
    MissingSerial(String),
    #[error("token '{token}' has a malformed escape at byte {offset}")]
    MalformedEscape { token: String, offset: usize },
}

/// Error returned when loading a documentation search directory fails.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// No search directory could be located from the given path.
    #[error("no Doxygen search index found at or below {}", path.display())]
    NotFound { path: PathBuf },
    /// A data file in the directory failed to parse.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

/// A query named a section the documentation does not have.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown section '{name}'. Available sections: {}", available.join(", "))]
pub struct UnknownSection {
    pub name: String,
    pub available: Vec<String>,
}
