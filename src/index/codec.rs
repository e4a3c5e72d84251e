//! Reading and writing the JavaScript literal files Doxygen emits for its search widget.
//!
//! The reader accepts any whitespace layout, comments, single- or double-quoted
//! strings and trailing commas. The writer always produces Doxygen's own layout,
//! so a file written by Doxygen survives a parse/serialize round trip unchanged.

use super::entry::{SearchEntry, Target};
use super::table::SearchTable;
use crate::error::{ParseError, Position};
use std::fmt::Write as _;

/// A lexical token of the JavaScript subset used by search data files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Tok {
    Ident(String),
    Str(String),
    Int(String),
    Punct(char),
    Eof,
}

impl Tok {
    fn describe(&self) -> String {
        match self {
            Self::Ident(name) => format!("identifier '{}'", name),
            Self::Str(_) => "string literal".to_string(),
            Self::Int(value) => format!("integer {}", value),
            Self::Punct(c) => format!("'{}'", c),
            Self::Eof => "end of input".to_string(),
        }
    }
}

/// Character-level scanner with line/column tracking.
pub(crate) struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        // Editors sometimes prepend a BOM
        let src = src.strip_prefix('\u{feff}').unwrap_or(src);
        Self {
            src,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.src[self.pos..].chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Skips whitespace, `// line` and `/* block */` comments.
    fn skip_trivia(&mut self) {
        loop {
            match (self.peek_char(), self.peek_second()) {
                (Some(c), _) if c.is_whitespace() => {
                    self.bump();
                }
                (Some('/'), Some('/')) => {
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                (Some('/'), Some('*')) => {
                    self.bump();
                    self.bump();
                    while let Some(c) = self.bump() {
                        if c == '*' && self.peek_char() == Some('/') {
                            self.bump();
                            break;
                        }
                    }
                }
                _ => return,
            }
        }
    }

    pub(crate) fn next_token(&mut self) -> Result<(Position, Tok), ParseError> {
        self.skip_trivia();
        let start = self.position();

        let Some(c) = self.peek_char() else {
            return Ok((start, Tok::Eof));
        };

        let tok = match c {
            '\'' | '"' => {
                self.bump();
                Tok::Str(self.string(c, start)?)
            }
            '0'..='9' => {
                let begin = self.pos;
                while self.peek_char().is_some_and(|d| d.is_ascii_digit()) {
                    self.bump();
                }
                Tok::Int(self.src[begin..self.pos].to_string())
            }
            c if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
                let begin = self.pos;
                while self
                    .peek_char()
                    .is_some_and(|d| d.is_ascii_alphanumeric() || d == '_' || d == '$')
                {
                    self.bump();
                }
                Tok::Ident(self.src[begin..self.pos].to_string())
            }
            '[' | ']' | '{' | '}' | ',' | ':' | ';' | '=' => {
                self.bump();
                Tok::Punct(c)
            }
            other => {
                return Err(ParseError::Unexpected {
                    position: start,
                    expected: "a token",
                    found: format!("character '{}'", other),
                });
            }
        };

        Ok((start, tok))
    }

    /// Reads the body of a string literal; the opening quote is already consumed.
    fn string(&mut self, quote: char, start: Position) -> Result<String, ParseError> {
        let mut value = String::new();
        loop {
            let escape_at = self.position();
            match self.bump() {
                None | Some('\n') => return Err(ParseError::UnterminatedString { position: start }),
                Some(c) if c == quote => return Ok(value),
                Some('\\') => value.push(self.escape(escape_at)?),
                Some(c) => value.push(c),
            }
        }
    }

    fn escape(&mut self, position: Position) -> Result<char, ParseError> {
        let Some(c) = self.bump() else {
            return Err(ParseError::UnterminatedString { position });
        };
        match c {
            '\\' | '\'' | '"' | '/' => Ok(c),
            'n' => Ok('\n'),
            'r' => Ok('\r'),
            't' => Ok('\t'),
            'u' => {
                let hex: String = (0..4).filter_map(|_| self.bump()).collect();
                u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == 4)
                    .and_then(char::from_u32)
                    .ok_or(ParseError::InvalidEscape {
                        position,
                        sequence: format!("u{}", hex),
                    })
            }
            other => Err(ParseError::InvalidEscape {
                position,
                sequence: other.to_string(),
            }),
        }
    }
}

/// One-token lookahead over a [`Lexer`].
pub(crate) struct TokenStream<'a> {
    lexer: Lexer<'a>,
    peeked: Option<(Position, Tok)>,
}

impl<'a> TokenStream<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        Self {
            lexer: Lexer::new(src),
            peeked: None,
        }
    }

    pub(crate) fn peek(&mut self) -> Result<&Tok, ParseError> {
        let next = match self.peeked.take() {
            Some(peeked) => peeked,
            None => self.lexer.next_token()?,
        };
        Ok(&self.peeked.insert(next).1)
    }

    pub(crate) fn next(&mut self) -> Result<(Position, Tok), ParseError> {
        match self.peeked.take() {
            Some(peeked) => Ok(peeked),
            None => self.lexer.next_token(),
        }
    }

    /// Consumes the punctuation `c` if it is next.
    pub(crate) fn eat(&mut self, c: char) -> Result<bool, ParseError> {
        if *self.peek()? == Tok::Punct(c) {
            self.peeked = None;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub(crate) fn expect(&mut self, c: char, expected: &'static str) -> Result<(), ParseError> {
        match self.next()? {
            (_, Tok::Punct(found)) if found == c => Ok(()),
            (position, tok) => Err(unexpected(position, expected, &tok)),
        }
    }

    pub(crate) fn expect_ident(&mut self, expected: &'static str) -> Result<String, ParseError> {
        match self.next()? {
            (_, Tok::Ident(name)) => Ok(name),
            (position, tok) => Err(unexpected(position, expected, &tok)),
        }
    }

    pub(crate) fn expect_string(&mut self, expected: &'static str) -> Result<String, ParseError> {
        match self.next()? {
            (_, Tok::Str(value)) => Ok(value),
            (position, tok) => Err(unexpected(position, expected, &tok)),
        }
    }

    pub(crate) fn expect_int(&mut self, expected: &'static str) -> Result<(Position, String), ParseError> {
        match self.next()? {
            (position, Tok::Int(value)) => Ok((position, value)),
            (position, tok) => Err(unexpected(position, expected, &tok)),
        }
    }

    pub(crate) fn expect_eof(&mut self) -> Result<(), ParseError> {
        match self.next()? {
            (_, Tok::Eof) => Ok(()),
            (position, tok) => Err(unexpected(position, "end of input", &tok)),
        }
    }

    /// Parses `var <ident> =` and returns the identifier.
    pub(crate) fn declaration(&mut self) -> Result<String, ParseError> {
        match self.next()? {
            (_, Tok::Ident(keyword)) if keyword == "var" => {}
            (position, tok) => return Err(unexpected(position, "'var'", &tok)),
        }
        let name = self.expect_ident("a variable name")?;
        self.expect('=', "'='")?;
        Ok(name)
    }
}

fn unexpected(position: Position, expected: &'static str, found: &Tok) -> ParseError {
    ParseError::Unexpected {
        position,
        expected,
        found: found.describe(),
    }
}

/// Parses a `var searchData=[...];` file into a table.
pub fn parse_search_data(src: &str) -> Result<SearchTable, ParseError> {
    let mut tokens = TokenStream::new(src);
    let variable = tokens.declaration()?;

    tokens.expect('[', "'[' opening the entry list")?;
    let mut entries = Vec::new();
    while !tokens.eat(']')? {
        entries.push(parse_entry(&mut tokens)?);
        if !tokens.eat(',')? {
            tokens.expect(']', "',' or ']' after an entry")?;
            break;
        }
    }
    tokens.eat(';')?;
    tokens.expect_eof()?;

    SearchTable::new(variable, entries)
}

/// `['token',['display',['url',1,'scope'],...]]`
fn parse_entry(tokens: &mut TokenStream<'_>) -> Result<SearchEntry, ParseError> {
    tokens.expect('[', "'[' opening an entry")?;
    let token = tokens.expect_string("a token string")?;
    tokens.expect(',', "',' after the token")?;
    tokens.expect('[', "'[' opening the result list")?;
    let display = tokens.expect_string("a display label")?;

    let mut targets = Vec::new();
    while tokens.eat(',')? {
        if *tokens.peek()? == Tok::Punct(']') {
            break;
        }
        targets.push(parse_target(tokens)?);
    }
    tokens.expect(']', "']' closing the result list")?;
    tokens.eat(',')?;
    tokens.expect(']', "']' closing the entry")?;

    Ok(SearchEntry::new(token, display, targets))
}

/// `['url',1,'scope']`
fn parse_target(tokens: &mut TokenStream<'_>) -> Result<Target, ParseError> {
    tokens.expect('[', "'[' opening a target")?;
    let url = tokens.expect_string("a target URL")?;
    tokens.expect(',', "',' after the URL")?;
    let (position, raw) = tokens.expect_int("a target flag")?;
    let flag = raw
        .parse::<u8>()
        .map_err(|_| ParseError::IntegerOutOfRange {
            position,
            value: raw.clone(),
        })?;
    tokens.expect(',', "',' after the flag")?;
    let scope = tokens.expect_string("a scope label")?;
    tokens.eat(',')?;
    tokens.expect(']', "']' closing a target")?;

    Ok(Target { url, flag, scope })
}

/// Writes a table in Doxygen's layout.
pub fn serialize_search_data(table: &SearchTable) -> String {
    let mut out = String::with_capacity(table.len() * 128);
    out.push_str("var ");
    out.push_str(table.variable());
    out.push_str("=\n[\n");

    let last = table.len().saturating_sub(1);
    for (i, entry) in table.entries().iter().enumerate() {
        out.push_str("  [");
        push_js_string(&mut out, &entry.token);
        out.push_str(",[");
        push_js_string(&mut out, &entry.display);
        for target in &entry.targets {
            out.push_str(",[");
            push_js_string(&mut out, &target.url);
            let _ = write!(out, ",{},", target.flag);
            push_js_string(&mut out, &target.scope);
            out.push(']');
        }
        out.push_str("]]");
        if i != last {
            out.push(',');
        }
        out.push('\n');
    }

    out.push_str("];\n");
    out
}

/// Appends a single-quoted JavaScript string literal.
pub(crate) fn push_js_string(out: &mut String, value: &str) {
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('\'');
}
