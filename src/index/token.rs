//! Search token encoding and decoding.
//!
//! Doxygen derives each token from the searchable name: the name is lowercased,
//! `[a-z0-9]` and every code point from U+0080 up are kept, and any other
//! character becomes `_` followed by its lowercase hex code (at least two digits).
//! A `_<serial>` suffix keeps tokens unique inside a file.

use crate::error::TokenError;
use std::fmt::Write as _;

/// A token split back into the name it was derived from and its serial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedToken {
    pub name: String,
    pub serial: u32,
}

/// Encodes a user query the way the search widget does before matching.
///
/// Leading and trailing spaces are stripped and the query is lowercased.
pub fn encode_query(query: &str) -> String {
    let trimmed = query.trim_matches(' ').to_lowercase();
    let mut encoded = String::with_capacity(trimmed.len());
    for c in trimmed.chars() {
        if is_plain(c) {
            encoded.push(c);
        } else {
            // `{:02x}` pads codes below 16 to "_0X"
            let _ = write!(encoded, "_{:02x}", c as u32);
        }
    }
    encoded
}

/// Characters that survive encoding unchanged.
fn is_plain(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || (c as u32) >= 0x80
}

/// Splits the trailing `_<serial>` off a token.
pub fn split_serial(token: &str) -> Option<(&str, u32)> {
    let (stem, digits) = token.rsplit_once('_')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let serial = digits.parse().ok()?;
    Some((stem, serial))
}

/// Decodes a token into the lowercase name it was derived from.
pub fn decode_token(token: &str) -> Result<DecodedToken, TokenError> {
    if token.is_empty() {
        return Err(TokenError::Empty);
    }
    let (stem, serial) =
        split_serial(token).ok_or_else(|| TokenError::MissingSerial(token.to_string()))?;
    let name = decode_stem(stem).map_err(|offset| TokenError::MalformedEscape {
        token: token.to_string(),
        offset,
    })?;
    Ok(DecodedToken { name, serial })
}

/// Undoes `_XX` escapes. Returns the byte offset of the first bad escape.
fn decode_stem(stem: &str) -> Result<String, usize> {
    let mut name = String::with_capacity(stem.len());
    let mut chars = stem.char_indices();

    while let Some((offset, c)) = chars.next() {
        if c != '_' {
            name.push(c);
            continue;
        }

        let hex: String = chars.by_ref().take(2).map(|(_, h)| h).collect();
        if hex.len() != 2 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(offset);
        }
        let code = u8::from_str_radix(&hex, 16).map_err(|_| offset)?;
        name.push(char::from(code));
    }

    Ok(name)
}

/// Whether a token has the shape Doxygen produces.
pub fn is_well_formed(token: &str) -> bool {
    let Some((stem, _)) = split_serial(token) else {
        return false;
    };
    if stem.is_empty() {
        return false;
    }
    let plain = stem.chars().all(|c| c == '_' || is_plain(c));
    plain && decode_stem(stem).is_ok()
}
