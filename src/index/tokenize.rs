//! Text tokenization and stemming for the full-text index.

use rust_stemmers::Stemmer;
use xxhash_rust::xxh3::xxh3_64;

/// Common English stop words to filter out from indexing.
pub(crate) const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "in", "is", "it", "its",
    "of", "on", "that", "the", "to", "was", "will", "with",
];

/// C++ keywords that show up in every signature and carry no meaning.
const SIGNATURE_NOISE: &[&str] = &["const", "std", "typename", "size_t"];

/// Splits text into lowercase, stemmed terms.
///
/// Words are runs of ASCII alphanumerics, `_` and non-ASCII letters.
/// - `AggregateAcrossCells` → `aggreg`, `across`, `cell` and the whole word
/// - `aggregate_across_cells` → `aggreg`, `across`, `cell`
/// - `Matrix&lt;` → `matrix` (entity names are dropped with their `&`/`;`)
pub(crate) fn tokenize_and_stem(text: &str, stemmer: &Stemmer) -> Vec<String> {
    let mut tokens = Vec::new();
    for word in split_words(&strip_entities(text)) {
        let word = word.trim_matches('_');
        if word.is_empty() || SIGNATURE_NOISE.contains(&word.to_lowercase().as_str()) {
            continue;
        }

        if word.contains('_') {
            for part in word.split('_').filter(|p| !p.is_empty()) {
                for sub in split_camel(part) {
                    push_term(sub, &mut tokens, stemmer);
                }
            }
            continue;
        }

        let parts = split_camel(word);
        if parts.len() > 1 {
            for part in &parts {
                push_term(part, &mut tokens, stemmer);
            }
        }
        push_term(word, &mut tokens, stemmer);
    }
    tokens
}

/// Replaces `&name;` entities with a space.
fn strip_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match tail.find(';') {
            Some(end) if end <= 8 => {
                out.push(' ');
                rest = &tail[end + 1..];
            }
            _ => {
                out.push(' ');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn split_words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || (!c.is_ascii() && c.is_alphabetic())))
        .filter(|w| !w.is_empty())
}

/// Splits on lowercase→uppercase and letter↔digit transitions.
fn split_camel(word: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut prev: Option<char> = None;

    for (i, c) in word.char_indices() {
        if let Some(p) = prev {
            let camel = p.is_lowercase() && c.is_uppercase();
            let digit_edge = p.is_ascii_digit() != c.is_ascii_digit();
            if camel || digit_edge {
                parts.push(&word[start..i]);
                start = i;
            }
        }
        prev = Some(c);
    }
    parts.push(&word[start..]);
    parts
}

fn push_term(word: &str, tokens: &mut Vec<String>, stemmer: &Stemmer) {
    let lowercase = word.to_lowercase();
    if STOP_WORDS.contains(&lowercase.as_str()) {
        return;
    }
    if lowercase.chars().all(|c| c.is_ascii_digit()) {
        return;
    }
    tokens.push(stemmer.stem(&lowercase).into_owned());
}

/// Hashes a term for the inverted index (case-insensitive, stable across runs).
pub(crate) fn hash_term(term: &str) -> u64 {
    xxh3_64(term.to_lowercase().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;
    use rstest::rstest;
    use rust_stemmers::Algorithm;

    fn tokens(text: &str) -> Vec<String> {
        tokenize_and_stem(text, &Stemmer::create(Algorithm::English))
    }

    #[rstest]
    #[case("AggregateAcrossCellsOptions", &["aggreg", "across", "cell", "option"])]
    #[case("aggregate_across_genes", &["aggreg", "across", "gene"])]
    #[case("tatami::Matrix&lt; Data_, Index_ &gt;", &["tatami", "matrix", "data", "index"])]
    #[case("ArrayView.hpp", &["array", "view", "hpp"])]
    fn test_tokens_contain(#[case] input: &str, #[case] expected: &[&str]) {
        let found = tokens(input);
        for term in expected {
            check!(found.contains(&term.to_string()), "{:?} missing {}", found, term);
        }
    }

    #[rstest]
    #[case("Aggregate expression values across cells", vec!["aggreg", "express", "valu", "across", "cell"])]
    #[case("the average of the values", vec!["averag", "valu"])]
    #[case("const std::vector&lt; size_t &gt;", vec!["vector"])]
    #[case("Vec2", vec!["vec", "vec2"])]
    fn test_tokens_exact(#[case] input: &str, #[case] expected: Vec<&str>) {
        check!(tokens(input) == expected);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("&amp; &lt;&gt;")]
    #[case("123 456")]
    fn test_no_terms(#[case] input: &str) {
        check!(tokens(input).is_empty());
    }

    #[rstest]
    #[case("Москва")]
    #[case("日本")]
    #[case("🦀")]
    fn test_unicode_does_not_panic(#[case] input: &str) {
        let _ = tokens(input);
    }

    #[test]
    fn test_hash_is_case_insensitive() {
        check!(hash_term("ArrayView") == hash_term("arrayview"));
        check!(hash_term("ArrayView") != hash_term("arrayviews"));
    }
}
