//! Section metadata from `searchdata.js`.
//!
//! Doxygen splits each search category ("all", "classes", "files", ...) into one
//! data file per leading character. `indexSectionsWithContent` lists those
//! characters per section, so the file holding a query's results is
//! `<name>_<position of the first character>.js`.

use super::codec::{Tok, TokenStream};
use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One search category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: u32,
    /// File prefix, e.g. `all` or `classes`.
    pub name: String,
    /// Human label, e.g. `All` or `Classes`.
    pub label: String,
    /// Leading characters present, one data file each.
    pub content: String,
}

impl Section {
    /// Data file stem (without `.js`) holding tokens that start with `c`.
    pub fn file_for_char(&self, c: char) -> Option<String> {
        self.content
            .chars()
            .position(|have| have == c)
            .map(|i| format!("{}_{}", self.name, i))
    }

    /// Stems of every data file in this section.
    pub fn file_stems(&self) -> Vec<String> {
        (0..self.content.chars().count())
            .map(|i| format!("{}_{}", self.name, i))
            .collect()
    }
}

/// Parsed `searchdata.js`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionIndex {
    sections: Vec<Section>,
}

impl SectionIndex {
    /// Parses the three `var` object literals of `searchdata.js`.
    ///
    /// Sections missing a name are dropped; a missing label falls back to the name.
    pub fn parse(src: &str) -> Result<Self, ParseError> {
        let mut tokens = TokenStream::new(src);
        let mut content = BTreeMap::new();
        let mut names = BTreeMap::new();
        let mut labels = BTreeMap::new();

        while *tokens.peek()? != Tok::Eof {
            let variable = tokens.declaration()?;
            let map = parse_object(&mut tokens)?;
            tokens.eat(';')?;
            match variable.as_str() {
                "indexSectionsWithContent" => content = map,
                "indexSectionNames" => names = map,
                "indexSectionLabels" => labels = map,
                other => tracing::debug!("Ignoring unknown searchdata variable '{}'", other),
            }
        }

        let sections = names
            .into_iter()
            .map(|(id, name)| Section {
                id,
                label: labels.remove(&id).unwrap_or_else(|| name.clone()),
                content: content.remove(&id).unwrap_or_default(),
                name,
            })
            .collect();

        Ok(Self { sections })
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Data file stem the search widget would load for `query` in `section`.
    ///
    /// Uses the first character of the lowercased, trimmed query.
    pub fn file_for(&self, section: &str, query: &str) -> Option<String> {
        let first = query.trim_start_matches(' ').chars().next()?;
        let first = first.to_lowercase().next()?;
        self.section(section)?.file_for_char(first)
    }
}

/// `{ 0: "abc", 1: "d", }`
fn parse_object(tokens: &mut TokenStream<'_>) -> Result<BTreeMap<u32, String>, ParseError> {
    tokens.expect('{', "'{' opening an object")?;
    let mut map = BTreeMap::new();
    while !tokens.eat('}')? {
        let (position, key) = tokens.expect_int("a numeric key")?;
        let key = key
            .parse::<u32>()
            .map_err(|_| ParseError::IntegerOutOfRange {
                position,
                value: key.clone(),
            })?;
        tokens.expect(':', "':' after a key")?;
        let value = tokens.expect_string("a string value")?;
        map.insert(key, value);
        if !tokens.eat(',')? {
            tokens.expect('}', "',' or '}' after a value")?;
            break;
        }
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use rstest::rstest;

    const SEARCHDATA: &str = r#"var indexSectionsWithContent =
{
  0: "acdfgs",
  1: "a",
  2: "acu"
};

var indexSectionNames =
{
  0: "all",
  1: "classes",
  2: "files"
};

var indexSectionLabels =
{
  0: "All",
  1: "Classes",
  2: "Files"
};

"#;

    #[test]
    fn test_parse_sections() {
        let_assert!(Ok(index) = SectionIndex::parse(SEARCHDATA));
        check!(index.sections().len() == 3);

        let_assert!(Some(files) = index.section("files"));
        check!(files.label == "Files");
        check!(files.content == "acu");
        check!(files.file_stems() == vec!["files_0", "files_1", "files_2"]);
    }

    #[rstest]
    #[case("all", "aggregate", Some("all_0"))]
    #[case("all", "  Size", Some("all_5"))]
    #[case("files", "utils.hpp", Some("files_2"))]
    #[case("classes", "combine", None)]
    #[case("namespaces", "scran", None)]
    #[case("all", "", None)]
    fn test_file_for(#[case] section: &str, #[case] query: &str, #[case] expected: Option<&str>) {
        let index = SectionIndex::parse(SEARCHDATA).unwrap();
        check!(index.file_for(section, query).as_deref() == expected);
    }

    #[test]
    fn test_missing_label_falls_back_to_name() {
        let src = "var indexSectionNames={0:\"all\",};var indexSectionsWithContent={0:\"a\"}";
        let index = SectionIndex::parse(src).unwrap();
        check!(index.sections()[0].label == "all");
        check!(index.file_for("all", "a").as_deref() == Some("all_0"));
    }

    #[test]
    fn test_malformed_object() {
        let_assert!(Err(err) = SectionIndex::parse("var indexSectionNames = { 0 \"all\" };"));
        check!(err.to_string().contains("':' after a key"));
    }
}
