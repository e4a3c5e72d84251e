//! Relevance ranking for substring matches.

use super::entry::SearchEntry;

/// Calculate simple text relevance score.
///
/// Returns a score based on how well the query matches the text:
/// - 100: Exact match
/// - 50: Text starts with query
/// - 10: Text contains query
/// - None: No match
pub fn calculate_relevance(text: &str, query: &str) -> Option<u32> {
    if text == query {
        Some(100)
    } else if text.starts_with(query) {
        Some(50)
    } else if text.contains(query) {
        Some(10)
    } else {
        None
    }
}

/// Relevance of an entry for a case-insensitive substring query.
///
/// The label is scored first; a match only in the decoded token name (page
/// titles indexed by suffix) scores one point lower so labels win ties.
pub fn entry_relevance(entry: &SearchEntry, query: &str) -> Option<u32> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return None;
    }
    let label = entry.label().to_lowercase();
    calculate_relevance(&label, &query).or_else(|| {
        entry
            .name()
            .and_then(|name| calculate_relevance(&name, &query))
            .map(|score| score.saturating_sub(1))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::entry::Target;
    use assert2::check;
    use rstest::rstest;

    #[rstest]
    #[case("average", "average", Some(100))]
    #[case("aggregate_across_cells.hpp", "aggregate_across", Some(50))]
    #[case("arrayview", "view", Some(10))]
    #[case("arrayview", "matrix", None)]
    fn test_calculate_relevance(#[case] text: &str, #[case] query: &str, #[case] expected: Option<u32>) {
        check!(calculate_relevance(text, query) == expected);
    }

    #[test]
    fn test_entry_relevance_prefers_label() {
        let entry = SearchEntry::new("arrayview_15", "ArrayView", vec![Target::new("a.html", 1, "")]);
        check!(entry_relevance(&entry, "arrayview") == Some(100));
        check!(entry_relevance(&entry, " Array ") == Some(50));
        check!(entry_relevance(&entry, "") == None);

        let page = SearchEntry::new(
            "values_20across_0",
            "Aggregate expression values",
            vec![Target::new("../index.html", 1, "")],
        );
        check!(entry_relevance(&page, "values across") == Some(99));
        check!(entry_relevance(&page, "across") == Some(9));
    }
}
