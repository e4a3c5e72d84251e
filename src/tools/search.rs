//! Prefix search, substring find, and ranked full-text search.

use super::render::{render_hits, write_hit};
use crate::worker::DocState;
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;
use std::sync::Arc;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchRequest {
    /// Text typed into the search box; matched as a token prefix
    pub query: String,
    /// Section to search, e.g. `all`, `classes`, `functions` (default: all)
    #[serde(default)]
    pub section: Option<String>,
    /// Maximum number of results to return (default from configuration)
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct FindRequest {
    /// Case-insensitive substring of a label or name
    pub text: String,
    /// Maximum number of results to return (default from configuration)
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct FullTextSearchRequest {
    /// Free-form words; stemmed and matched against labels and signatures
    pub query: String,
    /// Maximum number of results to return (default from configuration)
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Search the way the documentation's search box does.
pub async fn handle_search(state: &Arc<DocState>, request: SearchRequest) -> Result<String, String> {
    let site = state.current_site().await?;
    let limit = request.limit.unwrap_or(state.config().search.default_limit);
    let section = request.section.as_deref();

    if let Some(name) = section {
        site.check_section(name).map_err(|e| e.to_string())?;
    }

    let hits = site.search(&request.query, section);
    if hits.is_empty() {
        let mut msg = format!("No results found for '{}'.\n\n", request.query);
        msg.push_str("Search tips:\n");
        msg.push_str("• Matching is by prefix of the name, e.g. 'aggregate_across'\n");
        msg.push_str("• Use find for substrings anywhere in a name\n");
        msg.push_str("• Use full_text_search for words in signatures and titles\n");
        return Ok(msg);
    }

    let total = hits.len();
    let shown = &hits[..total.min(limit)];
    let heading = format!(
        "Results for '{}' in section '{}' ({} total):",
        request.query,
        section.unwrap_or(crate::site::DEFAULT_SECTION),
        total
    );
    Ok(render_hits(&heading, shown, total))
}

/// Substring search over labels and token names.
pub async fn handle_find(state: &Arc<DocState>, request: FindRequest) -> Result<String, String> {
    let site = state.current_site().await?;
    let limit = request.limit.unwrap_or(state.config().search.default_limit);

    let hits = site.find(&request.text, limit);
    if hits.is_empty() {
        return Ok(format!("No entries contain '{}'.\n", request.text));
    }

    let heading = format!("Entries containing '{}':", request.text);
    Ok(render_hits(&heading, &hits, hits.len()))
}

/// Stemmed TF-IDF search, best matches first.
pub async fn handle_full_text_search(
    state: &Arc<DocState>,
    request: FullTextSearchRequest,
) -> Result<String, String> {
    let site = state.current_site().await?;
    let limit = request.limit.unwrap_or(state.config().search.default_limit);

    let results = site.full_text(&request.query, limit);
    if results.is_empty() {
        let mut msg = format!("No results found for '{}'.\n\n", request.query);
        msg.push_str("Search tips:\n");
        msg.push_str("• Try a shorter or more general term\n");
        msg.push_str("• Search uses stemming: 'averages' matches 'average'\n");
        return Ok(msg);
    }

    let mut out = format!("Full-text results for '{}':\n\n", request.query);
    let max_score = results.first().map_or(1.0, |(_, score)| *score);
    for (idx, (hit, score)) in results.iter().enumerate() {
        let relevance = ((score / max_score) * 100.0).round() as u8;
        write_hit(&mut out, idx + 1, hit, &format!(" - relevance: {}%", relevance));
    }
    let _ = writeln!(out);
    Ok(out)
}
