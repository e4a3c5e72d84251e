//! Exact token lookup.

use super::render::write_hit;
use crate::index::{encode_query, is_well_formed};
use crate::worker::DocState;
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;
use std::sync::Arc;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LookupRequest {
    /// Exact search token, e.g. `aggregate_5facross_5fcells_2`
    pub token: String,
}

/// Returns every entry stored under the token, with near misses when there is none.
pub async fn handle_lookup(state: &Arc<DocState>, request: LookupRequest) -> Result<String, String> {
    let site = state.current_site().await?;
    let token = request.token.trim();
    let hits = site.lookup(token);

    if !hits.is_empty() {
        let mut out = String::new();
        for (idx, hit) in hits.iter().enumerate() {
            write_hit(&mut out, idx + 1, hit, "");
        }
        return Ok(out);
    }

    let mut msg = format!("Token '{}' not found.\n", token);

    let threshold = state.config().search.suggestion_threshold;
    let suggestions = site.suggest(token, threshold, 5);
    if !suggestions.is_empty() {
        msg.push_str("\nDid you mean one of these?\n\n");
        for suggestion in &suggestions {
            let _ = writeln!(
                msg,
                "• `{}` ({})",
                suggestion.entry.token,
                suggestion.entry.label()
            );
        }
    }

    if !is_well_formed(token) {
        let _ = write!(
            msg,
            "\nTokens are encoded names with a serial, e.g. `{}_0`. \
             Use the search tool to look up a plain name.\n",
            encode_query(token)
        );
    }

    Ok(msg)
}
