//! Selecting the documentation site the other tools query.

use crate::site::SearchSite;
use crate::worker::DocState;
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetDocsRootRequest {
    /// Doxygen output directory, its `html` folder, or the `search` folder itself
    pub path: String,
}

/// Resolve and load a documentation site, making it current.
pub async fn handle_set_docs_root(
    state: &Arc<DocState>,
    request: SetDocsRootRequest,
) -> Result<String, String> {
    let previous = state.docs_root().await;
    let (root, changed) = state.set_docs_root(&request.path).await?;
    let site = state.get_site(&root).await?;
    Ok(format_response(&site, previous.as_deref(), changed))
}

/// Summarises a freshly selected site.
pub fn format_response(site: &SearchSite, previous: Option<&Path>, changed: bool) -> String {
    let mut response = match (changed, previous) {
        (true, Some(old)) => format!(
            "Documentation root changed: {} (was {})\n\n",
            site.root().display(),
            old.display()
        ),
        (true, None) => format!("Documentation root set: {}\n\n", site.root().display()),
        (false, _) => format!("Documentation root unchanged: {}\n\n", site.root().display()),
    };

    let _ = writeln!(
        response,
        "Loaded {} entries from {} data files.",
        site.entry_count(),
        site.files().len()
    );
    let sections = site.section_names();
    if !sections.is_empty() {
        let _ = writeln!(response, "Sections: {}", sections.join(", "));
    }
    response
}
