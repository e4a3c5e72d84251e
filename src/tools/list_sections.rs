//! Overview of the search categories of the current site.

use crate::worker::DocState;
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct ListSectionsRequest {}

pub async fn handle_list_sections(
    state: &Arc<DocState>,
    _request: ListSectionsRequest,
) -> Result<String, String> {
    let site = state.current_site().await?;
    let mut out = format!(
        "Search index: {} (fingerprint {})\n\n",
        site.root().display(),
        site.fingerprint()
    );

    for name in site.section_names() {
        let files: Vec<_> = site.files().iter().filter(|f| f.section == name).collect();
        let entries: usize = files.iter().map(|f| f.table.len()).sum();
        let label = site
            .sections()
            .and_then(|s| s.section(&name))
            .map_or_else(|| name.clone(), |s| s.label.clone());

        let _ = writeln!(
            out,
            "• {} (`{}`): {} entries in {} files",
            label,
            name,
            entries,
            files.len()
        );
        if let Some(section) = site.sections().and_then(|s| s.section(&name)) {
            let _ = writeln!(out, "  leading characters: {}", section.content);
        }
    }

    if site.sections().is_none() {
        out.push_str("\nNo searchdata.js found; sections were inferred from file names.\n");
    }
    Ok(out)
}
