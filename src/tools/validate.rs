//! Lint report for every data file of the current site.

use crate::index::{Severity, ValidationReport};
use crate::worker::DocState;
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;
use std::sync::Arc;

/// Violations listed per file before the rest are summarised.
const MAX_LISTED: usize = 20;

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct ValidateIndexRequest {}

pub async fn handle_validate_index(
    state: &Arc<DocState>,
    _request: ValidateIndexRequest,
) -> Result<String, String> {
    let site = state.current_site().await?;
    Ok(render_reports(&site.validate()))
}

/// Summary line plus per-file findings.
pub(crate) fn render_reports(reports: &[(String, ValidationReport)]) -> String {
    let errors: usize = reports.iter().map(|(_, r)| r.error_count()).sum();
    let warnings: usize = reports.iter().map(|(_, r)| r.warning_count()).sum();

    let mut out = format!(
        "Validated {} data files: {} errors, {} warnings\n\n",
        reports.len(),
        errors,
        warnings
    );

    for (file, report) in reports {
        if report.is_clean() {
            let _ = writeln!(
                out,
                "✓ {}: {} entries, {} targets",
                file, report.entries, report.targets
            );
            continue;
        }
        let _ = writeln!(
            out,
            "✗ {}: {} errors, {} warnings",
            file,
            report.error_count(),
            report.warning_count()
        );
        for violation in report.violations.iter().take(MAX_LISTED) {
            let level = match violation.severity() {
                Severity::Error => "error",
                Severity::Warning => "warning",
            };
            let _ = writeln!(out, "  {}: {}", level, violation);
        }
        if report.violations.len() > MAX_LISTED {
            let _ = writeln!(out, "  ... {} more", report.violations.len() - MAX_LISTED);
        }
    }
    out
}
