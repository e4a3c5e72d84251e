//! Text rendering shared by the tool handlers.

use crate::site::Hit;
use std::fmt::Write as _;

/// Writes one numbered result: label, token, and every target on its own line.
pub(crate) fn write_hit(out: &mut String, number: usize, hit: &Hit<'_>, suffix: &str) {
    let _ = writeln!(
        out,
        "{}. `{}` (token `{}`, {}){}",
        number,
        hit.entry.label(),
        hit.entry.token,
        hit.file.file_name(),
        suffix
    );
    for target in &hit.entry.targets {
        let scope = target.scope_label();
        if scope.is_empty() {
            let _ = writeln!(out, "   - {}", target.url);
        } else {
            let _ = writeln!(out, "   - {} -> {}", scope, target.url);
        }
    }
}

/// Renders a list of hits under a heading, noting truncation.
pub(crate) fn render_hits(heading: &str, hits: &[Hit<'_>], total: usize) -> String {
    let mut out = format!("{}\n\n", heading);
    for (idx, hit) in hits.iter().enumerate() {
        write_hit(&mut out, idx + 1, hit, "");
    }
    if total > hits.len() {
        let _ = writeln!(out, "\n... {} more (raise `limit` to see them)", total - hits.len());
    }
    out
}
