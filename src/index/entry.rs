//! Search entries, their targets, and lint checks over a loaded table.

use super::table::SearchTable;
use super::token;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;

/// Shape of an anchor Doxygen writes into a search data file.
static ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?://\S+|(?:\.\./)*[A-Za-z0-9_.~%+\-/]+\.html?)(?:#[A-Za-z0-9_\-.:]+)?$")
        .expect("anchor pattern is valid")
});

/// One token-to-documentation mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchEntry {
    /// Normalized search key, e.g. `aggregate_5facross_5fcells_2`.
    pub token: String,
    /// Label shown in the result list, HTML-escaped as stored in the file.
    pub display: String,
    /// Documented locations, never empty once inside a [`SearchTable`].
    pub targets: Vec<Target>,
}

impl SearchEntry {
    pub fn new(token: impl Into<String>, display: impl Into<String>, targets: Vec<Target>) -> Self {
        Self {
            token: token.into(),
            display: display.into(),
            targets,
        }
    }

    /// Display label with HTML entities decoded.
    pub fn label(&self) -> Cow<'_, str> {
        html_unescape(&self.display)
    }

    /// Lowercase name the token was derived from, if the token decodes.
    pub fn name(&self) -> Option<String> {
        token::decode_token(&self.token).ok().map(|d| d.name)
    }
}

/// A documented location: `[url, flag, scope]` in the data file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub url: String,
    /// Non-zero opens the link in the parent frame, zero in a new window.
    pub flag: u8,
    /// Containing scope or full signature, HTML-escaped; may be empty.
    pub scope: String,
}

impl Target {
    pub fn new(url: impl Into<String>, flag: u8, scope: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            flag,
            scope: scope.into(),
        }
    }

    /// Page the anchor points at, without `../` prefixes or fragment.
    ///
    /// `../namespacefoo.html#a12` becomes `namespacefoo.html`. External URLs keep
    /// their scheme and host.
    pub fn page(&self) -> &str {
        let without_fragment = self.url.split('#').next().unwrap_or(&self.url);
        if self.is_external() {
            return without_fragment;
        }
        let mut page = without_fragment;
        while let Some(rest) = page.strip_prefix("../") {
            page = rest;
        }
        page
    }

    /// Fragment identifier after `#`, if any.
    pub fn fragment(&self) -> Option<&str> {
        self.url.split_once('#').map(|(_, fragment)| fragment)
    }

    /// Whether the anchor points into another project's documentation.
    pub fn is_external(&self) -> bool {
        self.url.starts_with("http://") || self.url.starts_with("https://")
    }

    pub fn opens_in_parent(&self) -> bool {
        self.flag != 0
    }

    /// Scope with HTML entities decoded.
    pub fn scope_label(&self) -> Cow<'_, str> {
        html_unescape(&self.scope)
    }

    /// Whether the anchor has the shape of a Doxygen link.
    pub fn is_well_formed(&self) -> bool {
        !self.url.is_empty() && ANCHOR_RE.is_match(&self.url)
    }
}

/// Decodes the HTML entities Doxygen writes into labels.
///
/// Borrows when there is nothing to decode. Unknown entities are left as-is.
pub fn html_unescape(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match tail.find(';').and_then(|end| decode_entity(&tail[1..end]).map(|c| (c, end))) {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}

/// How serious a reported problem is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// A problem found while linting a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    MalformedToken { token: String },
    EmptyDisplay { token: String },
    MalformedAnchor { token: String, url: String },
    TokenDisplayMismatch { token: String, display: String },
    SerialOutOfOrder { token: String, expected: u32, found: u32 },
}

impl Violation {
    pub fn severity(&self) -> Severity {
        match self {
            Self::MalformedToken { .. } | Self::EmptyDisplay { .. } | Self::MalformedAnchor { .. } => {
                Severity::Error
            }
            Self::TokenDisplayMismatch { .. } | Self::SerialOutOfOrder { .. } => Severity::Warning,
        }
    }

    pub fn token(&self) -> &str {
        match self {
            Self::MalformedToken { token }
            | Self::EmptyDisplay { token }
            | Self::MalformedAnchor { token, .. }
            | Self::TokenDisplayMismatch { token, .. }
            | Self::SerialOutOfOrder { token, .. } => token.as_str(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedToken { token } => write!(f, "malformed token '{}'", token),
            Self::EmptyDisplay { token } => write!(f, "entry '{}' has an empty label", token),
            Self::MalformedAnchor { token, url } => {
                write!(f, "entry '{}' has a malformed anchor '{}'", token, url)
            }
            Self::TokenDisplayMismatch { token, display } => {
                write!(f, "token '{}' does not occur in label '{}'", token, display)
            }
            Self::SerialOutOfOrder {
                token,
                expected,
                found,
            } => write!(
                f,
                "token '{}' has serial {} where {} was expected",
                token, found, expected
            ),
        }
    }
}

/// Result of linting one table.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub entries: usize,
    pub targets: usize,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn error_count(&self) -> usize {
        self.violations
            .iter()
            .filter(|v| v.severity() == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.violations.len() - self.error_count()
    }

    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Lints a table: token shape, labels, anchors, and serial numbering.
///
/// Uniqueness and non-empty targets are already guaranteed by [`SearchTable`].
pub fn validate_table(table: &SearchTable) -> ValidationReport {
    let mut report = ValidationReport {
        entries: table.len(),
        ..ValidationReport::default()
    };

    for (position, entry) in table.entries().iter().enumerate() {
        report.targets += entry.targets.len();

        if entry.display.is_empty() {
            report.violations.push(Violation::EmptyDisplay {
                token: entry.token.clone(),
            });
        }

        match token::decode_token(&entry.token) {
            Ok(decoded) if token::is_well_formed(&entry.token) => {
                let label = entry.label().to_lowercase();
                if !entry.display.is_empty() && !label.contains(&decoded.name) {
                    report.violations.push(Violation::TokenDisplayMismatch {
                        token: entry.token.clone(),
                        display: entry.display.clone(),
                    });
                }

                let expected = u32::try_from(position).unwrap_or(u32::MAX);
                if decoded.serial != expected {
                    report.violations.push(Violation::SerialOutOfOrder {
                        token: entry.token.clone(),
                        expected,
                        found: decoded.serial,
                    });
                }
            }
            _ => report.violations.push(Violation::MalformedToken {
                token: entry.token.clone(),
            }),
        }

        for target in &entry.targets {
            if !target.is_well_formed() {
                report.violations.push(Violation::MalformedAnchor {
                    token: entry.token.clone(),
                    url: target.url.clone(),
                });
            }
        }
    }

    tracing::debug!(
        "Validated {} entries: {} errors, {} warnings",
        report.entries,
        report.error_count(),
        report.warning_count()
    );

    report
}
