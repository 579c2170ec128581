//! Diagnostic extraction from Rolldown errors.
//!
//! Rolldown reports build failures as batched diagnostics whose exact shape
//! changes between releases. We only rely on their `Debug` text and pull
//! out the pieces a caller needs to act on: a kind, the offending file and
//! any help line.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Extracted diagnostic information from Rolldown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedDiagnostic {
    pub kind: DiagnosticKind,
    pub severity: DiagnosticSeverity,
    pub message: String,
    pub file: Option<String>,
    pub help: Option<String>,
}

impl ExtractedDiagnostic {
    /// Diagnostic for a failure that did not come out of Rolldown itself.
    pub fn other(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::Other(kind.into()),
            severity: DiagnosticSeverity::Error,
            message: message.into(),
            file: None,
            help: None,
        }
    }
}

/// Diagnostic kind (mirrors the Rolldown event kinds we care about).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    MissingExport,
    ParseError,
    UnresolvedEntry,
    UnresolvedImport,
    Plugin,
    Transform,
    Other(String),
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::MissingExport => write!(f, "MissingExport"),
            DiagnosticKind::ParseError => write!(f, "ParseError"),
            DiagnosticKind::UnresolvedEntry => write!(f, "UnresolvedEntry"),
            DiagnosticKind::UnresolvedImport => write!(f, "UnresolvedImport"),
            DiagnosticKind::Plugin => write!(f, "Plugin"),
            DiagnosticKind::Transform => write!(f, "Transform"),
            DiagnosticKind::Other(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

/// Extract diagnostics from a Rolldown error value.
pub fn extract_from_rolldown_error(error: &dyn fmt::Debug) -> Vec<ExtractedDiagnostic> {
    let error_str = format!("{error:?}");

    if error_str.contains("BatchedBuildDiagnostic") {
        let parts: Vec<&str> = error_str
            .split("BatchedBuildDiagnostic")
            .filter(|s| !s.trim().is_empty() && s.trim() != "(")
            .collect();
        if parts.len() > 1 {
            return parts.iter().map(|part| extract_single(part)).collect();
        }
    }

    vec![extract_single(&error_str)]
}

fn extract_single(error_str: &str) -> ExtractedDiagnostic {
    let kind = if error_str.contains("MissingExport") {
        DiagnosticKind::MissingExport
    } else if error_str.contains("Parse error")
        || error_str.contains("Syntax")
        || error_str.contains("Expected")
    {
        DiagnosticKind::ParseError
    } else if error_str.contains("UnresolvedEntry") {
        DiagnosticKind::UnresolvedEntry
    } else if error_str.contains("UnresolvedImport") || error_str.contains("Could not resolve")
    {
        DiagnosticKind::UnresolvedImport
    } else if error_str.contains("Plugin") {
        DiagnosticKind::Plugin
    } else if error_str.contains("Transform") || error_str.contains("transform") {
        DiagnosticKind::Transform
    } else {
        DiagnosticKind::Other("BuildError".to_string())
    };

    let severity = if error_str.contains("Warning") {
        DiagnosticSeverity::Warning
    } else {
        DiagnosticSeverity::Error
    };

    ExtractedDiagnostic {
        kind,
        severity,
        message: error_str.trim().to_string(),
        file: extract_file_path(error_str),
        help: extract_help_text(error_str),
    }
}

/// First path-looking token ending in a source or stylesheet extension.
fn extract_file_path(text: &str) -> Option<String> {
    for ext in &[
        ".tsx", ".ts", ".jsx", ".js", ".mjs", ".cjs", ".css", ".scss",
    ] {
        let Some(pos) = text.find(ext) else {
            continue;
        };
        let before = &text[..pos + ext.len()];
        let start = before
            .rfind([' ', '\n', '"', '\'', '(', '`'])
            .map_or(0, |i| i + 1);
        let candidate = before[start..].trim();
        if !candidate.is_empty() && candidate != *ext {
            return Some(candidate.to_string());
        }
    }
    None
}

fn extract_help_text(text: &str) -> Option<String> {
    for indicator in &["help: ", "Help: ", "hint: ", "Hint: "] {
        if let Some(pos) = text.find(indicator) {
            let after = &text[pos + indicator.len()..];
            let help = after.lines().next().unwrap_or("").trim();
            if !help.is_empty() {
                return Some(help.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Raw(&'static str);

    impl fmt::Debug for Raw {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.0)
        }
    }

    #[test]
    fn test_parse_error_kind_and_file() {
        let diags = extract_from_rolldown_error(&Raw("Parse error: Expected `;` in /w/src/app.tsx:3:4"));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].kind, DiagnosticKind::ParseError);
        assert_eq!(diags[0].file.as_deref(), Some("/w/src/app.tsx"));
        assert_eq!(diags[0].severity, DiagnosticSeverity::Error);
    }

    #[test]
    fn test_help_is_extracted() {
        let diags = extract_from_rolldown_error(&Raw(
            "MissingExport: \"Card\" is not exported\nhelp: did you mean \"CardRoot\"?",
        ));
        assert_eq!(diags[0].kind, DiagnosticKind::MissingExport);
        assert_eq!(diags[0].help.as_deref(), Some("did you mean \"CardRoot\"?"));
    }

    #[test]
    fn test_unknown_error_is_other() {
        let diags = extract_from_rolldown_error(&Raw("something odd"));
        assert_eq!(diags[0].kind, DiagnosticKind::Other("BuildError".to_string()));
        assert!(diags[0].file.is_none());
    }
}
