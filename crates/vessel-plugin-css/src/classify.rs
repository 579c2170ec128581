//! Stylesheet classification.

use std::fmt;
use std::path::Path;

/// How a stylesheet's rules apply once injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StylesheetKind {
    /// Document-wide rules, font imports stripped.
    Global,
    /// `*.module.css` / `*.module.scss`: class selectors rewritten per build.
    Scoped,
}

/// Classify a path as a stylesheet.
///
/// Returns `None` for anything that is not `.css` or `.scss`.
pub fn classify(path: &Path) -> Option<StylesheetKind> {
    let name = path.file_name()?.to_str()?.to_ascii_lowercase();
    let stem = name
        .strip_suffix(".css")
        .or_else(|| name.strip_suffix(".scss"))?;

    if stem.ends_with(".module") {
        Some(StylesheetKind::Scoped)
    } else {
        Some(StylesheetKind::Global)
    }
}

/// Decides which transform, if any, the load hook applies to a module id.
pub trait StylesheetClassifier: Send + Sync + fmt::Debug {
    fn kind_of(&self, id: &str) -> Option<StylesheetKind>;
}

/// Classifies by file name alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileNameClassifier;

impl StylesheetClassifier for FileNameClassifier {
    fn kind_of(&self, id: &str) -> Option<StylesheetKind> {
        classify(Path::new(id))
    }
}
