//! Global stylesheet discovery.
//!
//! Walks the workspace depth-first, visiting each directory's entries in
//! lexicographic order and never descending into dependency directories, so
//! the import order (and therefore the cascade) is the same on every run.

use std::path::{Path, PathBuf};

use vessel_plugin_css::{StylesheetKind, classify};
use walkdir::{DirEntry, WalkDir};

use crate::workspace::Workspace;

/// Lower-cased basenames treated as document-wide stylesheets.
pub const RECOGNIZED_STYLESHEETS: [&str; 5] = [
    "globals.css",
    "global.css",
    "app.css",
    "styles.css",
    "index.css",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylesheetAsset {
    pub path: PathBuf,
    pub kind: StylesheetKind,
}

pub fn discover_global_stylesheets(workspace: &Workspace) -> Vec<StylesheetAsset> {
    let skip = workspace.dependency_dir_name().to_string();
    let mut found = Vec::new();

    let walker = WalkDir::new(workspace.root())
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_dependency_dir(entry, &skip));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!(error = %err, "Skipping unreadable entry during stylesheet discovery");
                continue;
            }
        };

        if !entry.file_type().is_file() || !is_recognized(entry.path()) {
            continue;
        }
        if let Some(kind) = classify(entry.path()) {
            found.push(StylesheetAsset {
                path: entry.into_path(),
                kind,
            });
        }
    }

    tracing::info!(
        count = found.len(),
        root = %workspace.root().display(),
        "Discovered global stylesheets"
    );
    found
}

fn is_dependency_dir(entry: &DirEntry, name: &str) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry.file_name().to_string_lossy().contains(name)
}

fn is_recognized(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().to_lowercase())
        .is_some_and(|name| RECOGNIZED_STYLESHEETS.contains(&name.as_str()))
}
